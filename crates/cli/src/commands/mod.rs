pub mod config_cmd;
pub mod doctor;
pub mod generate;
pub mod query;
pub mod records;
pub mod serve;
pub mod token;

use finaid_config::AppConfig;
use finaid_core::tool::{ToolCall, ToolResult};
use finaid_tools::AppContext;
use std::path::Path;

pub type CmdResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Load configuration from `path` (or the default location), with
/// environment overrides applied.
pub fn load_config(path: Option<&Path>) -> CmdResult<AppConfig> {
    let config = match path {
        None => AppConfig::load(),
        Some(path) => AppConfig::load_from(path).and_then(|mut config| {
            config.apply_env(|key| std::env::var(key).ok())?;
            config.validate()?;
            Ok(config)
        }),
    };
    config.map_err(|e| format!("Failed to load config: {e}").into())
}

pub fn app_context(config: &AppConfig) -> CmdResult<AppContext> {
    AppContext::from_config(config).map_err(|e| {
        format!("{e} (run `finaid generate-data` to create a synthetic population)").into()
    })
}

/// Run one tool the same way the gateway does.
pub async fn run_tool(
    config: Option<&Path>,
    name: &str,
    arguments: serde_json::Value,
) -> CmdResult<ToolResult> {
    let config = load_config(config)?;
    let app = app_context(&config)?;
    let registry = finaid_tools::default_registry(&app);
    tracing::debug!(tool = name, "Running tool");

    let call = ToolCall {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.into(),
        arguments,
    };
    Ok(registry.execute(&call).await?)
}
