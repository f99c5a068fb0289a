//! `finaid config`: configuration management commands.

use std::path::Path;

use finaid_config::AppConfig;

use super::{CmdResult, load_config};

pub async fn default() -> CmdResult {
    println!("{}", AppConfig::default_toml());
    Ok(())
}

pub async fn show(config: Option<&Path>) -> CmdResult {
    let config = load_config(config)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub async fn validate(config: Option<&Path>) -> CmdResult {
    println!("Validating configuration...");

    let config = match load_config(config) {
        Ok(config) => config,
        Err(e) => {
            println!("   Config error: {e}");
            return Err(e);
        }
    };
    println!("   Config parsed successfully");

    let mut warnings = Vec::new();

    if config.server.host == "0.0.0.0" && !config.auth.enabled {
        warnings.push("Server binds 0.0.0.0 with authentication disabled");
    }
    if config.auth.enabled && config.auth.jwt_secret.is_none() && !config.auth.tokens.is_empty() {
        warnings.push("No jwt_secret: only static tokens will pass; JWTs are checked for claims only");
    }
    if config.retrieval.source_timeout_ms.is_none() {
        warnings.push("No retrieval.source_timeout_ms: a slow source delays every request");
    }
    if config.retrieval.default_priority.is_empty() {
        warnings.push("retrieval.default_priority is empty: requests without a priority get no context");
    }

    if warnings.is_empty() {
        println!("   All checks passed");
    } else {
        println!();
        for w in &warnings {
            println!("   warning: {w}");
        }
    }

    println!();
    println!("   Server:     {}:{}", config.server.host, config.server.port);
    println!("   Retrieval:  {}", config.retrieval.mode);
    println!("   Priority:   {}", config.retrieval.default_priority.join(", "));
    println!("   Budget:     {} tokens ({})", config.context.max_tokens, config.context.tokenizer);
    println!("   Prompt:     {}", config.context.prompt_mode);
    println!("   Students:   {}", config.data.students_path.display());

    Ok(())
}

pub async fn path(config: Option<&Path>) -> CmdResult {
    match config {
        Some(path) => println!("{}", path.display()),
        None => println!("{}", AppConfig::config_dir().join("config.toml").display()),
    }
    Ok(())
}
