//! `finaid serve`: start the HTTP gateway.

use std::path::Path;

use super::{CmdResult, load_config};

pub async fn run(config: Option<&Path>, port: Option<u16>, host: Option<String>) -> CmdResult {
    let mut config = load_config(config)?;

    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(host) = host {
        config.server.host = host;
    }

    println!("FinAid Gateway");
    println!("   Listening: {}:{}", config.server.host, config.server.port);
    println!("   Auth:      {}", if config.auth.enabled { "enabled" } else { "disabled" });
    println!("   Retrieval: {}", config.retrieval.mode);

    finaid_gateway::start(config).await?;

    Ok(())
}
