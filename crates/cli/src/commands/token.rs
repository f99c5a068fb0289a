//! `finaid token`: issue a signed JWT for calling the v1 API.

use std::path::Path;

use super::{CmdResult, load_config};

pub async fn run(config: Option<&Path>, subject: &str, ttl_secs: i64, secret: Option<String>) -> CmdResult {
    let secret = match secret.filter(|s| !s.is_empty()) {
        Some(secret) => secret,
        None => load_config(config)?
            .auth
            .jwt_secret
            .ok_or("No JWT secret configured: set auth.jwt_secret, FINAID_JWT_SECRET or --secret")?,
    };

    if ttl_secs <= 0 {
        return Err("--ttl-secs must be positive".into());
    }

    let token = finaid_security::issue_test_token(&secret, subject, ttl_secs)?;
    println!("{token}");
    Ok(())
}
