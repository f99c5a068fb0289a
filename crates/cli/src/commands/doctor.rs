//! `finaid doctor`: diagnose configuration, data files and sources.

use std::path::Path;

use finaid_config::AppConfig;

use super::{CmdResult, load_config};

pub async fn run(config_path: Option<&Path>) -> CmdResult {
    println!("FinAid Doctor: System Diagnostics");
    println!("=================================\n");

    let mut issues = 0;

    let file = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"));
    if file.exists() {
        println!("  ok    Config file found at {}", file.display());
    } else {
        println!("  info  No config file at {}; using defaults", file.display());
    }

    let config = match load_config(config_path) {
        Ok(config) => {
            println!("  ok    Configuration valid");
            config
        }
        Err(e) => {
            println!("  FAIL  {e}");
            println!("\n  1 issue found. Fix the configuration and re-run.");
            return Ok(());
        }
    };

    match finaid_tools::AppContext::from_config(&config) {
        Ok(app) => {
            let students = app.registrar.resolve_student_profiles(usize::MAX).len();
            println!("  ok    {students} students loaded from {}", config.data.students_path.display());

            let sources = app.pipeline.engine().registry().names().join(", ");
            println!("  ok    Sources: {sources}");

            let missing: Vec<&str> = app
                .pipeline
                .default_priority()
                .iter()
                .map(String::as_str)
                .filter(|name| app.pipeline.engine().registry().get(name).is_none())
                .collect();
            if !missing.is_empty() {
                println!("  warn  Default priority names unknown sources: {}", missing.join(", "));
                issues += 1;
            }
        }
        Err(e) => {
            println!("  FAIL  {e}");
            println!("        Run `finaid generate-data` to create a synthetic population");
            issues += 1;
        }
    }

    if !config.data.determinations_path.exists() {
        println!("  info  No determinations file; every student is assessed by rule");
    }

    for (name, endpoint) in [
        ("student_record_api", &config.retrieval.student_record_api_url),
        ("available_aid_api", &config.retrieval.available_aid_api_url),
    ] {
        match endpoint {
            Some(url) => println!("  ok    {name} -> {url}"),
            None => println!("  info  {name} has no endpoint; it echoes the request"),
        }
    }

    if config.auth.enabled {
        println!("  ok    Authentication enabled");
    } else {
        println!("  warn  Authentication disabled; /v1 is open to every caller");
        issues += 1;
    }

    println!();
    if issues == 0 {
        println!("  All checks passed!");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
