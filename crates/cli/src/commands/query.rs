//! `finaid query`: run the context pipeline and print the prompt.

use std::path::Path;

use finaid_rag::{ContextRequest, PromptMode};

use super::{CmdResult, app_context, load_config};

pub struct QueryOptions {
    pub sources: Vec<String>,
    pub student_id: Option<String>,
    pub max_tokens: Option<i64>,
    pub mode: Option<String>,
    pub json: bool,
}

pub async fn run(config: Option<&Path>, text: String, options: QueryOptions) -> CmdResult {
    let config = load_config(config)?;
    let app = app_context(&config)?;

    let mut request = ContextRequest::new(text).with_priority(options.sources);
    if let Some(student_id) = options.student_id {
        request = request.with_student_id(student_id);
    }
    request.max_tokens = options.max_tokens;

    let pipeline = match options.mode {
        Some(mode) => app.pipeline.with_mode(mode.parse::<PromptMode>()?),
        None => app.pipeline,
    };

    let response = pipeline.run(request).await;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", response.prompt);
        eprintln!();
        eprintln!(
            "sources: {}  |  included: {}  |  {} tokens  |  {} dropped  |  {} ms",
            response.sources_used.join(", "),
            response.included_sources.join(", "),
            response.context_tokens,
            response.dropped_fragments,
            response.latency_ms
        );
    }

    Ok(())
}
