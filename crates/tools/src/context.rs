//! `build_context`: run the retrieval pipeline and return the prompt.

use async_trait::async_trait;
use finaid_core::error::ToolError;
use finaid_core::tool::{Tool, ToolResult};
use finaid_rag::{ContextPipeline, ContextRequest, PromptMode};
use serde::Deserialize;

pub struct BuildContextTool {
    pipeline: ContextPipeline,
}

impl BuildContextTool {
    pub fn new(pipeline: ContextPipeline) -> Self {
        Self { pipeline }
    }
}

#[derive(Debug, Deserialize)]
struct BuildContextArgs {
    query: String,
    #[serde(default)]
    context_priority: Vec<String>,
    #[serde(default)]
    student_id: Option<String>,
    #[serde(default)]
    max_tokens: Option<i64>,
    #[serde(default)]
    prompt_mode: Option<String>,
}

#[async_trait]
impl Tool for BuildContextTool {
    fn name(&self) -> &str {
        "build_context"
    }

    fn description(&self) -> &str {
        "Gather context for a question from the named sources, in order, trim it to a \
         token budget, and return the rendered prompt."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The student's question"
                },
                "context_priority": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Source names in priority order (faiss, dynamodb, s3, available_aid_api, student_record_api, student_record). Empty = configured default."
                },
                "student_id": {
                    "type": "string",
                    "description": "Student the question is about"
                },
                "max_tokens": {
                    "type": "integer",
                    "description": "Token budget for the context section"
                },
                "prompt_mode": {
                    "type": "string",
                    "enum": ["default", "phi-4"]
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: BuildContextArgs = serde_json::from_value(arguments)
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        let mut request = ContextRequest::new(args.query).with_priority(args.context_priority);
        if let Some(student_id) = args.student_id {
            request = request.with_student_id(student_id);
        }
        request.max_tokens = args.max_tokens;

        let response = match args.prompt_mode {
            Some(mode) => {
                let mode: PromptMode = mode.parse().map_err(ToolError::InvalidArguments)?;
                self.pipeline.clone().with_mode(mode).run(request).await
            }
            None => self.pipeline.run(request).await,
        };

        Ok(ToolResult::text(response.prompt.clone()).with_data(serde_json::to_value(&response)?))
    }
}
