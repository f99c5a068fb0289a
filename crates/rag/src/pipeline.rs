//! The context pipeline: retrieve, count, budget, format.

use finaid_config::ContextConfig;
use finaid_core::source::Metadata;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::context::{ContextBudgeter, ContextChunk, Tokenizer};
use crate::engine::RetrievalEngine;
use crate::prompt::{PromptFormatter, PromptMode};

/// One request for a context-augmented prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextRequest {
    pub query: String,

    /// Sources to consult, in order. Empty = the configured default.
    #[serde(default)]
    pub context_priority: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    /// Overrides the configured budget for this request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,
}

impl ContextRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_priority<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.context_priority = sources.into_iter().map(Into::into).collect();
        self
    }

    /// Set `student_id` in the request metadata.
    pub fn with_student_id(mut self, student_id: impl Into<String>) -> Self {
        self.metadata
            .get_or_insert_with(Metadata::new)
            .insert("student_id".into(), serde_json::Value::String(student_id.into()));
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: i64) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// The rendered prompt plus what went into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextResponse {
    pub query: String,
    pub prompt: String,
    /// Sources that answered, in priority order.
    pub sources_used: Vec<String>,
    /// Sources whose fragment survived the budget.
    pub included_sources: Vec<String>,
    pub context_tokens: usize,
    pub dropped_fragments: usize,
    pub latency_ms: u64,
}

/// Retrieval engine + budget + formatter, configured once and shared.
#[derive(Clone)]
pub struct ContextPipeline {
    engine: RetrievalEngine,
    tokenizer: Tokenizer,
    formatter: PromptFormatter,
    max_tokens: i64,
    default_priority: Vec<String>,
}

impl ContextPipeline {
    pub fn new(
        engine: RetrievalEngine,
        tokenizer: Tokenizer,
        formatter: PromptFormatter,
        max_tokens: i64,
        default_priority: Vec<String>,
    ) -> Self {
        Self {
            engine,
            tokenizer,
            formatter,
            max_tokens,
            default_priority,
        }
    }

    /// Build from the `[context]` section. Unknown names fall back to defaults.
    pub fn from_config(
        engine: RetrievalEngine,
        context: &ContextConfig,
        default_priority: Vec<String>,
    ) -> Self {
        let tokenizer = context.tokenizer.parse().unwrap_or_else(|e: String| {
            warn!(error = %e, "Falling back to heuristic tokenizer");
            Tokenizer::default()
        });
        let mode = context.prompt_mode.parse().unwrap_or_else(|e: String| {
            warn!(error = %e, "Falling back to default prompt mode");
            PromptMode::default()
        });
        Self::new(
            engine,
            tokenizer,
            PromptFormatter::new(mode),
            context.max_tokens,
            default_priority,
        )
    }

    pub fn engine(&self) -> &RetrievalEngine {
        &self.engine
    }

    pub fn default_priority(&self) -> &[String] {
        &self.default_priority
    }

    pub fn with_mode(mut self, mode: PromptMode) -> Self {
        self.formatter = PromptFormatter::new(mode);
        self
    }

    pub async fn run(&self, request: ContextRequest) -> ContextResponse {
        let started = Instant::now();

        let priority = if request.context_priority.is_empty() {
            &self.default_priority
        } else {
            &request.context_priority
        };

        let retrieved = self
            .engine
            .retrieve(&request.query, priority, request.metadata.as_ref())
            .await;

        let chunks: Vec<ContextChunk> = retrieved
            .fragments
            .into_iter()
            .map(|f| ContextChunk::from_fragment(f, self.tokenizer))
            .collect();

        let budget = ContextBudgeter::new(request.max_tokens.unwrap_or(self.max_tokens));
        let selection = budget.select(&chunks);
        if let Some(dropped) = selection.drop_info() {
            debug!(
                dropped = dropped.items_dropped,
                tokens_dropped = dropped.tokens_dropped,
                budget = budget.max_tokens(),
                "Context trimmed to budget"
            );
        }

        let prompt = self.formatter.format_chunks(&request.query, selection.included);
        let latency_ms = started.elapsed().as_millis() as u64;

        info!(
            sources = retrieved.sources_used.len(),
            included = selection.included.len(),
            context_tokens = selection.included_tokens(),
            latency_ms,
            "Context built"
        );

        ContextResponse {
            query: request.query,
            prompt,
            sources_used: retrieved.sources_used,
            included_sources: selection.included.iter().map(|c| c.source.clone()).collect(),
            context_tokens: selection.included_tokens(),
            dropped_fragments: selection.dropped.len(),
            latency_ms,
        }
    }
}
