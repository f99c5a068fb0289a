//! Prompt rendering for retrieved context.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::context::ContextChunk;

/// Which prompt layout to render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromptMode {
    /// Plain question answering over the context.
    #[default]
    #[serde(rename = "default")]
    Default,
    /// Financial aid assistant persona with bulleted context (used for phi-4).
    #[serde(rename = "phi-4")]
    FinancialAidAssistant,
}

impl FromStr for PromptMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "phi-4" | "phi4" | "assistant" => Ok(Self::FinancialAidAssistant),
            other => Err(format!("unknown prompt mode: {other}")),
        }
    }
}

/// Stateless prompt formatter.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptFormatter {
    mode: PromptMode,
}

impl PromptFormatter {
    pub fn new(mode: PromptMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> PromptMode {
        self.mode
    }

    /// Render the prompt for `query` over the given context texts.
    pub fn format<S: AsRef<str>>(&self, query: &str, contexts: &[S]) -> String {
        match self.mode {
            PromptMode::Default => {
                let context = contexts
                    .iter()
                    .map(|c| c.as_ref())
                    .collect::<Vec<&str>>()
                    .join("\n\n");
                format!(
                    "Answer the following question using the context below.\n\
                     Context:\n\
                     {context}\n\
                     \n\
                     Question: {query}\n\
                     Answer:"
                )
            }
            PromptMode::FinancialAidAssistant => {
                let context = contexts
                    .iter()
                    .map(|c| format!("- {}", c.as_ref()))
                    .collect::<Vec<_>>()
                    .join("\n\n");
                format!(
                    "You are an assistant trained to help students with financial aid.\n\
                     \n\
                     Here is some information to help:\n\
                     \n\
                     {context}\n\
                     \n\
                     Student asked:\n\
                     {query}\n\
                     \n\
                     Respond clearly and helpfully:"
                )
            }
        }
    }

    /// Render over budgeted chunks.
    pub fn format_chunks(&self, query: &str, chunks: &[ContextChunk]) -> String {
        let contexts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        self.format(query, &contexts)
    }
}
