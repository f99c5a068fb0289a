//! Retrieval-augmented context for FinAid.
//!
//! Data flows leaf-first through four stages:
//!
//! 1. [`RetrievalEngine`] asks named sources for fragments in priority order
//! 2. [`context::token`] counts each fragment
//! 3. [`context::budget`] keeps the longest prefix that fits the budget
//! 4. [`PromptFormatter`] renders the final prompt
//!
//! [`ContextPipeline`] strings them together for a single request.

pub mod context;
pub mod engine;
pub mod pipeline;
pub mod prompt;

pub use context::{ContextBudgeter, ContextChunk, Tokenizer, truncate};
pub use engine::{InvocationMode, RetrievalEngine, RetrievalPolicy, RetrievalResult};
pub use pipeline::{ContextPipeline, ContextRequest, ContextResponse};
pub use prompt::{PromptFormatter, PromptMode};
