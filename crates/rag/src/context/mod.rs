//! Token counting and budget enforcement for retrieved context.

pub mod budget;
pub mod token;

pub use budget::{ContextBudgeter, ContextChunk, DropInfo, Selection, TokenCounted, truncate};
pub use token::{Tokenizer, count_words, estimate_tokens};
