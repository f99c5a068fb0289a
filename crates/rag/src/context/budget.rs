//! Context budgeting: keep the longest prefix of chunks that fits.
//!
//! Selection is all-or-nothing per chunk and never reorders. Once a chunk
//! does not fit, it and everything after it are dropped, even if a later
//! chunk would have fit on its own.

use finaid_core::source::Fragment;
use serde::{Deserialize, Serialize};

use crate::context::token::Tokenizer;

/// Anything with a precomputed token count.
pub trait TokenCounted {
    fn token_count(&self) -> usize;
}

/// A retrieved fragment with its token count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextChunk {
    pub source: String,
    pub content: String,
    pub tokens: usize,
}

impl ContextChunk {
    pub fn new(source: impl Into<String>, content: impl Into<String>, tokenizer: Tokenizer) -> Self {
        let content = content.into();
        Self {
            source: source.into(),
            tokens: tokenizer.count(&content),
            content,
        }
    }

    pub fn from_fragment(fragment: Fragment, tokenizer: Tokenizer) -> Self {
        Self::new(fragment.source, fragment.content, tokenizer)
    }
}

impl TokenCounted for ContextChunk {
    fn token_count(&self) -> usize {
        self.tokens
    }
}

impl TokenCounted for (String, usize) {
    fn token_count(&self) -> usize {
        self.1
    }
}

/// Select the longest prefix of `chunks` whose total token count is at most
/// `max_tokens`. A non-positive budget selects nothing.
pub fn truncate<T: TokenCounted>(chunks: &[T], max_tokens: i64) -> &[T] {
    if max_tokens <= 0 {
        return &chunks[..0];
    }

    let mut used: i64 = 0;
    for (i, chunk) in chunks.iter().enumerate() {
        let tokens = i64::try_from(chunk.token_count()).unwrap_or(i64::MAX);
        if used.saturating_add(tokens) > max_tokens {
            return &chunks[..i];
        }
        used += tokens;
    }
    chunks
}

/// What a budget pass kept and what it cut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<'a, T> {
    pub included: &'a [T],
    pub dropped: &'a [T],
}

impl<T: TokenCounted> Selection<'_, T> {
    pub fn included_tokens(&self) -> usize {
        self.included.iter().map(TokenCounted::token_count).sum()
    }

    pub fn dropped_tokens(&self) -> usize {
        self.dropped.iter().map(TokenCounted::token_count).sum()
    }

    pub fn drop_info(&self) -> Option<DropInfo> {
        if self.dropped.is_empty() {
            return None;
        }
        Some(DropInfo {
            items_dropped: self.dropped.len(),
            tokens_dropped: self.dropped_tokens(),
            reason: "Token budget exhausted".into(),
        })
    }
}

/// Summary of chunks removed by budget enforcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropInfo {
    pub items_dropped: usize,
    pub tokens_dropped: usize,
    pub reason: String,
}

/// A fixed budget applied to chunk lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextBudgeter {
    max_tokens: i64,
}

impl ContextBudgeter {
    pub fn new(max_tokens: i64) -> Self {
        Self { max_tokens }
    }

    pub fn max_tokens(&self) -> i64 {
        self.max_tokens
    }

    pub fn select<'a, T: TokenCounted>(&self, chunks: &'a [T]) -> Selection<'a, T> {
        let included = truncate(chunks, self.max_tokens);
        Selection {
            included,
            dropped: &chunks[included.len()..],
        }
    }
}
