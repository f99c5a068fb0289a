//! Token estimation utilities.
//!
//! The default heuristic is ~4 characters per token, close enough to BPE
//! tokenizers on English text for budgeting. A whitespace word count is
//! available for callers that want a stricter, more readable measure, and
//! `bpe` counts real `cl100k_base` tokens through tiktoken.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::OnceLock;
use tiktoken_rs::{CoreBPE, cl100k_base};

/// Loading the vocabulary is slow; do it once per process.
static ENCODER: OnceLock<Option<CoreBPE>> = OnceLock::new();

fn bpe_encoder() -> Option<&'static CoreBPE> {
    ENCODER
        .get_or_init(|| match cl100k_base() {
            Ok(encoder) => Some(encoder),
            Err(e) => {
                tracing::error!(error = %e, "Failed to load cl100k_base, using heuristic token counts");
                None
            }
        })
        .as_ref()
}

/// Count `cl100k_base` tokens, without special tokens.
pub fn count_bpe(text: &str) -> usize {
    match bpe_encoder() {
        Some(encoder) => encoder.encode_ordinary(text).len(),
        None => estimate_tokens(text),
    }
}

/// Estimate the token count for a string.
///
/// Heuristic: 1 token ≈ 4 characters. Rounds up.
pub fn estimate_tokens(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    text.len().div_ceil(4)
}

/// Count whitespace-separated words.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Token counting strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tokenizer {
    #[default]
    Heuristic,
    Whitespace,
    Bpe,
}

impl Tokenizer {
    pub fn count(&self, text: &str) -> usize {
        match self {
            Self::Heuristic => estimate_tokens(text),
            Self::Whitespace => count_words(text),
            Self::Bpe => count_bpe(text),
        }
    }
}

impl FromStr for Tokenizer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "heuristic" => Ok(Self::Heuristic),
            "whitespace" => Ok(Self::Whitespace),
            "bpe" => Ok(Self::Bpe),
            other => Err(format!("unknown tokenizer: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_is_zero() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(count_words(""), 0);
    }

    #[test]
    fn four_chars_is_one_token() {
        assert_eq!(estimate_tokens("test"), 1);
    }

    #[test]
    fn five_chars_rounds_up() {
        assert_eq!(estimate_tokens("hello"), 2);
    }

    #[test]
    fn hundred_chars() {
        let text = "a".repeat(100);
        assert_eq!(estimate_tokens(&text), 25);
    }

    #[test]
    fn whitespace_counts_words() {
        assert_eq!(Tokenizer::Whitespace.count("  STEM  Excellence\nAward "), 3);
        assert_eq!(Tokenizer::Heuristic.count("STEM"), 1);
    }

    #[test]
    fn parse_tokenizer() {
        assert_eq!("whitespace".parse::<Tokenizer>(), Ok(Tokenizer::Whitespace));
        assert_eq!("Heuristic".parse::<Tokenizer>(), Ok(Tokenizer::Heuristic));
        assert_eq!("BPE".parse::<Tokenizer>(), Ok(Tokenizer::Bpe));
        assert!("gpt2".parse::<Tokenizer>().is_err());
    }

    #[test]
    fn bpe_counts_model_tokens() {
        assert_eq!(Tokenizer::Bpe.count(""), 0);
        assert_eq!(Tokenizer::Bpe.count("Hello, world!"), 4);
        // Long rare words split into several subword tokens.
        let text = "antidisestablishmentarianism";
        assert!(Tokenizer::Bpe.count(text) > count_words(text));
    }
}
