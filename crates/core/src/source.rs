//! Source adapter trait: the abstraction over context sources.
//!
//! A source turns a query (plus optional request metadata) into one text
//! fragment: a vector index lookup, a key-value read, an object fetch, a REST
//! call. Sources are registered by name in a [`SourceRegistry`] once at start
//! and shared read-only for the life of the process.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::SourceError;

/// Request metadata handed to every source (e.g. `{"student_id": "S1A2B3"}`).
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// One source's text output for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    /// Name of the source that produced this fragment
    pub source: String,

    /// The fragment text
    pub content: String,
}

impl Fragment {
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
        }
    }
}

/// The core SourceAdapter trait.
///
/// Implementations should prefer a *soft failure* (returning explanatory
/// text such as `"[StudentRecord API] No student_id provided"`) over an
/// `Err` when an optional input is missing or a downstream call fails.
/// An `Err` is still tolerated: the retrieval engine drops that source.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// The unique name of this source (e.g., "faiss", "student_record_api").
    fn name(&self) -> &str;

    /// Produce a fragment for the query.
    async fn retrieve(
        &self,
        query: &str,
        metadata: Option<&Metadata>,
    ) -> std::result::Result<String, SourceError>;
}

/// A registry of available sources, keyed by name.
///
/// Populated during startup, then wrapped in an `Arc` and never mutated.
pub struct SourceRegistry {
    sources: HashMap<String, Box<dyn SourceAdapter>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self {
            sources: HashMap::new(),
        }
    }

    /// Register a source. Replaces any existing source with the same name.
    pub fn register(&mut self, source: Box<dyn SourceAdapter>) {
        let name = source.name().to_string();
        self.sources.insert(name, source);
    }

    /// Builder-style variant of [`register`](Self::register).
    pub fn with(mut self, source: Box<dyn SourceAdapter>) -> Self {
        self.register(source);
        self
    }

    /// Get a source by name.
    pub fn get(&self, name: &str) -> Option<&dyn SourceAdapter> {
        self.sources.get(name).map(|s| s.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    /// List all registered source names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sources.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a metadata key as a non-empty string.
///
/// Numbers are rendered with their JSON text, so `{"student_id": 42}` reads
/// as `"42"`. Empty strings count as absent.
pub fn metadata_string(metadata: Option<&Metadata>, key: &str) -> Option<String> {
    match metadata?.get(key)? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoSource;

    #[async_trait]
    impl SourceAdapter for EchoSource {
        fn name(&self) -> &str {
            "echo"
        }

        async fn retrieve(
            &self,
            query: &str,
            _metadata: Option<&Metadata>,
        ) -> std::result::Result<String, SourceError> {
            Ok(format!("echo: {query}"))
        }
    }

    #[test]
    fn registry_register_and_lookup() {
        let registry = SourceRegistry::new().with(Box::new(EchoSource));
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
        assert_eq!(registry.names(), vec!["echo"]);
    }

    #[tokio::test]
    async fn registered_source_retrieves() {
        let registry = SourceRegistry::new().with(Box::new(EchoSource));
        let text = registry.get("echo").unwrap().retrieve("hi", None).await.unwrap();
        assert_eq!(text, "echo: hi");
    }

    #[test]
    fn metadata_string_reads_strings_and_numbers() {
        let mut meta = Metadata::new();
        meta.insert("student_id".into(), serde_json::json!("S12345"));
        meta.insert("numeric".into(), serde_json::json!(42));
        meta.insert("blank".into(), serde_json::json!("  "));

        assert_eq!(metadata_string(Some(&meta), "student_id").as_deref(), Some("S12345"));
        assert_eq!(metadata_string(Some(&meta), "numeric").as_deref(), Some("42"));
        assert_eq!(metadata_string(Some(&meta), "blank"), None);
        assert_eq!(metadata_string(Some(&meta), "missing"), None);
        assert_eq!(metadata_string(None, "student_id"), None);
    }
}
