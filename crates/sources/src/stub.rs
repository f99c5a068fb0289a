//! Stub sources for the vector index, key-value store and object store.
//!
//! They ignore metadata and return the query under their label, which is
//! enough to exercise ordering and budgeting end to end.

use async_trait::async_trait;
use finaid_core::error::SourceError;
use finaid_core::source::{Metadata, SourceAdapter};

pub struct StubSource {
    name: &'static str,
    label: &'static str,
}

impl StubSource {
    pub const fn new(name: &'static str, label: &'static str) -> Self {
        Self { name, label }
    }

    /// Vector index (FAISS).
    pub const fn faiss() -> Self {
        Self::new("faiss", "FAISS")
    }

    /// Key-value store (DynamoDB).
    pub const fn dynamodb() -> Self {
        Self::new("dynamodb", "DynamoDB")
    }

    /// Object store (S3).
    pub const fn s3() -> Self {
        Self::new("s3", "S3")
    }
}

#[async_trait]
impl SourceAdapter for StubSource {
    fn name(&self) -> &str {
        self.name
    }

    async fn retrieve(&self, query: &str, _metadata: Option<&Metadata>) -> Result<String, SourceError> {
        Ok(format!("[{}] Retrieved context for: {}", self.label, query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stubs_label_the_query() {
        let text = StubSource::faiss().retrieve("pell grant", None).await.unwrap();
        assert_eq!(text, "[FAISS] Retrieved context for: pell grant");

        let text = StubSource::s3().retrieve("deadline", Some(&Metadata::new())).await.unwrap();
        assert_eq!(text, "[S3] Retrieved context for: deadline");
    }

    #[test]
    fn stub_names() {
        assert_eq!(StubSource::dynamodb().name(), "dynamodb");
        assert_eq!(StubSource::faiss().name(), "faiss");
        assert_eq!(StubSource::s3().name(), "s3");
    }
}
