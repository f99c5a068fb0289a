//! Built-in context sources for FinAid.
//!
//! - `faiss`, `dynamodb`, `s3`: vector index, key-value and object store
//!   sources (stubbed: they echo the query under their label)
//! - `available_aid_api`, `student_record_api`: REST-backed sources
//! - `student_record`: reads the in-process registrar through [`RecordLookup`]

pub mod record;
pub mod rest;
pub mod stub;

use std::sync::Arc;
use std::time::Duration;

use finaid_config::RetrievalConfig;
use finaid_core::record::RecordLookup;
use finaid_core::source::SourceRegistry;

pub use record::RecordSource;
pub use rest::RestSource;
pub use stub::StubSource;

/// Create the source registry described by the retrieval config.
///
/// `records` backs the `student_record` source; pass `None` to leave it out.
pub fn default_registry(
    config: &RetrievalConfig,
    records: Option<Arc<dyn RecordLookup>>,
) -> SourceRegistry {
    let http_timeout = Duration::from_secs(config.http_timeout_secs);

    let mut registry = SourceRegistry::new()
        .with(Box::new(StubSource::faiss()))
        .with(Box::new(StubSource::dynamodb()))
        .with(Box::new(StubSource::s3()))
        .with(Box::new(RestSource::available_aid_api(
            config.available_aid_api_url.clone(),
            http_timeout,
        )))
        .with(Box::new(RestSource::student_record_api(
            config.student_record_api_url.clone(),
            http_timeout,
        )));

    if config.enable_registrar_source {
        if let Some(records) = records {
            registry.register(Box::new(RecordSource::new(records)));
        }
    }

    tracing::debug!(sources = ?registry.names(), "Source registry built");
    registry
}
