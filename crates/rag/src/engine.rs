//! Retrieval engine: fan a query out to named sources in priority order.
//!
//! Every requested source is invoked once per occurrence in the priority
//! list. Successful fragments are kept in priority order; a source that
//! errors, times out or panics is logged and left out. Names that are not
//! registered are skipped.
//!
//! # Invocation
//!
//! | Mode | Behavior |
//! |------|----------|
//! | `Sequential` | one source at a time, in priority order |
//! | `Parallel` | all sources started together, joined before assembly |
//!
//! Both modes produce the same ordering; only latency differs.

use finaid_config::RetrievalConfig;
use finaid_core::error::SourceError;
use finaid_core::source::{Fragment, Metadata, SourceAdapter, SourceRegistry};
use futures::FutureExt;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// How requested sources are invoked within one retrieval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationMode {
    #[default]
    Sequential,
    Parallel,
}

impl FromStr for InvocationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "parallel" => Ok(Self::Parallel),
            other => Err(format!("unknown retrieval mode: {other}")),
        }
    }
}

/// Per-engine invocation policy.
#[derive(Debug, Clone, Default)]
pub struct RetrievalPolicy {
    pub mode: InvocationMode,
    /// Upper bound on a single source call. `None` = unbounded.
    pub source_timeout: Option<Duration>,
}

impl RetrievalPolicy {
    pub fn from_config(config: &RetrievalConfig) -> Self {
        let mode = config.mode.parse().unwrap_or_else(|e: String| {
            warn!(error = %e, "Falling back to sequential retrieval");
            InvocationMode::Sequential
        });
        Self {
            mode,
            source_timeout: config.source_timeout_ms.map(Duration::from_millis),
        }
    }
}

/// Outcome of one retrieval.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Fragment texts joined with `\n`, in priority order.
    pub combined_text: String,
    /// Names of the sources that produced a fragment, in priority order.
    pub sources_used: Vec<String>,
    /// The fragments themselves, paired with their source.
    pub fragments: Vec<Fragment>,
}

impl RetrievalResult {
    fn from_fragments(fragments: Vec<Fragment>) -> Self {
        let combined_text = fragments
            .iter()
            .map(|f| f.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let sources_used = fragments.iter().map(|f| f.source.clone()).collect();
        Self {
            combined_text,
            sources_used,
            fragments,
        }
    }
}

/// The retrieval engine. Cheap to clone, safe to share across requests.
#[derive(Clone)]
pub struct RetrievalEngine {
    registry: Arc<SourceRegistry>,
    policy: RetrievalPolicy,
}

impl RetrievalEngine {
    pub fn new(registry: Arc<SourceRegistry>, policy: RetrievalPolicy) -> Self {
        Self { registry, policy }
    }

    /// Sequential engine with no timeout.
    pub fn with_defaults(registry: Arc<SourceRegistry>) -> Self {
        Self::new(registry, RetrievalPolicy::default())
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn policy(&self) -> &RetrievalPolicy {
        &self.policy
    }

    /// Retrieve context for `query` from the sources named in `context_priority`.
    ///
    /// Never fails: unknown names are skipped and failing sources dropped.
    pub async fn retrieve(
        &self,
        query: &str,
        context_priority: &[String],
        metadata: Option<&Metadata>,
    ) -> RetrievalResult {
        let requested: Vec<(&str, &dyn SourceAdapter)> = context_priority
            .iter()
            .filter_map(|name| match self.registry.get(name) {
                Some(source) => Some((name.as_str(), source)),
                None => {
                    debug!(source = %name, "Unknown source, skipping");
                    None
                }
            })
            .collect();

        let outcomes = match self.policy.mode {
            InvocationMode::Sequential => {
                let mut outcomes = Vec::with_capacity(requested.len());
                for (name, source) in requested {
                    outcomes.push((name, self.invoke(name, source, query, metadata).await));
                }
                outcomes
            }
            InvocationMode::Parallel => {
                join_all(requested.into_iter().map(|(name, source)| async move {
                    (name, self.invoke(name, source, query, metadata).await)
                }))
                .await
            }
        };

        let fragments = outcomes
            .into_iter()
            .filter_map(|(name, outcome)| match outcome {
                Ok(text) => Some(Fragment::new(name, text)),
                Err(e) => {
                    warn!(source = %name, error = %e, "Failed to retrieve from source");
                    None
                }
            })
            .collect();

        RetrievalResult::from_fragments(fragments)
    }

    /// Call one source, turning timeouts and panics into errors.
    async fn invoke(
        &self,
        name: &str,
        source: &dyn SourceAdapter,
        query: &str,
        metadata: Option<&Metadata>,
    ) -> Result<String, SourceError> {
        let call = AssertUnwindSafe(source.retrieve(query, metadata)).catch_unwind();

        let caught = match self.policy.source_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(caught) => caught,
                Err(_) => {
                    return Err(SourceError::Timeout {
                        source_name: name.to_string(),
                        timeout_ms: limit.as_millis() as u64,
                    });
                }
            },
            None => call.await,
        };

        caught.unwrap_or_else(|payload| Err(SourceError::Panicked(panic_message(payload.as_ref()))))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns fixed text, optionally after a delay.
    struct FixedSource {
        name: &'static str,
        text: &'static str,
        delay: Option<Duration>,
        calls: Arc<AtomicUsize>,
    }

    impl FixedSource {
        fn new(name: &'static str, text: &'static str) -> Self {
            Self {
                name,
                text,
                delay: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn delayed(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    #[async_trait]
    impl SourceAdapter for FixedSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn retrieve(&self, _q: &str, _m: Option<&Metadata>) -> Result<String, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(self.text.to_string())
        }
    }

    struct FailingSource(&'static str);

    #[async_trait]
    impl SourceAdapter for FailingSource {
        fn name(&self) -> &str {
            self.0
        }

        async fn retrieve(&self, _q: &str, _m: Option<&Metadata>) -> Result<String, SourceError> {
            Err(SourceError::Unavailable {
                source_name: self.0.into(),
                reason: "connection refused".into(),
            })
        }
    }

    struct PanickingSource;

    #[async_trait]
    impl SourceAdapter for PanickingSource {
        fn name(&self) -> &str {
            "panics"
        }

        async fn retrieve(&self, _q: &str, _m: Option<&Metadata>) -> Result<String, SourceError> {
            panic!("index corrupted");
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn abc_registry() -> Arc<SourceRegistry> {
        Arc::new(
            SourceRegistry::new()
                .with(Box::new(FixedSource::new("a", "alpha")))
                .with(Box::new(FixedSource::new("b", "bravo")))
                .with(Box::new(FixedSource::new("c", "charlie"))),
        )
    }

    #[tokio::test]
    async fn results_follow_priority_order() {
        let engine = RetrievalEngine::with_defaults(abc_registry());

        let result = engine.retrieve("q", &names(&["a", "b", "c"]), None).await;
        assert_eq!(result.sources_used, vec!["a", "b", "c"]);
        assert_eq!(result.combined_text, "alpha\nbravo\ncharlie");

        let result = engine.retrieve("q", &names(&["c", "a"]), None).await;
        assert_eq!(result.sources_used, vec!["c", "a"]);
        assert_eq!(result.combined_text, "charlie\nalpha");
    }

    #[tokio::test]
    async fn failing_source_is_dropped() {
        let registry = SourceRegistry::new()
            .with(Box::new(FixedSource::new("a", "alpha")))
            .with(Box::new(FailingSource("b")))
            .with(Box::new(FixedSource::new("c", "charlie")));
        let engine = RetrievalEngine::with_defaults(Arc::new(registry));

        let result = engine.retrieve("q", &names(&["a", "b", "c"]), None).await;
        assert_eq!(result.sources_used, vec!["a", "c"]);
        assert_eq!(result.combined_text, "alpha\ncharlie");
        assert_eq!(result.fragments.len(), 2);
    }

    #[tokio::test]
    async fn unknown_source_is_same_as_absent() {
        let engine = RetrievalEngine::with_defaults(abc_registry());
        let with_unknown = engine.retrieve("q", &names(&["a", "nope", "b"]), None).await;
        let without = engine.retrieve("q", &names(&["a", "b"]), None).await;
        assert_eq!(with_unknown, without);
    }

    #[tokio::test]
    async fn empty_priority_yields_empty_result() {
        let engine = RetrievalEngine::with_defaults(abc_registry());
        let result = engine.retrieve("q", &[], None).await;
        assert_eq!(result.combined_text, "");
        assert!(result.sources_used.is_empty());
    }

    #[tokio::test]
    async fn faiss_survives_dynamodb_failure() {
        let registry = SourceRegistry::new()
            .with(Box::new(FixedSource::new("faiss", "ctx-A")))
            .with(Box::new(FailingSource("dynamodb")));
        let engine = RetrievalEngine::with_defaults(Arc::new(registry));

        let result = engine
            .retrieve(
                "q",
                &names(&["faiss", "dynamodb", "unknown_src"]),
                Some(&Metadata::new()),
            )
            .await;
        assert_eq!(result.combined_text, "ctx-A");
        assert_eq!(result.sources_used, vec!["faiss"]);
    }

    #[tokio::test]
    async fn duplicates_are_retrieved_each_time() {
        let source = FixedSource::new("a", "alpha");
        let calls = source.calls.clone();
        let engine = RetrievalEngine::with_defaults(Arc::new(SourceRegistry::new().with(Box::new(source))));

        let result = engine.retrieve("q", &names(&["a", "a"]), None).await;
        assert_eq!(result.sources_used, vec!["a", "a"]);
        assert_eq!(result.combined_text, "alpha\nalpha");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn panicking_source_is_dropped() {
        let registry = SourceRegistry::new()
            .with(Box::new(PanickingSource))
            .with(Box::new(FixedSource::new("a", "alpha")));
        let engine = RetrievalEngine::with_defaults(Arc::new(registry));

        let result = engine.retrieve("q", &names(&["panics", "a"]), None).await;
        assert_eq!(result.sources_used, vec!["a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_source_times_out() {
        let registry = SourceRegistry::new()
            .with(Box::new(FixedSource::new("slow", "late").delayed(Duration::from_secs(60))))
            .with(Box::new(FixedSource::new("a", "alpha")));
        let policy = RetrievalPolicy {
            mode: InvocationMode::Sequential,
            source_timeout: Some(Duration::from_millis(100)),
        };
        let engine = RetrievalEngine::new(Arc::new(registry), policy);

        let result = engine.retrieve("q", &names(&["slow", "a"]), None).await;
        assert_eq!(result.sources_used, vec!["a"]);
        assert_eq!(result.combined_text, "alpha");
    }

    #[tokio::test(start_paused = true)]
    async fn parallel_keeps_priority_order() {
        let registry = SourceRegistry::new()
            .with(Box::new(FixedSource::new("a", "alpha").delayed(Duration::from_millis(300))))
            .with(Box::new(FixedSource::new("b", "bravo").delayed(Duration::from_millis(100))))
            .with(Box::new(FailingSource("x")))
            .with(Box::new(FixedSource::new("c", "charlie").delayed(Duration::from_millis(200))));
        let policy = RetrievalPolicy {
            mode: InvocationMode::Parallel,
            source_timeout: None,
        };
        let engine = RetrievalEngine::new(Arc::new(registry), policy);

        let started = tokio::time::Instant::now();
        let result = engine.retrieve("q", &names(&["a", "x", "b", "c"]), None).await;
        let elapsed = started.elapsed();

        assert_eq!(result.sources_used, vec!["a", "b", "c"]);
        assert_eq!(result.combined_text, "alpha\nbravo\ncharlie");
        // Bounded by the slowest source, not the sum.
        assert!(elapsed < Duration::from_millis(600), "took {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn parallel_timeout_drops_only_the_slow_source() {
        let registry = SourceRegistry::new()
            .with(Box::new(FixedSource::new("a", "alpha").delayed(Duration::from_millis(20))))
            .with(Box::new(FixedSource::new("slow", "late").delayed(Duration::from_secs(60))))
            .with(Box::new(FixedSource::new("c", "charlie").delayed(Duration::from_millis(10))));
        let policy = RetrievalPolicy {
            mode: InvocationMode::Parallel,
            source_timeout: Some(Duration::from_millis(100)),
        };
        let engine = RetrievalEngine::new(Arc::new(registry), policy);

        let started = tokio::time::Instant::now();
        let result = engine.retrieve("q", &names(&["slow", "c", "a"]), None).await;

        assert_eq!(result.sources_used, vec!["c", "a"]);
        assert_eq!(result.combined_text, "charlie\nalpha");
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn parallel_panic_is_dropped() {
        let registry = SourceRegistry::new()
            .with(Box::new(PanickingSource))
            .with(Box::new(FixedSource::new("faiss", "ctx-A")));
        let policy = RetrievalPolicy {
            mode: InvocationMode::Parallel,
            source_timeout: None,
        };
        let engine = RetrievalEngine::new(Arc::new(registry), policy);

        let result = engine.retrieve("q", &names(&["panics", "faiss"]), None).await;
        assert_eq!(result.sources_used, vec!["faiss"]);
    }

    /// `catch_unwind` does nothing under `panic = "abort"`, so no build
    /// profile of this workspace may set it.
    #[test]
    fn workspace_profiles_keep_unwinding() {
        let manifest: toml::Table =
            include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../../Cargo.toml"))
                .parse()
                .unwrap();
        let profiles = manifest
            .get("profile")
            .and_then(toml::Value::as_table)
            .cloned()
            .unwrap_or_default();
        for (name, profile) in &profiles {
            assert_ne!(
                profile.get("panic").and_then(toml::Value::as_str),
                Some("abort"),
                "profile.{name} aborts on panic"
            );
        }
    }

    #[test]
    fn policy_from_config() {
        let config = RetrievalConfig {
            mode: "parallel".into(),
            source_timeout_ms: Some(250),
            ..RetrievalConfig::default()
        };
        let policy = RetrievalPolicy::from_config(&config);
        assert_eq!(policy.mode, InvocationMode::Parallel);
        assert_eq!(policy.source_timeout, Some(Duration::from_millis(250)));

        let policy = RetrievalPolicy::from_config(&RetrievalConfig::default());
        assert_eq!(policy.mode, InvocationMode::Sequential);
        assert!(policy.source_timeout.is_none());
    }

    #[test]
    fn invocation_mode_parses() {
        assert_eq!("Parallel".parse::<InvocationMode>(), Ok(InvocationMode::Parallel));
        assert!("random".parse::<InvocationMode>().is_err());
    }
}
