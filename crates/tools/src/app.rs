//! Application context: everything a request handler needs, built once.

use finaid_config::AppConfig;
use finaid_core::error::RecordError;
use finaid_core::record::RecordLookup;
use finaid_rag::{ContextPipeline, RetrievalEngine, RetrievalPolicy};
use finaid_records::{
    ClaimsSystem, FinancialAidResolver, FinancialAidSystem, RegistrarResolver, RegistrarSystem,
};
use std::sync::Arc;
use tracing::info;

/// Resolvers, the claims store and the context pipeline. Cheap to clone.
#[derive(Clone)]
pub struct AppContext {
    pub registrar: RegistrarResolver,
    pub financial_aid: FinancialAidResolver,
    /// Claims submitted since startup; shared by every clone.
    pub claims: Arc<ClaimsSystem>,
    pub pipeline: ContextPipeline,
}

impl AppContext {
    /// Load the data files named in `config.data` and wire everything up.
    pub fn from_config(config: &AppConfig) -> Result<Self, RecordError> {
        let registrar = Arc::new(RegistrarSystem::load(&config.data.students_path)?);
        let financial_aid = Arc::new(FinancialAidSystem::load(&config.data.determinations_path)?);
        info!(students = registrar.len(), "Record systems loaded");
        Ok(Self::new(config, registrar, financial_aid))
    }

    pub fn new(
        config: &AppConfig,
        registrar: Arc<RegistrarSystem>,
        financial_aid: Arc<FinancialAidSystem>,
    ) -> Self {
        let records: Arc<dyn RecordLookup> = registrar.clone();
        let sources = finaid_sources::default_registry(&config.retrieval, Some(records));
        let engine = RetrievalEngine::new(
            Arc::new(sources),
            RetrievalPolicy::from_config(&config.retrieval),
        );
        let pipeline = ContextPipeline::from_config(
            engine,
            &config.context,
            config.retrieval.default_priority.clone(),
        );

        Self {
            registrar: RegistrarResolver::new(registrar.clone()),
            financial_aid: FinancialAidResolver::new(registrar, financial_aid),
            claims: Arc::new(ClaimsSystem::new()),
            pipeline,
        }
    }
}
