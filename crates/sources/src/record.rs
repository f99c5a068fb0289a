//! `student_record`: context from the in-process registrar.

use async_trait::async_trait;
use finaid_core::error::SourceError;
use finaid_core::record::RecordLookup;
use finaid_core::source::{Metadata, SourceAdapter, metadata_string};
use std::sync::Arc;

pub struct RecordSource {
    records: Arc<dyn RecordLookup>,
}

impl RecordSource {
    pub fn new(records: Arc<dyn RecordLookup>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl SourceAdapter for RecordSource {
    fn name(&self) -> &str {
        "student_record"
    }

    async fn retrieve(&self, _query: &str, metadata: Option<&Metadata>) -> Result<String, SourceError> {
        let Some(student_id) = metadata_string(metadata, "student_id") else {
            return Ok("[Student Record] No student_id provided".into());
        };

        let profile = self
            .records
            .lookup(&student_id)
            .await
            .map_err(|e| SourceError::Unavailable {
                source_name: self.name().into(),
                reason: e.to_string(),
            })?;

        Ok(match profile {
            Some(p) => format!(
                "[Student Record] {} (ID: {}), {} {} in {}, GPA {}, {}. Need-based aid: {}. Courses: {}",
                p.name,
                p.student_id,
                p.year,
                p.program,
                p.major,
                p.gpa,
                p.enrollment_status,
                if p.is_need_based_qualified { "qualified" } else { "not qualified" },
                p.courses.join(", ")
            ),
            None => format!("[Student Record] Student with ID {student_id} not found."),
        })
    }
}
