//! Student record types and the lookup contract used by record-backed sources.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// A student's registrar profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub student_id: String,

    pub name: String,

    /// Field of study (also used as the eligibility field)
    pub major: String,

    #[serde(default)]
    pub program: String,

    pub gpa: f64,

    /// Class year: Freshman, Sophomore, Junior, Senior
    #[serde(default = "default_year")]
    pub year: String,

    #[serde(default)]
    pub courses: Vec<String>,

    #[serde(default)]
    pub is_need_based_qualified: bool,

    #[serde(default = "default_enrollment_status")]
    pub enrollment_status: String,
}

fn default_year() -> String {
    "Freshman".into()
}

fn default_enrollment_status() -> String {
    "enrolled".into()
}

/// One completed course on a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub term: String,
    pub course: String,
    pub title: String,
    pub credits: u32,
    pub grade: String,
}

/// A student's academic history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicHistory {
    pub courses: Vec<CourseRecord>,
    pub credits_attempted: u32,
    pub credits_earned: u32,
    #[serde(default)]
    pub honors: Vec<String>,
}

/// Lookup contract for student record systems.
///
/// `Ok(None)` means the student does not exist; `Err` means the record
/// system itself failed.
#[async_trait]
pub trait RecordLookup: Send + Sync {
    async fn lookup(&self, student_id: &str) -> std::result::Result<Option<StudentProfile>, RecordError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_defaults_fill_optional_fields() {
        let json = r#"{"student_id":"S1","name":"Alice Smith","major":"Law","gpa":3.1}"#;
        let profile: StudentProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.year, "Freshman");
        assert_eq!(profile.enrollment_status, "enrolled");
        assert!(!profile.is_need_based_qualified);
        assert!(profile.courses.is_empty());
    }
}
