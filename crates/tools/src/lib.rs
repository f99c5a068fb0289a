//! Named operations for FinAid.
//!
//! Each tool wraps one resolver call (or the context pipeline) and returns
//! text, with structured data alongside where there is any:
//!
//! | Tool | Backed by |
//! |------|-----------|
//! | `fetch_student_profile` | registrar |
//! | `fetch_students` | registrar |
//! | `fetch_academic_history` | registrar |
//! | `check_financial_aid_eligibility` | financial aid office |
//! | `get_program_details` | financial aid office |
//! | `submit_claim` | claims store |
//! | `get_claim_history` | claims store |
//! | `build_context` | retrieval pipeline |
//!
//! Read-only views of the same data are exposed as resource URIs through
//! [`ResourceRouter`].

pub mod app;
pub mod claims;
pub mod context;
pub mod financial_aid;
pub mod resources;
pub mod students;

use finaid_core::error::ToolError;
use finaid_core::tool::ToolRegistry;

pub use app::AppContext;
pub use resources::{ResourceContent, ResourceRouter, ResourceTemplate};

/// Create the tool registry over an application context.
pub fn default_registry(app: &AppContext) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(students::FetchStudentProfileTool::new(app.registrar.clone())));
    registry.register(Box::new(students::FetchStudentsTool::new(app.registrar.clone())));
    registry.register(Box::new(students::FetchAcademicHistoryTool::new(app.registrar.clone())));
    registry.register(Box::new(financial_aid::CheckFinancialAidEligibilityTool::new(
        app.financial_aid.clone(),
    )));
    registry.register(Box::new(financial_aid::GetProgramDetailsTool::new(
        app.financial_aid.clone(),
    )));
    registry.register(Box::new(claims::SubmitClaimTool::new(
        app.claims.clone(),
        app.financial_aid.clone(),
    )));
    registry.register(Box::new(claims::GetClaimHistoryTool::new(app.claims.clone())));
    registry.register(Box::new(context::BuildContextTool::new(app.pipeline.clone())));
    registry
}

/// A required, non-blank string argument.
pub(crate) fn required_str<'a>(arguments: &'a serde_json::Value, key: &str) -> Result<&'a str, ToolError> {
    arguments[key]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ToolError::InvalidArguments(format!("Missing '{key}' argument")))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::AppContext;
    use finaid_config::AppConfig;
    use finaid_core::record::StudentProfile;
    use finaid_records::synthetic::determinations_for;
    use finaid_records::{FinancialAidSystem, RegistrarSystem};
    use std::sync::Arc;

    fn profile(id: &str, name: &str, major: &str, gpa: f64, need_based: bool) -> StudentProfile {
        StudentProfile {
            student_id: id.into(),
            name: name.into(),
            major: major.into(),
            program: "Bachelor of Arts".into(),
            gpa,
            year: "Junior".into(),
            courses: vec![format!("Introduction to {major}")],
            is_need_based_qualified: need_based,
            enrollment_status: "Full-time".into(),
        }
    }

    /// Three students: a law major, an ineligible business major, and a
    /// high-GPA computer science major.
    pub(crate) fn sample_context() -> AppContext {
        let profiles = vec![
            profile("S00001", "Megan Mcclain", "Law", 2.84, true),
            profile("S00002", "Bob Jones", "Business", 2.5, false),
            profile("S00003", "Alice Smith", "Computer Science", 3.8, true),
        ];
        let determinations = determinations_for(&profiles);
        AppContext::new(
            &AppConfig::default(),
            Arc::new(RegistrarSystem::from_profiles(profiles)),
            Arc::new(FinancialAidSystem::with_determinations(determinations)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finaid_config::AppConfig;
    use finaid_core::tool::ToolCall;

    #[test]
    fn registry_lists_all_tools() {
        let registry = default_registry(&testing::sample_context());
        assert_eq!(
            registry.names(),
            vec![
                "build_context",
                "check_financial_aid_eligibility",
                "fetch_academic_history",
                "fetch_student_profile",
                "fetch_students",
                "get_claim_history",
                "get_program_details",
                "submit_claim",
            ]
        );
        for def in registry.definitions() {
            assert_eq!(def.parameters["type"], "object", "{} schema", def.name);
        }
    }

    #[tokio::test]
    async fn registry_executes_by_name() {
        let registry = default_registry(&testing::sample_context());
        let call = ToolCall {
            id: "call-1".into(),
            name: "check_financial_aid_eligibility".into(),
            arguments: serde_json::json!({"student_id": "S00001"}),
        };
        let result = registry.execute(&call).await.unwrap();
        assert_eq!(result.call_id, "call-1");
        assert!(result.output.contains("Legal Studies Full Ride"));
    }

    #[tokio::test]
    async fn claims_are_shared_across_context_clones() {
        let app = testing::sample_context();
        let registry = default_registry(&app.clone());
        let call = ToolCall {
            id: "call-2".into(),
            name: "submit_claim".into(),
            arguments: serde_json::json!({"student_id": "S00001", "program_id": "LSFR", "amount": 2500.0}),
        };
        assert!(registry.execute(&call).await.unwrap().success);
        assert_eq!(app.claims.claim_history("S00001").len(), 1);
    }

    #[test]
    fn required_str_rejects_blank() {
        let args = serde_json::json!({"student_id": "  ", "n": 3});
        assert!(required_str(&args, "student_id").is_err());
        assert!(required_str(&args, "n").is_err());
        assert!(required_str(&args, "missing").is_err());
        assert_eq!(required_str(&serde_json::json!({"k": " v "}), "k").unwrap(), "v");
    }

    #[test]
    fn context_loads_from_data_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.data.students_path = dir.path().join("students.json");
        config.data.determinations_path = dir.path().join("determinations.json");

        assert!(AppContext::from_config(&config).is_err());

        std::fs::write(
            &config.data.students_path,
            r#"[{"student_id":"S00009","name":"Evan Brown","major":"Psychology","gpa":3.1}]"#,
        )
        .unwrap();
        let app = AppContext::from_config(&config).unwrap();
        assert!(app
            .financial_aid
            .resolve_financial_aid_eligibility("S00009")
            .contains("Behavioral and Social Sciences Grant"));
    }
}
