//! Resolvers: render record lookups as the sentences clients receive.

use finaid_core::record::StudentProfile;
use std::sync::Arc;

use crate::academic;
use crate::financial_aid::FinancialAidSystem;
use crate::registrar::RegistrarSystem;

fn not_found(student_id: &str) -> String {
    format!("Student with ID {student_id} not found.")
}

fn need_based_status(qualified: bool) -> &'static str {
    if qualified {
        "qualifies for need-based aid"
    } else {
        "does not qualify for need-based aid"
    }
}

fn describe(profile: &StudentProfile) -> String {
    format!(
        "Student {} (ID: {}) has a GPA of {} in {}",
        profile.name, profile.student_id, profile.gpa, profile.major
    )
}

/// Registrar lookups rendered as text.
#[derive(Clone)]
pub struct RegistrarResolver {
    registrar: Arc<RegistrarSystem>,
}

impl RegistrarResolver {
    pub fn new(registrar: Arc<RegistrarSystem>) -> Self {
        Self { registrar }
    }

    pub fn resolve_student_profile(&self, student_id: &str) -> String {
        match self.registrar.student_profile(student_id) {
            Some(profile) => format!(
                "{} and {}.",
                describe(profile),
                need_based_status(profile.is_need_based_qualified)
            ),
            None => not_found(student_id),
        }
    }

    /// The raw profile, when the student exists.
    pub fn student(&self, student_id: &str) -> Option<&StudentProfile> {
        self.registrar.student_profile(student_id)
    }

    pub fn resolve_student_profiles(&self, limit: usize) -> Vec<StudentProfile> {
        self.registrar.student_profiles(limit).to_vec()
    }

    pub fn resolve_academic_history(&self, student_id: &str) -> String {
        match self.registrar.student_profile(student_id) {
            Some(profile) => {
                let history = academic::generate_history(profile);
                academic::render_history(profile, &history)
            }
            None => format!("Academic history for student {student_id} not found."),
        }
    }
}

/// Eligibility lookups rendered as text.
#[derive(Clone)]
pub struct FinancialAidResolver {
    registrar: Arc<RegistrarSystem>,
    financial_aid: Arc<FinancialAidSystem>,
}

impl FinancialAidResolver {
    pub fn new(registrar: Arc<RegistrarSystem>, financial_aid: Arc<FinancialAidSystem>) -> Self {
        Self {
            registrar,
            financial_aid,
        }
    }

    pub fn resolve_financial_aid_eligibility(&self, student_id: &str) -> String {
        let Some(profile) = self.registrar.student_profile(student_id) else {
            return not_found(student_id);
        };

        let outcome = self.financial_aid.eligible_financial_aid(profile).unwrap_or_default();
        let requirements = if outcome.requirements.is_empty() {
            "Requirements unspecified for program or major.".to_string()
        } else {
            outcome.requirements.join(", ")
        };

        if outcome.financial_aid.is_empty() {
            format!(
                "{}. They are not eligible for financial aid. Requirements: {}",
                describe(profile),
                requirements
            )
        } else {
            format!(
                "{}. They are eligible for the {}. Requirements: {}",
                describe(profile),
                outcome.financial_aid.join(", "),
                requirements
            )
        }
    }

    pub fn financial_aid(&self) -> &FinancialAidSystem {
        &self.financial_aid
    }

    pub fn registrar(&self) -> &RegistrarSystem {
        &self.registrar
    }
}
