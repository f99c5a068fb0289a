//! Financial aid office: program catalog and rule-based eligibility.

use finaid_core::error::RecordError;
use finaid_core::record::StudentProfile;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// A financial aid program offered by the university.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AidProgram {
    pub id: String,
    pub name: String,
    pub description: String,
    pub max_amount: f64,
    pub criteria: String,
    pub deadline: String,
}

/// A prior aid determination, as stored in the determinations file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Determination {
    pub id: String,
    pub name: String,
    pub gpa: f64,
    pub field_of_study: String,
    #[serde(default)]
    pub financial_aid: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
}

/// Requirements met and awards granted by the eligibility rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EligibilityOutcome {
    pub requirements: Vec<String>,
    pub financial_aid: Vec<String>,
}

/// Answer to "is this student eligible for that program?".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecificEligibility {
    pub eligible: bool,
    pub student_id: String,
    pub program_id: String,
    pub reason: String,
}

pub const STEM_FIELDS: &[&str] = &[
    "Computer Science",
    "Engineering",
    "Mathematics",
    "IT",
    "Statistics",
];
pub const BEHAVIORAL_FIELDS: &[&str] = &["Psychology", "Sociology", "Social Work", "Anthropology"];
pub const LEGAL_FIELDS: &[&str] = &["Paralegal", "Law"];

pub const GPA_REQUIREMENT: &str = "GPA ≥ 3.6";

fn program_catalog() -> Vec<AidProgram> {
    vec![
        AidProgram {
            id: "STEM".into(),
            name: "STEM Excellence Award".into(),
            description: "Financial aid for students in STEM fields.".into(),
            max_amount: 5000.00,
            criteria: "Field of Study in STEM and minimum GPA of 3.6.".into(),
            deadline: "May 31, 2025".into(),
        },
        AidProgram {
            id: "BSSG".into(),
            name: "Behavioral and Social Sciences Grant".into(),
            description: "Grant program for behavioral and social sciences students.".into(),
            max_amount: 4000.00,
            criteria: "Field of Study in Behavioral and Social Sciences.".into(),
            deadline: "June 15, 2025".into(),
        },
        AidProgram {
            id: "LSFR".into(),
            name: "Legal Studies Full Ride".into(),
            description: "Full tuition coverage for legal studies students.".into(),
            max_amount: 10000.00,
            criteria: "Field of Study in Legal Studies.".into(),
            deadline: "April 30, 2025".into(),
        },
    ]
}

/// Eligibility rules plus the program catalog.
pub struct FinancialAidSystem {
    determinations: HashMap<String, Determination>,
    programs: Vec<AidProgram>,
}

impl FinancialAidSystem {
    /// A system with the built-in catalog and no determinations on file.
    pub fn new() -> Self {
        Self::with_determinations(Vec::new())
    }

    pub fn with_determinations(determinations: Vec<Determination>) -> Self {
        Self {
            determinations: determinations.into_iter().map(|d| (d.id.clone(), d)).collect(),
            programs: program_catalog(),
        }
    }

    /// Load determinations from a JSON array file.
    ///
    /// A missing file is not an error: the system starts with none on file.
    pub fn load(path: &Path) -> Result<Self, RecordError> {
        if !path.exists() {
            info!(path = %path.display(), "No determinations file, starting empty");
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(path).map_err(|e| RecordError::LoadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let determinations: Vec<Determination> =
            serde_json::from_str(&content).map_err(|e| RecordError::LoadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        info!(path = %path.display(), count = determinations.len(), "Determinations loaded");
        Ok(Self::with_determinations(determinations))
    }

    /// Apply the eligibility rules to a GPA and field of study.
    pub fn determine_eligibility(gpa: f64, field_of_study: &str) -> EligibilityOutcome {
        let mut outcome = EligibilityOutcome::default();

        if gpa >= 3.6 {
            outcome.requirements.push(GPA_REQUIREMENT.into());
        }

        if STEM_FIELDS.contains(&field_of_study) {
            outcome.financial_aid.push("STEM Excellence Award".into());
            outcome.requirements.push("Field of Study in STEM".into());
        }

        if BEHAVIORAL_FIELDS.contains(&field_of_study) {
            outcome.financial_aid.push("Behavioral and Social Sciences Grant".into());
            outcome
                .requirements
                .push("Field of Study in Behavioral and Social Sciences".into());
        }

        if LEGAL_FIELDS.contains(&field_of_study) {
            outcome.financial_aid.push("Legal Studies Full Ride".into());
            outcome.requirements.push("Field of Study in Legal Studies".into());
        }

        outcome
    }

    /// Eligibility for a registrar profile.
    ///
    /// With determinations on file, only students present in that file are
    /// assessed (`None` otherwise). With none on file, everyone is.
    pub fn eligible_financial_aid(&self, profile: &StudentProfile) -> Option<EligibilityOutcome> {
        if !self.determinations.is_empty() && !self.determinations.contains_key(&profile.student_id)
        {
            return None;
        }
        Some(Self::determine_eligibility(profile.gpa, &profile.major))
    }

    /// Check a student against one program using the determinations on file.
    pub fn check_specific_eligibility(&self, student_id: &str, program_id: &str) -> SpecificEligibility {
        let (eligible, reason) = match self.determinations.get(student_id) {
            None => (false, "Student not found in system.".to_string()),
            Some(det) => {
                let awarded = self
                    .program_details(program_id)
                    .is_some_and(|p| det.financial_aid.contains(&p.name));
                if awarded {
                    (true, det.requirements.join(", "))
                } else {
                    (
                        false,
                        "Student does not meet eligibility criteria for this program.".to_string(),
                    )
                }
            }
        };

        SpecificEligibility {
            eligible,
            student_id: student_id.into(),
            program_id: program_id.into(),
            reason,
        }
    }

    pub fn program_details(&self, program_id: &str) -> Option<&AidProgram> {
        self.programs.iter().find(|p| p.id == program_id)
    }

    /// Map a program name (as used in outcomes) back to its catalog entry.
    pub fn program_by_name(&self, name: &str) -> Option<&AidProgram> {
        self.programs.iter().find(|p| p.name == name)
    }

    pub fn programs(&self) -> &[AidProgram] {
        &self.programs
    }
}

impl Default for FinancialAidSystem {
    fn default() -> Self {
        Self::new()
    }
}
