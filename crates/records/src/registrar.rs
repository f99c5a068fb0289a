//! Registrar: student profiles loaded from a JSON data file.

use async_trait::async_trait;
use finaid_core::error::RecordError;
use finaid_core::record::{AcademicHistory, RecordLookup, StudentProfile};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use crate::academic;

/// In-memory registrar over a fixed set of profiles.
///
/// Profiles keep their file order so `student_profiles(limit)` is stable.
pub struct RegistrarSystem {
    students: Vec<StudentProfile>,
    index: HashMap<String, usize>,
}

impl RegistrarSystem {
    /// Load profiles from a JSON array file.
    ///
    /// Unlike the determinations file, the student file is required.
    pub fn load(path: &Path) -> Result<Self, RecordError> {
        if !path.exists() {
            return Err(RecordError::DataFileMissing(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path).map_err(|e| RecordError::LoadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let profiles: Vec<StudentProfile> =
            serde_json::from_str(&content).map_err(|e| RecordError::LoadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        info!(path = %path.display(), count = profiles.len(), "Registrar data loaded");
        Ok(Self::from_profiles(profiles))
    }

    /// Build a registrar from profiles. Later duplicates of an ID win.
    pub fn from_profiles(profiles: Vec<StudentProfile>) -> Self {
        let index = profiles
            .iter()
            .enumerate()
            .map(|(i, p)| (p.student_id.clone(), i))
            .collect();
        Self {
            students: profiles,
            index,
        }
    }

    pub fn student_profile(&self, student_id: &str) -> Option<&StudentProfile> {
        self.index.get(student_id).map(|&i| &self.students[i])
    }

    /// The first `limit` profiles in file order.
    pub fn student_profiles(&self, limit: usize) -> &[StudentProfile] {
        &self.students[..limit.min(self.students.len())]
    }

    /// The student's transcript, generated deterministically from the profile.
    pub fn academic_history(&self, student_id: &str) -> Option<AcademicHistory> {
        let profile = self.student_profile(student_id)?;
        debug!(student_id, "Generating academic history");
        Some(academic::generate_history(profile))
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}

#[async_trait]
impl RecordLookup for RegistrarSystem {
    async fn lookup(&self, student_id: &str) -> Result<Option<StudentProfile>, RecordError> {
        Ok(self.student_profile(student_id).cloned())
    }
}
