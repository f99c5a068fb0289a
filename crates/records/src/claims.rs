//! Claims: financial aid award claims submitted on a student's behalf.
//!
//! Claims live in memory for the life of the process. Every new claim
//! starts `Pending`; there is no review workflow behind it.

use chrono::{NaiveDate, Utc};
use finaid_core::error::RecordError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::info;

/// Term stamped on newly submitted claims.
pub const CURRENT_TERM: &str = "Spring 2025";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimStatus {
    Pending,
    Approved,
    Denied,
}

/// One submitted claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// `C` followed by five uppercase hex digits.
    pub claim_id: String,
    pub program_id: String,
    pub amount: f64,
    pub status: ClaimStatus,
    pub submitted_date: NaiveDate,
    pub approved_date: Option<NaiveDate>,
    pub term: String,
    pub notes: String,
}

/// What the caller gets back from [`ClaimsSystem::submit_claim`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    pub success: bool,
    pub claim_id: String,
    pub student_id: String,
    pub program_id: String,
    pub status: ClaimStatus,
}

/// Per-student claim history, in submission order.
#[derive(Debug, Default)]
pub struct ClaimsSystem {
    claims: Mutex<HashMap<String, Vec<Claim>>>,
}

fn new_claim_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("C{}", hex[..5].to_ascii_uppercase())
}

impl ClaimsSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Claim>>> {
        self.claims.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record a new pending claim for `student_id`.
    ///
    /// The amount must be a positive, finite number of dollars.
    pub fn submit_claim(
        &self,
        student_id: &str,
        program_id: &str,
        amount: f64,
    ) -> Result<ClaimReceipt, RecordError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(RecordError::InvalidClaim(format!(
                "amount must be a positive number, got {amount}"
            )));
        }

        let claim = Claim {
            claim_id: new_claim_id(),
            program_id: program_id.into(),
            amount,
            status: ClaimStatus::Pending,
            submitted_date: Utc::now().date_naive(),
            approved_date: None,
            term: CURRENT_TERM.into(),
            notes: "Newly submitted claim".into(),
        };
        let receipt = ClaimReceipt {
            success: true,
            claim_id: claim.claim_id.clone(),
            student_id: student_id.into(),
            program_id: program_id.into(),
            status: claim.status,
        };

        info!(student_id, program_id, claim_id = %claim.claim_id, "Claim submitted");
        self.lock().entry(student_id.into()).or_default().push(claim);
        Ok(receipt)
    }

    /// Every claim for `student_id`, oldest first. Unknown students have none.
    pub fn claim_history(&self, student_id: &str) -> Vec<Claim> {
        self.lock().get(student_id).cloned().unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.lock().values().map(Vec::len).sum()
    }
}
