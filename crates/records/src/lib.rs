//! Record systems for FinAid.
//!
//! Synthetic stand-ins for the registrar and the financial aid office:
//! - [`RegistrarSystem`]: student profiles and generated transcripts
//! - [`FinancialAidSystem`]: program catalog and eligibility rules
//! - [`ClaimsSystem`]: submitted award claims, held in memory
//! - [`resolvers`]: renders lookups as the sentences the tools return
//! - [`synthetic`]: generates the JSON data files

pub mod academic;
pub mod claims;
pub mod financial_aid;
pub mod registrar;
pub mod resolvers;
pub mod synthetic;

pub use claims::{Claim, ClaimReceipt, ClaimStatus, ClaimsSystem};
pub use financial_aid::{
    AidProgram, Determination, EligibilityOutcome, FinancialAidSystem, SpecificEligibility,
};
pub use registrar::RegistrarSystem;
pub use resolvers::{FinancialAidResolver, RegistrarResolver};
