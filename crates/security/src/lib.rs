//! Security module for FinAid: request authentication and audit logging.
//!
//! Provides:
//! - **Auth gate**: static bearer tokens and HS256 JWTs, checked before any
//!   tool, resource or context request is served
//! - **JWT helpers**: claim decoding, signature checks, test token issuance
//! - **Audit logging**: structured security event logging

pub mod audit;
pub mod auth;
pub mod jwt;

pub use audit::{AuditEntry, AuditEvent, AuditLogger, AuditOutcome, AuditSink, TracingSink};
pub use auth::{AuthError, AuthGate, AuthMethod, Principal, TokenAuthenticator};
pub use jwt::{Claims, issue_test_token};
