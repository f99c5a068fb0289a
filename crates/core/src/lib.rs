//! # FinAid Core
//!
//! Domain types, traits, and error definitions for the FinAid context service.
//! This crate has **zero framework dependencies**: it defines the domain model
//! that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every pluggable seam is a trait here. Implementations live in their
//! respective crates:
//! - [`SourceAdapter`]: context sources (`finaid-sources`)
//! - [`RecordLookup`]: student record systems (`finaid-records`)
//! - [`Tool`]: named text-returning operations (`finaid-tools`)

pub mod error;
pub mod record;
pub mod source;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, RecordError, Result, SourceError, ToolError};
pub use record::{AcademicHistory, CourseRecord, RecordLookup, StudentProfile};
pub use source::{Fragment, Metadata, SourceAdapter, SourceRegistry};
pub use tool::{Tool, ToolCall, ToolDefinition, ToolRegistry, ToolResult};
