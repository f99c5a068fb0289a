//! Resource URIs: read-only views addressed as `scheme://path`.
//!
//! | URI | Content |
//! |-----|---------|
//! | `students://{id}/profile` | profile sentence |
//! | `students://profiles` | JSON list of the first 100 profiles |
//! | `students://{id}/academic-history` | transcript text |
//! | `students://{id}/financial-aid` | eligibility sentence |
//! | `health://` | `ok` |
//! | `root://` | server banner |
//! | `greetings://{name}` | greeting |

use finaid_core::error::ToolError;
use serde::{Deserialize, Serialize};

use crate::app::AppContext;
use crate::students::DEFAULT_STUDENT_LIMIT;

/// A resolved resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceContent {
    pub uri: String,
    pub mime_type: String,
    pub text: String,
}

impl ResourceContent {
    fn text(uri: &str, text: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            mime_type: "text/plain".into(),
            text: text.into(),
        }
    }
}

/// A URI pattern clients can discover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTemplate {
    pub uri_template: String,
    pub description: String,
}

const TEMPLATES: &[(&str, &str)] = &[
    ("students://{student_id}/profile", "Get a student's profile information."),
    ("students://profiles", "Get a list of students."),
    ("students://{student_id}/academic-history", "Get a student's academic history."),
    ("students://{student_id}/financial-aid", "Get programs a student is eligible for."),
    ("health://", "Health check."),
    ("root://", "Server banner."),
    ("greetings://{name}", "Generate a personalized greeting for the given name."),
];

/// Routes resource URIs to the record resolvers.
#[derive(Clone)]
pub struct ResourceRouter {
    app: AppContext,
}

impl ResourceRouter {
    pub fn new(app: AppContext) -> Self {
        Self { app }
    }

    pub fn templates(&self) -> Vec<ResourceTemplate> {
        TEMPLATES
            .iter()
            .map(|(uri, description)| ResourceTemplate {
                uri_template: (*uri).into(),
                description: (*description).into(),
            })
            .collect()
    }

    pub fn read(&self, uri: &str) -> Result<ResourceContent, ToolError> {
        let unknown = || ToolError::UnknownResource(uri.to_string());
        let (scheme, path) = uri.split_once("://").ok_or_else(unknown)?;

        match (scheme, path) {
            ("health", "") => Ok(ResourceContent::text(uri, "ok")),
            ("root", "") => Ok(ResourceContent::text(uri, "Financial Aid MCP Server is running")),
            ("greetings", name) if !name.is_empty() => Ok(ResourceContent::text(
                uri,
                format!("Hello, {name}! Welcome to MCP."),
            )),
            ("students", "profiles") => {
                let limit = usize::try_from(DEFAULT_STUDENT_LIMIT).unwrap_or(usize::MAX);
                let profiles = self.app.registrar.resolve_student_profiles(limit);
                Ok(ResourceContent {
                    uri: uri.into(),
                    mime_type: "application/json".into(),
                    text: serde_json::to_string(&profiles)?,
                })
            }
            ("students", path) => {
                let (student_id, view) = path.split_once('/').ok_or_else(unknown)?;
                if student_id.is_empty() {
                    return Err(unknown());
                }
                let text = match view {
                    "profile" => self.app.registrar.resolve_student_profile(student_id),
                    "academic-history" => self.app.registrar.resolve_academic_history(student_id),
                    "financial-aid" => self
                        .app
                        .financial_aid
                        .resolve_financial_aid_eligibility(student_id),
                    _ => return Err(unknown()),
                };
                Ok(ResourceContent::text(uri, text))
            }
            _ => Err(unknown()),
        }
    }
}
