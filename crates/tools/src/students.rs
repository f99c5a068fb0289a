//! Registrar tools: profiles, the student list, academic history.

use async_trait::async_trait;
use finaid_core::error::ToolError;
use finaid_core::tool::{Tool, ToolResult};
use finaid_records::RegistrarResolver;

use crate::required_str;

pub const DEFAULT_STUDENT_LIMIT: u64 = 100;

fn student_id_schema(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "student_id": {
                "type": "string",
                "description": description
            }
        },
        "required": ["student_id"]
    })
}

pub struct FetchStudentProfileTool {
    registrar: RegistrarResolver,
}

impl FetchStudentProfileTool {
    pub fn new(registrar: RegistrarResolver) -> Self {
        Self { registrar }
    }
}

#[async_trait]
impl Tool for FetchStudentProfileTool {
    fn name(&self) -> &str {
        "fetch_student_profile"
    }

    fn description(&self) -> &str {
        "Get a student's profile information: name, major, GPA and need-based aid status."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        student_id_schema("Student ID, e.g. 'S1A2B3'")
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let student_id = required_str(&arguments, "student_id")?;
        let output = self.registrar.resolve_student_profile(student_id);

        Ok(match self.registrar.student(student_id) {
            Some(profile) => ToolResult::text(output).with_data(serde_json::to_value(profile)?),
            None => ToolResult {
                success: false,
                ..ToolResult::text(output)
            },
        })
    }
}

pub struct FetchStudentsTool {
    registrar: RegistrarResolver,
}

impl FetchStudentsTool {
    pub fn new(registrar: RegistrarResolver) -> Self {
        Self { registrar }
    }
}

#[async_trait]
impl Tool for FetchStudentsTool {
    fn name(&self) -> &str {
        "fetch_students"
    }

    fn description(&self) -> &str {
        "List student profiles, up to a limit (default 100)."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "limit": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Maximum number of students to return",
                    "default": DEFAULT_STUDENT_LIMIT
                }
            }
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let limit = match arguments.get("limit") {
            None | Some(serde_json::Value::Null) => DEFAULT_STUDENT_LIMIT,
            Some(v) => v.as_u64().ok_or_else(|| {
                ToolError::InvalidArguments("'limit' must be a non-negative integer".into())
            })?,
        };

        let profiles = self
            .registrar
            .resolve_student_profiles(usize::try_from(limit).unwrap_or(usize::MAX));
        let output = profiles
            .iter()
            .map(|p| format!("{} (ID: {}): {}, GPA {}", p.name, p.student_id, p.major, p.gpa))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(ToolResult::text(output).with_data(serde_json::to_value(&profiles)?))
    }
}

pub struct FetchAcademicHistoryTool {
    registrar: RegistrarResolver,
}

impl FetchAcademicHistoryTool {
    pub fn new(registrar: RegistrarResolver) -> Self {
        Self { registrar }
    }
}

#[async_trait]
impl Tool for FetchAcademicHistoryTool {
    fn name(&self) -> &str {
        "fetch_academic_history"
    }

    fn description(&self) -> &str {
        "Get a student's academic history: courses by term, grades, credits and honors."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        student_id_schema("Student ID whose transcript to fetch")
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let student_id = required_str(&arguments, "student_id")?;
        let output = self.registrar.resolve_academic_history(student_id);
        Ok(ToolResult {
            success: self.registrar.student(student_id).is_some(),
            ..ToolResult::text(output)
        })
    }
}
