//! Financial aid tools: eligibility and the program catalog.

use async_trait::async_trait;
use finaid_core::error::ToolError;
use finaid_core::tool::{Tool, ToolResult};
use finaid_records::{AidProgram, FinancialAidResolver};

use crate::required_str;

pub struct CheckFinancialAidEligibilityTool {
    financial_aid: FinancialAidResolver,
}

impl CheckFinancialAidEligibilityTool {
    pub fn new(financial_aid: FinancialAidResolver) -> Self {
        Self { financial_aid }
    }
}

#[async_trait]
impl Tool for CheckFinancialAidEligibilityTool {
    fn name(&self) -> &str {
        "check_financial_aid_eligibility"
    }

    fn description(&self) -> &str {
        "Check which financial aid programs a student is eligible for, and why."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "student_id": {
                    "type": "string",
                    "description": "Student ID to assess"
                }
            },
            "required": ["student_id"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let student_id = required_str(&arguments, "student_id")?;
        Ok(ToolResult::text(
            self.financial_aid.resolve_financial_aid_eligibility(student_id),
        ))
    }
}

pub struct GetProgramDetailsTool {
    financial_aid: FinancialAidResolver,
}

impl GetProgramDetailsTool {
    pub fn new(financial_aid: FinancialAidResolver) -> Self {
        Self { financial_aid }
    }
}

pub fn describe_program(program: &AidProgram) -> String {
    format!(
        "{} ({}): {} Maximum award: ${:.2}. Criteria: {} Deadline: {}.",
        program.name,
        program.id,
        program.description,
        program.max_amount,
        program.criteria,
        program.deadline
    )
}

#[async_trait]
impl Tool for GetProgramDetailsTool {
    fn name(&self) -> &str {
        "get_program_details"
    }

    fn description(&self) -> &str {
        "Describe a financial aid program (STEM, BSSG, LSFR). With a student_id, also \
         reports whether that student's determination includes the program."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "program_id": {
                    "type": "string",
                    "description": "Program ID, e.g. 'STEM'"
                },
                "student_id": {
                    "type": "string",
                    "description": "Optional student to check against the program"
                }
            },
            "required": ["program_id"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let program_id = required_str(&arguments, "program_id")?;
        let system = self.financial_aid.financial_aid();

        let Some(program) = system.program_details(program_id) else {
            let known: Vec<&str> = system.programs().iter().map(|p| p.id.as_str()).collect();
            return Ok(ToolResult {
                success: false,
                ..ToolResult::text(format!(
                    "Program {program_id} not found. Known programs: {}",
                    known.join(", ")
                ))
            });
        };

        let mut output = describe_program(program);
        let mut data = serde_json::json!({ "program": program });

        if let Some(student_id) = arguments["student_id"].as_str().filter(|s| !s.trim().is_empty()) {
            let check = system.check_specific_eligibility(student_id, program_id);
            output.push_str(&format!(
                "\nStudent {}: {}. {}",
                student_id,
                if check.eligible { "eligible" } else { "not eligible" },
                check.reason
            ));
            data["eligibility"] = serde_json::to_value(&check)?;
        }

        Ok(ToolResult::text(output).with_data(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_context;

    #[tokio::test]
    async fn eligibility_text() {
        let tool = CheckFinancialAidEligibilityTool::new(sample_context().financial_aid);
        let result = tool
            .execute(serde_json::json!({"student_id": "S00003"}))
            .await
            .unwrap();
        assert!(result.output.contains("They are eligible for the STEM Excellence Award."));
    }

    #[tokio::test]
    async fn program_details() {
        let tool = GetProgramDetailsTool::new(sample_context().financial_aid);
        let result = tool
            .execute(serde_json::json!({"program_id": "LSFR"}))
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.output.starts_with("Legal Studies Full Ride (LSFR):"));
        assert!(result.output.contains("$10000.00"));
        assert_eq!(result.data.unwrap()["program"]["deadline"], "April 30, 2025");
    }

    #[tokio::test]
    async fn program_details_with_student() {
        let tool = GetProgramDetailsTool::new(sample_context().financial_aid);
        let result = tool
            .execute(serde_json::json!({"program_id": "STEM", "student_id": "S00003"}))
            .await
            .unwrap();
        assert!(result.output.contains("Student S00003: eligible."));
        assert_eq!(result.data.unwrap()["eligibility"]["eligible"], true);
    }

    #[tokio::test]
    async fn unknown_program() {
        let tool = GetProgramDetailsTool::new(sample_context().financial_aid);
        let result = tool
            .execute(serde_json::json!({"program_id": "NOPE"}))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.output.contains("Known programs: STEM, BSSG, LSFR"));
    }
}
