//! Claim tools: submit an award claim, list a student's claims.

use async_trait::async_trait;
use finaid_core::error::ToolError;
use finaid_core::tool::{Tool, ToolResult};
use finaid_records::{Claim, ClaimsSystem, FinancialAidResolver};
use std::sync::Arc;

use crate::required_str;

fn describe_claim(claim: &Claim) -> String {
    format!(
        "{}: {} ${:.2}, {:?}, submitted {} ({})",
        claim.claim_id, claim.program_id, claim.amount, claim.status, claim.submitted_date, claim.term
    )
}

fn not_found(output: String) -> ToolResult {
    ToolResult {
        success: false,
        ..ToolResult::text(output)
    }
}

pub struct SubmitClaimTool {
    claims: Arc<ClaimsSystem>,
    financial_aid: FinancialAidResolver,
}

impl SubmitClaimTool {
    pub fn new(claims: Arc<ClaimsSystem>, financial_aid: FinancialAidResolver) -> Self {
        Self {
            claims,
            financial_aid,
        }
    }
}

#[async_trait]
impl Tool for SubmitClaimTool {
    fn name(&self) -> &str {
        "submit_claim"
    }

    fn description(&self) -> &str {
        "Submit a financial aid claim for a student against a program. New claims are Pending."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "student_id": {
                    "type": "string",
                    "description": "Student the claim is for"
                },
                "program_id": {
                    "type": "string",
                    "description": "Program ID, e.g. 'STEM'"
                },
                "amount": {
                    "type": "number",
                    "description": "Claimed amount in dollars"
                }
            },
            "required": ["student_id", "program_id", "amount"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let student_id = required_str(&arguments, "student_id")?;
        let program_id = required_str(&arguments, "program_id")?;
        let amount = arguments["amount"]
            .as_f64()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'amount' argument".into()))?;

        if self.financial_aid.registrar().student_profile(student_id).is_none() {
            return Ok(not_found(format!("Student with ID {student_id} not found.")));
        }
        if self.financial_aid.financial_aid().program_details(program_id).is_none() {
            return Ok(not_found(format!("Program {program_id} not found.")));
        }

        let receipt = self.claims.submit_claim(student_id, program_id, amount)?;
        Ok(ToolResult::text(format!(
            "Claim {} submitted for student {} under {}: ${:.2}, status {:?}.",
            receipt.claim_id, receipt.student_id, receipt.program_id, amount, receipt.status
        ))
        .with_data(serde_json::to_value(&receipt)?))
    }
}

pub struct GetClaimHistoryTool {
    claims: Arc<ClaimsSystem>,
}

impl GetClaimHistoryTool {
    pub fn new(claims: Arc<ClaimsSystem>) -> Self {
        Self { claims }
    }
}

#[async_trait]
impl Tool for GetClaimHistoryTool {
    fn name(&self) -> &str {
        "get_claim_history"
    }

    fn description(&self) -> &str {
        "List the financial aid claims submitted for a student, oldest first."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "student_id": {
                    "type": "string",
                    "description": "Student whose claims to list"
                }
            },
            "required": ["student_id"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let student_id = required_str(&arguments, "student_id")?;
        let history = self.claims.claim_history(student_id);

        let output = if history.is_empty() {
            format!("No claims found for student {student_id}.")
        } else {
            history.iter().map(describe_claim).collect::<Vec<_>>().join("\n")
        };
        Ok(ToolResult::text(output).with_data(serde_json::to_value(&history)?))
    }
}
