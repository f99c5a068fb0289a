//! `finaid student | students | eligibility | programs`: record lookups.

use std::path::Path;

use finaid_core::tool::ToolResult;

use super::{CmdResult, app_context, load_config, run_tool};

fn print(result: &ToolResult) {
    if result.success {
        println!("{}", result.output);
    } else {
        eprintln!("{}", result.output);
    }
}

pub async fn student(config: Option<&Path>, id: &str, history: bool) -> CmdResult {
    let tool = if history {
        "fetch_academic_history"
    } else {
        "fetch_student_profile"
    };
    let result = run_tool(config, tool, serde_json::json!({ "student_id": id })).await?;
    print(&result);
    Ok(())
}

pub async fn students(config: Option<&Path>, limit: u64) -> CmdResult {
    let result = run_tool(config, "fetch_students", serde_json::json!({ "limit": limit })).await?;
    if result.output.is_empty() {
        println!("No students on file.");
    } else {
        print(&result);
    }
    Ok(())
}

pub async fn eligibility(config: Option<&Path>, id: &str) -> CmdResult {
    let result = run_tool(
        config,
        "check_financial_aid_eligibility",
        serde_json::json!({ "student_id": id }),
    )
    .await?;
    print(&result);
    Ok(())
}

pub async fn programs(config: Option<&Path>, id: Option<&str>, student_id: Option<&str>) -> CmdResult {
    match id {
        Some(id) => {
            let mut args = serde_json::json!({ "program_id": id });
            if let Some(student_id) = student_id {
                args["student_id"] = student_id.into();
            }
            let result = run_tool(config, "get_program_details", args).await?;
            print(&result);
        }
        None => {
            let app = app_context(&load_config(config)?)?;
            for program in app.financial_aid.financial_aid().programs() {
                println!("{}\n", finaid_tools::financial_aid::describe_program(program));
            }
        }
    }
    Ok(())
}
