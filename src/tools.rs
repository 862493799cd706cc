//! Tool dispatch: named calls with JSON arguments, mapped onto engine operations.
//!
//! A request line looks like
//! `{"tool": "allocate_engineer", "arguments": {"engineer_id": "e1", ...}}`.
//! Mutating tools answer `{"success", "message", "allocation"?}`; lookups answer
//! the record or `null`; listings answer an array.

use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::engine::{AllocateRequest, AllocationError, Engine, UpdateRequest};
use crate::limits::MAX_REQUEST_LEN;
use crate::model::*;
use crate::observability::{self, tool_label};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("malformed request: {0}")]
    Malformed(String),
    #[error("request too long: {0} bytes")]
    TooLong(usize),
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("bad arguments for {tool}: {reason}")]
    BadArguments { tool: String, reason: String },
}

#[derive(Debug, Deserialize)]
pub struct ToolRequest {
    pub tool: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AllocateArgs {
    pub engineer_id: String,
    pub project_id: String,
    pub allocation_percentage: i64,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateArgs {
    pub allocation_id: String,
    #[serde(default)]
    pub allocation_percentage: Option<i64>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AllocationIdArg {
    allocation_id: String,
}

#[derive(Debug, Deserialize)]
struct EngineerIdArg {
    engineer_id: String,
}

#[derive(Debug, Deserialize)]
struct ProjectIdArg {
    project_id: String,
}

/// Parsed tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    AllocateEngineer(AllocateArgs),
    UpdateAllocation(UpdateArgs),
    GetAllocationById { allocation_id: String },
    GetEngineerById { engineer_id: String },
    GetProjectById { project_id: String },
    ListAllocations,
    ListEngineers,
    ListProjects,
}

impl ToolCall {
    pub fn from_request(req: ToolRequest) -> Result<Self, ToolError> {
        let tool = req.tool.as_str();
        let args = match req.arguments {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        match tool {
            "allocate_engineer" => Ok(ToolCall::AllocateEngineer(parse_args(tool, args)?)),
            "update_allocation" => Ok(ToolCall::UpdateAllocation(parse_args(tool, args)?)),
            "get_allocation_by_id" => {
                let AllocationIdArg { allocation_id } = parse_args(tool, args)?;
                Ok(ToolCall::GetAllocationById { allocation_id })
            }
            "get_engineer_by_id" => {
                let EngineerIdArg { engineer_id } = parse_args(tool, args)?;
                Ok(ToolCall::GetEngineerById { engineer_id })
            }
            "get_project_by_id" => {
                let ProjectIdArg { project_id } = parse_args(tool, args)?;
                Ok(ToolCall::GetProjectById { project_id })
            }
            "list_allocations" => Ok(ToolCall::ListAllocations),
            "list_engineers" => Ok(ToolCall::ListEngineers),
            "list_projects" => Ok(ToolCall::ListProjects),
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }
}

fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::BadArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

/// Parse one request line.
pub fn parse_request(line: &str) -> Result<ToolCall, ToolError> {
    if line.len() > MAX_REQUEST_LEN {
        return Err(ToolError::TooLong(line.len()));
    }
    let req: ToolRequest =
        serde_json::from_str(line).map_err(|e| ToolError::Malformed(e.to_string()))?;
    ToolCall::from_request(req)
}

/// `(success, message, allocation)` as handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation: Option<Allocation>,
}

impl From<Result<Committed, AllocationError>> for MutationResult {
    fn from(result: Result<Committed, AllocationError>) -> Self {
        match result {
            Ok(Committed { allocation, message }) => Self {
                success: true,
                message,
                allocation: Some(allocation),
            },
            Err(e) => Self {
                success: false,
                message: e.to_string(),
                allocation: None,
            },
        }
    }
}

/// Run a parsed call against the engine and render the answer.
pub async fn dispatch(engine: &Engine, call: ToolCall) -> Value {
    let tool = tool_label(&call);
    let started = Instant::now();

    let (status, response) = match call {
        ToolCall::AllocateEngineer(args) => {
            let req = AllocateRequest {
                engineer_id: &args.engineer_id,
                project_id: &args.project_id,
                percentage: args.allocation_percentage,
                start_date: args.start_date.as_deref(),
                end_date: args.end_date.as_deref(),
            };
            render_mutation(engine.allocate_engineer(req).await)
        }
        ToolCall::UpdateAllocation(args) => {
            let req = UpdateRequest {
                percentage: args.allocation_percentage,
                start_date: args.start_date.as_deref(),
                end_date: args.end_date.as_deref(),
            };
            render_mutation(engine.update_allocation(&args.allocation_id, req).await)
        }
        ToolCall::GetAllocationById { allocation_id } => {
            ("ok", json!(engine.get_allocation_by_id(&allocation_id).await))
        }
        ToolCall::GetEngineerById { engineer_id } => {
            ("ok", json!(engine.get_engineer_by_id(&engineer_id)))
        }
        ToolCall::GetProjectById { project_id } => {
            ("ok", json!(engine.get_project_by_id(&project_id)))
        }
        ToolCall::ListAllocations => ("ok", json!(engine.list_allocations().await)),
        ToolCall::ListEngineers => ("ok", json!(engine.list_engineers())),
        ToolCall::ListProjects => ("ok", json!(engine.list_projects())),
    };

    metrics::counter!(observability::TOOL_CALLS_TOTAL, "tool" => tool, "status" => status)
        .increment(1);
    metrics::histogram!(observability::TOOL_CALL_DURATION_SECONDS, "tool" => tool)
        .record(started.elapsed().as_secs_f64());
    response
}

fn render_mutation(result: Result<Committed, AllocationError>) -> (&'static str, Value) {
    let status = if result.is_ok() { "ok" } else { "rejected" };
    (status, json!(MutationResult::from(result)))
}

/// Parse, dispatch, and serialize one request line. Parse failures become
/// `{"error": ...}` and never reach the engine.
pub async fn handle_line(engine: &Engine, line: &str) -> String {
    let response = match parse_request(line) {
        Ok(call) => dispatch(engine, call).await,
        Err(e) => {
            tracing::warn!("bad request: {e}");
            metrics::counter!(
                observability::TOOL_CALLS_TOTAL,
                "tool" => "unknown",
                "status" => "error"
            )
            .increment(1);
            json!({ "error": e.to_string() })
        }
    };
    response.to_string()
}
