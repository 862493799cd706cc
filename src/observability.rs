use std::net::SocketAddr;

use crate::tools::ToolCall;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: total tool calls handled. Labels: tool, status.
pub const TOOL_CALLS_TOTAL: &str = "allotment_tool_calls_total";

/// Histogram: tool call latency in seconds. Labels: tool.
pub const TOOL_CALL_DURATION_SECONDS: &str = "allotment_tool_call_duration_seconds";

// ── Domain metrics ──────────────────────────────────────────────

/// Counter: allocations written. Labels: op (create, update).
pub const ALLOCATIONS_COMMITTED_TOTAL: &str = "allotment_allocations_committed_total";

/// Counter: rejected creates/updates. Labels: op, kind.
pub const REJECTIONS_TOTAL: &str = "allotment_rejections_total";

/// Gauge: records loaded at startup. Labels: entity.
pub const RECORDS_LOADED: &str = "allotment_records_loaded";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    match metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
    {
        Ok(()) => tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics"),
        Err(e) => tracing::error!("failed to install Prometheus metrics exporter: {e}"),
    }
}

/// Map a ToolCall variant to a short label for metrics.
pub fn tool_label(call: &ToolCall) -> &'static str {
    match call {
        ToolCall::AllocateEngineer { .. } => "allocate_engineer",
        ToolCall::UpdateAllocation { .. } => "update_allocation",
        ToolCall::GetAllocationById { .. } => "get_allocation_by_id",
        ToolCall::GetEngineerById { .. } => "get_engineer_by_id",
        ToolCall::GetProjectById { .. } => "get_project_by_id",
        ToolCall::ListAllocations => "list_allocations",
        ToolCall::ListEngineers => "list_engineers",
        ToolCall::ListProjects => "list_projects",
    }
}
