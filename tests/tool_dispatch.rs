use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde_json::{json, Value};

use allotment::engine::Engine;
use allotment::loader;
use allotment::tools;

// ── Test infrastructure ──────────────────────────────────────

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
}

fn fixture_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("allotment_int_test").join(name);
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join(loader::ENGINEERS_FILE),
        r#"[{"id": "e1", "name": "Ada", "level": 3}, {"id": "e2", "name": "Grace"}]"#,
    )
    .unwrap();
    fs::write(
        dir.join(loader::PROJECTS_FILE),
        r#"[{"id": "p1", "name": "Apollo"}, {"id": "p2", "name": "Gemini"}, {"id": "p3", "name": "Mercury"}]"#,
    )
    .unwrap();
    fs::write(
        dir.join(loader::ALLOCATIONS_FILE),
        r#"[{"id": "alloc-0000beef", "engineerId": "e2", "projectId": "p3",
             "allocationPercentage": 70, "startDate": "2025-01-01T00:00:00", "endDate": null}]"#,
    )
    .unwrap();
    dir
}

async fn loaded_engine(name: &str) -> Engine {
    let engine = Engine::with_clock(today);
    loader::load_data_dir(&engine, &fixture_dir(name)).await.unwrap();
    engine
}

async fn call(engine: &Engine, tool: &str, arguments: Value) -> Value {
    let line = json!({ "tool": tool, "arguments": arguments }).to_string();
    serde_json::from_str(&tools::handle_line(engine, &line).await).unwrap()
}

// ── Tests ────────────────────────────────────────────────────

#[tokio::test]
async fn allocate_and_fetch_round_trip() {
    let engine = loaded_engine("round_trip").await;

    let resp = call(
        &engine,
        "allocate_engineer",
        json!({"engineer_id": "e1", "project_id": "p1", "allocation_percentage": 60}),
    )
    .await;
    assert_eq!(resp["success"], json!(true));
    assert_eq!(
        resp["message"],
        json!("Successfully allocated 60% of Ada to Apollo starting from 2025-03-01 (indefinite).")
    );
    let alloc = resp["allocation"].clone();
    assert_eq!(alloc["engineerId"], json!("e1"));
    assert_eq!(alloc["startDate"], json!("2025-03-01"));
    assert_eq!(alloc["endDate"], Value::Null);

    let id = alloc["id"].as_str().unwrap().to_string();
    let fetched = call(&engine, "get_allocation_by_id", json!({"allocation_id": id})).await;
    assert_eq!(fetched, alloc);
}

#[tokio::test]
async fn rejections_carry_no_allocation() {
    let engine = loaded_engine("rejections").await;

    let resp = call(
        &engine,
        "allocate_engineer",
        json!({"engineer_id": "e2", "project_id": "p1", "allocation_percentage": 40}),
    )
    .await;
    assert_eq!(
        resp,
        json!({
            "success": false,
            "message": "Engineer 'Grace' is over-allocated. Current allocation during this period: 70%. Adding 40% would result in 110% total allocation.",
        })
    );

    let resp = call(
        &engine,
        "allocate_engineer",
        json!({
            "engineer_id": "e2",
            "project_id": "p3",
            "allocation_percentage": 10,
            "start_date": "2025-05-01",
        }),
    )
    .await;
    assert_eq!(resp["success"], json!(false));
    assert_eq!(
        resp["message"],
        json!("Engineer 'Grace' is already allocated to project 'Mercury' from 2025-01-01 to indefinite.")
    );
}

#[tokio::test]
async fn update_loaded_allocation() {
    let engine = loaded_engine("update_loaded").await;

    let resp = call(
        &engine,
        "update_allocation",
        json!({
            "allocation_id": "alloc-0000beef",
            "allocation_percentage": 30,
            "end_date": "2025-12-31",
        }),
    )
    .await;
    assert_eq!(resp["success"], json!(true));
    assert_eq!(
        resp["message"],
        json!("Successfully updated allocation. Grace is now 30% allocated to Mercury from 2025-01-01 to 2025-12-31.")
    );
    assert_eq!(resp["allocation"]["endDate"], json!("2025-12-31"));

    let missing = call(&engine, "update_allocation", json!({"allocation_id": "alloc-nope"})).await;
    assert_eq!(
        missing,
        json!({"success": false, "message": "Allocation with ID 'alloc-nope' not found."})
    );
}

#[tokio::test]
async fn listings_and_lookups() {
    let engine = loaded_engine("listings").await;

    let engineers = call(&engine, "list_engineers", Value::Null).await;
    assert_eq!(
        engineers,
        json!([{"id": "e1", "name": "Ada", "level": 3}, {"id": "e2", "name": "Grace"}])
    );

    let projects = call(&engine, "list_projects", json!({})).await;
    assert_eq!(projects.as_array().unwrap().len(), 3);

    let active = call(&engine, "list_allocations", json!({})).await;
    assert_eq!(active.as_array().unwrap().len(), 1);
    assert_eq!(active[0]["id"], json!("alloc-0000beef"));
    assert_eq!(active[0]["startDate"], json!("2025-01-01"));
    assert_eq!(call(&engine, "list_allocations", json!({})).await, active);

    assert_eq!(
        call(&engine, "get_engineer_by_id", json!({"engineer_id": "e1"})).await,
        json!({"id": "e1", "name": "Ada", "level": 3})
    );
    assert_eq!(
        call(&engine, "get_project_by_id", json!({"project_id": "p9"})).await,
        Value::Null
    );
}

#[tokio::test]
async fn bad_requests_answer_with_error() {
    let engine = loaded_engine("bad_requests").await;

    let resp: Value = serde_json::from_str(&tools::handle_line(&engine, "{oops").await).unwrap();
    assert!(resp["error"].as_str().unwrap().starts_with("malformed request"));

    let resp = call(&engine, "get_weather", json!({"city": "Oslo"})).await;
    assert_eq!(resp, json!({"error": "unknown tool: get_weather"}));

    let resp = call(
        &engine,
        "allocate_engineer",
        json!({"engineer_id": "e1", "allocation_percentage": 10}),
    )
    .await;
    assert!(resp["error"].as_str().unwrap().starts_with("bad arguments for allocate_engineer"));
    assert_eq!(engine.store.allocation_count(), 1);
}
