mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use common::TestServer;

async fn class_with_exam(server: &TestServer) -> Result<(String, String)> {
    let res = server
        .authed(Method::POST, "/api/v1/classes")
        .json(&json!({
            "year": 2025,
            "semester": 2,
            "exam": {"id": "p1", "name": "P1", "date": "2025-09-10T19:00:00Z", "weight": 40}
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = res.json::<Value>().await?;
    Ok((created["id"].as_str().unwrap_or_default().to_string(), "p1".to_string()))
}

#[tokio::test]
async fn add_and_list_exams() -> Result<()> {
    let server = common::start_server().await?;
    let (class_id, _) = class_with_exam(&server).await?;
    let exams_path = format!("/api/v1/classes/{}/exams", class_id);

    let res = server
        .authed(Method::POST, &exams_path)
        .json(&json!({"name": "P2", "date": "2025-11-20T19:00:00Z", "weight": 60}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let location = res
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("missing Location header");
    let exam = res.json::<Value>().await?;
    let exam_id = exam["id"].as_str().unwrap_or_default();
    assert!(!exam_id.is_empty());
    assert_eq!(location, format!("{}/{}", exams_path, exam_id));

    let exams = server
        .authed(Method::GET, &exams_path)
        .send()
        .await?
        .json::<Vec<Value>>()
        .await?;
    let names: Vec<&str> = exams.iter().filter_map(|e| e["name"].as_str()).collect();
    assert_eq!(names, vec!["P1", "P2"]);
    Ok(())
}

#[tokio::test]
async fn adding_existing_exam_id_conflicts() -> Result<()> {
    let server = common::start_server().await?;
    let (class_id, exam_id) = class_with_exam(&server).await?;

    let res = server
        .authed(Method::POST, &format!("/api/v1/classes/{}/exams", class_id))
        .json(&json!({"id": exam_id, "name": "again"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn exams_of_missing_class_are_not_found() -> Result<()> {
    let server = common::start_server().await?;

    let res = server.authed(Method::GET, "/api/v1/classes/nope/exams").send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server
        .authed(Method::POST, "/api/v1/classes/nope/exams")
        .json(&json!({"name": "P1"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn put_replaces_exam_contents() -> Result<()> {
    let server = common::start_server().await?;
    let (class_id, exam_id) = class_with_exam(&server).await?;
    let path = format!("/api/v1/classes/{}/exams/{}", class_id, exam_id);

    let res = server
        .authed(Method::PUT, &path)
        .json(&json!({"id": "other", "name": "P1 (rescheduled)", "date": "2025-09-17T19:00:00Z", "weight": 50}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let exam = res.json::<Value>().await?;
    assert_eq!(exam["id"], exam_id.as_str());
    assert_eq!(exam["weight"], 50);

    let fetched = server.authed(Method::GET, &path).send().await?.json::<Value>().await?;
    assert_eq!(fetched, exam);

    let res = server.authed(Method::PUT, &path).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn patch_updates_single_exam_field() -> Result<()> {
    let server = common::start_server().await?;
    let (class_id, exam_id) = class_with_exam(&server).await?;
    let path = format!("/api/v1/classes/{}/exams/{}", class_id, exam_id);

    let res = server
        .authed(Method::PATCH, &path)
        .json(&json!({"WEIGHT": "35", "id": "hijack", "unknown": true}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let exam = res.json::<Value>().await?;
    assert_eq!(exam["weight"], 35);
    assert_eq!(exam["name"], "P1");
    assert_eq!(exam["id"], exam_id.as_str());

    let res = server.authed(Method::PATCH, &path).json(&json!({})).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .authed(Method::PATCH, &format!("/api/v1/classes/{}/exams/missing", class_id))
        .json(&json!({"weight": 1}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn deleting_absent_exam_leaves_list_unchanged() -> Result<()> {
    let server = common::start_server().await?;
    let (class_id, exam_id) = class_with_exam(&server).await?;
    let exams_path = format!("/api/v1/classes/{}/exams", class_id);

    let res = server
        .authed(Method::DELETE, &format!("{}/missing", exams_path))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let exams = server.authed(Method::GET, &exams_path).send().await?.json::<Vec<Value>>().await?;
    assert_eq!(exams.len(), 1);

    let res = server
        .authed(Method::DELETE, &format!("{}/{}", exams_path, exam_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let exams = server.authed(Method::GET, &exams_path).send().await?.json::<Vec<Value>>().await?;
    assert!(exams.is_empty());
    Ok(())
}

#[tokio::test]
async fn exam_id_with_control_character_is_not_saved() -> Result<()> {
    let server = common::start_server().await?;
    let (class_id, _) = class_with_exam(&server).await?;
    let exams_path = format!("/api/v1/classes/{}/exams", class_id);

    let res = server
        .authed(Method::POST, &exams_path)
        .json(&json!({"id": "x\u{1}y", "name": "P2"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["code"], "BAD_REQUEST");

    let exams = server
        .authed(Method::GET, &exams_path)
        .send()
        .await?
        .json::<Vec<Value>>()
        .await?;
    assert_eq!(exams.len(), 1);
    assert_eq!(exams[0]["id"], "p1");
    Ok(())
}
