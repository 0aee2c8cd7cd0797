//! HTTP-level integration tests for milestone creation, update, closure,
//! and resubmission accounting.

mod common;

use axum::http::StatusCode;
use chrono::{Days, Duration, Utc};
use common::{
    body_json, build_test_app, build_test_app_with_store, create_milestone, get, milestone_draft,
    post_json, put_json, today_string,
};
use praxis_api::background::auto_close;
use serde_json::json;

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_returns_view_with_derived_fields() {
    let app = build_test_app();
    let mut draft = milestone_draft();
    draft["personaIds"] = json!([uuid::Uuid::new_v4(), uuid::Uuid::new_v4()]);
    draft["evaluation"] = json!({
        "rubric": [
            {"criterion": "Design", "weight": 50.0, "maxScore": 10, "description": "Design quality"},
            {"criterion": "Code", "weight": 50.0, "maxScore": 10, "description": "Code quality"}
        ]
    });

    let response = post_json(app, "/api/v1/milestones", draft).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let data = body_json(response).await["data"].clone();
    assert!(data["id"].as_str().is_some());
    assert_eq!(data["state"], "open");
    assert_eq!(data["completionPercentage"], 0);
    assert_eq!(data["isReadyToClose"], false);
    assert_eq!(data["isOverdue"], false);
    assert_eq!(data["version"], 1);
    assert_eq!(data["resubmissionCount"], 0);
    assert_eq!(data["checkpoints"], json!([]));
    assert_eq!(data["checkpointSummary"]["total"], 0);
    assert_eq!(data["personaSignOffs"].as_array().unwrap().len(), 2);
    assert!(data["personaSignOffs"]
        .as_array()
        .unwrap()
        .iter()
        .all(|s| s["status"] == "pending"));
}

#[tokio::test]
async fn create_collects_field_errors_into_400_map() {
    let app = build_test_app();
    let yesterday = chrono::Local::now()
        .date_naive()
        .checked_sub_days(Days::new(1))
        .unwrap();

    let draft = json!({
        "projectId": uuid::Uuid::new_v4(),
        "name": "   ",
        "description": "ok",
        "dueDate": yesterday.to_string(),
        "type": "deliverable",
        "requirements": [
            {"title": "", "description": "has one", "isRequired": true, "type": "file"}
        ],
        "evaluation": {
            "rubric": [
                {"criterion": "Design", "weight": 50.0, "maxScore": 10, "description": "d"},
                {"criterion": "Code", "weight": 40.0, "maxScore": 10, "description": "c"}
            ]
        }
    });

    let response = post_json(app, "/api/v1/milestones", draft).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    let errors = body["errors"].as_object().expect("errors map");
    assert!(errors.contains_key("name"));
    assert!(errors.contains_key("dueDate"));
    assert!(errors.contains_key("requirement_0_title"));
    assert_eq!(
        errors["rubricWeight"],
        "Rubric criteria weights must sum to 100%"
    );
}

#[tokio::test]
async fn due_today_is_accepted() {
    let app = build_test_app();
    let mut draft = milestone_draft();
    draft["dueDate"] = json!(today_string());

    let response = post_json(app, "/api/v1/milestones", draft).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_returns_created_milestone() {
    let app = build_test_app();
    let created = create_milestone(&app, milestone_draft()).await;
    let id = created["id"].as_str().unwrap();

    let response = get(app, &format!("/api/v1/milestones/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["id"], created["id"]);
    assert_eq!(data["name"], "Sprint demo");
}

#[tokio::test]
async fn get_unknown_id_is_404() {
    let app = build_test_app();
    let response = get(
        app,
        &format!("/api/v1/milestones/{}", uuid::Uuid::new_v4()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn list_returns_all_milestones() {
    let app = build_test_app();
    create_milestone(&app, milestone_draft()).await;
    create_milestone(&app, milestone_draft()).await;

    let response = get(app, "/api/v1/milestones").await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data.as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_merges_patch_and_bumps_version() {
    let app = build_test_app();
    let created = create_milestone(&app, milestone_draft()).await;
    let id = created["id"].as_str().unwrap();

    let response = put_json(
        app,
        &format!("/api/v1/milestones/{id}"),
        json!({"name": "Renamed demo"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["name"], "Renamed demo");
    // Untouched fields survive the merge.
    assert_eq!(data["description"], created["description"]);
    assert_eq!(data["version"], 2);
}

#[tokio::test]
async fn update_validates_merged_whole() {
    let app = build_test_app();
    let created = create_milestone(&app, milestone_draft()).await;
    let id = created["id"].as_str().unwrap();

    let response = put_json(
        app,
        &format!("/api/v1/milestones/{id}"),
        json!({
            "evaluation": {
                "rubric": [
                    {"criterion": "Design", "weight": 60.0, "maxScore": 10, "description": "d"}
                ]
            }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["errors"].as_object().unwrap().contains_key("rubricWeight"));
}

#[tokio::test]
async fn empty_patch_round_trips_except_bookkeeping() {
    let app = build_test_app();
    let created = create_milestone(&app, milestone_draft()).await;
    let id = created["id"].as_str().unwrap();

    let response = put_json(app, &format!("/api/v1/milestones/{id}"), json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let mut before = created.clone();
    let mut after = body_json(response).await["data"].clone();
    for doc in [&mut before, &mut after] {
        let obj = doc.as_object_mut().unwrap();
        obj.remove("updatedAt");
        obj.remove("version");
    }
    assert_eq!(before, after);
}

#[tokio::test]
async fn stale_version_is_rejected_with_conflict() {
    let app = build_test_app();
    let created = create_milestone(&app, milestone_draft()).await;
    let id = created["id"].as_str().unwrap();

    let response = put_json(
        app,
        &format!("/api/v1/milestones/{id}"),
        json!({"name": "Renamed", "version": 99}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["code"], "CONFLICT");
}

// ---------------------------------------------------------------------------
// Close
// ---------------------------------------------------------------------------

#[tokio::test]
async fn close_is_terminal() {
    let app = build_test_app();
    let created = create_milestone(&app, milestone_draft()).await;
    let id = created["id"].as_str().unwrap();

    let response = post_json(
        app.clone(),
        &format!("/api/v1/milestones/{id}/close"),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["state"], "closed");
    assert!(data["closedAt"].as_str().is_some());

    let again = post_json(app, &format!("/api/v1/milestones/{id}/close"), json!({})).await;
    assert_eq!(again.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Resubmission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resubmission_cap_is_enforced() {
    let app = build_test_app();
    let mut draft = milestone_draft();
    draft["settings"] = json!({
        "requireAllPersonaApprovals": true,
        "allowResubmission": true,
        "maxResubmissions": 3,
        "autoCloseAfterDays": 7
    });
    let created = create_milestone(&app, draft).await;
    let id = created["id"].as_str().unwrap();
    let path = format!("/api/v1/milestones/{id}/resubmissions");

    for expected in 1..=3 {
        let response = post_json(app.clone(), &path, json!({})).await;
        assert_eq!(response.status(), StatusCode::OK);
        let data = body_json(response).await["data"].clone();
        assert_eq!(data["resubmissionCount"], expected);
        assert_eq!(data["maxResubmissions"], 3);
    }

    let fourth = post_json(app, &path, json!({})).await;
    assert_eq!(fourth.status(), StatusCode::CONFLICT);
    let body = body_json(fourth).await;
    assert_eq!(body["code"], "LIMIT_EXCEEDED");
}

#[tokio::test]
async fn resubmission_disabled_is_rejected() {
    let app = build_test_app();
    let mut draft = milestone_draft();
    draft["settings"] = json!({
        "requireAllPersonaApprovals": true,
        "allowResubmission": false,
        "maxResubmissions": 3,
        "autoCloseAfterDays": 7
    });
    let created = create_milestone(&app, draft).await;
    let id = created["id"].as_str().unwrap();

    let response = post_json(
        app,
        &format!("/api/v1/milestones/{id}/resubmissions"),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["code"], "LIMIT_EXCEEDED");
}

// ---------------------------------------------------------------------------
// Auto-close sweep
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sweep_closes_milestones_past_their_window() {
    let (app, store) = build_test_app_with_store();
    let mut draft = milestone_draft();
    draft["settings"] = json!({
        "requireAllPersonaApprovals": true,
        "allowResubmission": true,
        "maxResubmissions": 3,
        "autoCloseAfterDays": 1
    });
    let created = create_milestone(&app, draft).await;
    let id = created["id"].as_str().unwrap();

    // Still inside the window right now.
    assert_eq!(auto_close::sweep(&store, Utc::now()).await, 0);

    // Three days past the due date is outside the one-day window.
    let later = Utc::now() + Duration::days(3);
    assert_eq!(auto_close::sweep(&store, later).await, 1);

    let response = get(app, &format!("/api/v1/milestones/{id}")).await;
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["state"], "closed");

    // A second sweep finds nothing left to close.
    assert_eq!(auto_close::sweep(&store, later).await, 0);
}
