//! Health goals.
//!
//! - `GET|POST|DELETE /api/patients/:patient_id/goals`
//! - `PATCH|DELETE /api/patients/:patient_id/goals/:goal_id`
//!
//! The same operations back the consent-gated doctor routes in `doctors.rs`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ensure_patient, required, ApiContext, DeletedResponse};
use crate::db::repository::{
    delete_all_goals, delete_goal, get_goal, insert_goal, list_goals, set_goal_done,
};
use crate::models::HealthGoal;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddGoalRequest {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetDoneRequest {
    pub done: bool,
}

#[derive(Serialize)]
pub struct GoalsResponse {
    pub goals: Vec<HealthGoal>,
}

// ── Shared operations ──────────────────────────────────────

pub(crate) fn add_goal(
    conn: &Connection,
    patient_id: &str,
    name: &str,
) -> Result<HealthGoal, ApiError> {
    ensure_patient(conn, patient_id)?;
    let goal = HealthGoal {
        id: uuid::Uuid::new_v4().to_string(),
        patient_id: patient_id.to_string(),
        name: name.to_string(),
        done: false,
        created_at: Utc::now(),
    };
    insert_goal(conn, &goal)?;
    Ok(goal)
}

pub(crate) fn toggle_goal(
    conn: &Connection,
    patient_id: &str,
    goal_id: &str,
    done: bool,
) -> Result<HealthGoal, ApiError> {
    set_goal_done(conn, patient_id, goal_id, done)?;
    get_goal(conn, patient_id, goal_id)?.ok_or_else(|| ApiError::NotFound("HealthGoal not found".into()))
}

// ── Handlers ───────────────────────────────────────────────

pub async fn list(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
) -> Result<Json<GoalsResponse>, ApiError> {
    let goals = ctx.with_db(move |conn| Ok(list_goals(conn, &patient_id)?)).await?;
    Ok(Json(GoalsResponse { goals }))
}

pub async fn add(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
    body: Result<Json<AddGoalRequest>, JsonRejection>,
) -> Result<Json<HealthGoal>, ApiError> {
    let Json(req) = body?;
    let name = required(req.name.as_deref(), "Goal name is required")?.to_string();
    let goal = ctx.with_db(move |conn| add_goal(conn, &patient_id, &name)).await?;
    Ok(Json(goal))
}

pub async fn set_done(
    State(ctx): State<ApiContext>,
    Path((patient_id, goal_id)): Path<(String, String)>,
    body: Result<Json<SetDoneRequest>, JsonRejection>,
) -> Result<Json<HealthGoal>, ApiError> {
    let Json(req) = body?;
    let goal = ctx
        .with_db(move |conn| toggle_goal(conn, &patient_id, &goal_id, req.done))
        .await?;
    Ok(Json(goal))
}

pub async fn remove(
    State(ctx): State<ApiContext>,
    Path((patient_id, goal_id)): Path<(String, String)>,
) -> Result<Json<DeletedResponse>, ApiError> {
    ctx.with_db(move |conn| Ok(delete_goal(conn, &patient_id, &goal_id)?))
        .await?;
    Ok(Json(DeletedResponse { deleted: 1 }))
}

pub async fn remove_all(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let deleted = ctx
        .with_db(move |conn| Ok(delete_all_goals(conn, &patient_id)?))
        .await?;
    tracing::info!(deleted, "cleared health goals");
    Ok(Json(DeletedResponse { deleted }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::json;

    use crate::advisory::MockLlmClient;
    use crate::api::router::test_support::{send, test_app};
    use crate::db::repository::fixtures::seed_patient;

    #[tokio::test]
    async fn goal_lifecycle() {
        let (app, core, _dir) = test_app(Arc::new(MockLlmClient::new("")));
        seed_patient(&core.open_db().unwrap(), "p1");

        let (status, walk) =
            send(&app, "POST", "/api/patients/p1/goals", Some(json!({"name": "Walk 30 min"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(walk["done"], false);
        send(&app, "POST", "/api/patients/p1/goals", Some(json!({"name": "Less salt"}))).await;

        let uri = format!("/api/patients/p1/goals/{}", walk["id"].as_str().unwrap());
        let (status, toggled) = send(&app, "PATCH", &uri, Some(json!({"done": true}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(toggled["done"], true);

        let (_, listed) = send(&app, "GET", "/api/patients/p1/goals", None).await;
        let goals = listed["goals"].as_array().unwrap();
        assert_eq!(goals.len(), 2);
        assert_eq!(goals[0]["name"], "Walk 30 min");

        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, cleared) = send(&app, "DELETE", "/api/patients/p1/goals", None).await;
        assert_eq!(cleared["deleted"], 1);
    }

    #[tokio::test]
    async fn goal_name_required_and_patient_must_exist() {
        let (app, core, _dir) = test_app(Arc::new(MockLlmClient::new("")));
        seed_patient(&core.open_db().unwrap(), "p1");

        let (status, json) = send(&app, "POST", "/api/patients/p1/goals", Some(json!({"name": ""}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Goal name is required");

        let (status, _) =
            send(&app, "POST", "/api/patients/ghost/goals", Some(json!({"name": "x"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) =
            send(&app, "PATCH", "/api/patients/p1/goals/nope", Some(json!({"done": true}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
