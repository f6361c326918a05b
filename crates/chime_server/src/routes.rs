//! HTTP routes: the embedded page plus the JSON alarm API.
//!
//! # Responsibility
//! - Translate request payloads into the core's submit/list operations.
//! - Map the submit error taxonomy onto HTTP status codes.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use chime_core::{AlarmListEntry, AlarmService, Recurrence, SqliteAlarmRepository, SubmitError};

/// Shared handler state.
pub struct AppState {
    pub service: AlarmService<SqliteAlarmRepository>,
}

/// Request body for `POST /add_alarm`.
#[derive(Debug, Deserialize)]
pub struct AddAlarmRequest {
    pub description: String,
    /// `YYYY-MM-DD HH:MM`, local time.
    pub due_at: String,
    #[serde(default = "default_recurrence")]
    pub recurrence: Recurrence,
}

fn default_recurrence() -> Recurrence {
    Recurrence::None
}

/// Builds the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/add_alarm", post(add_alarm))
        .route("/get_alarms", get(get_alarms))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(include_str!("../assets/index.html"))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "chime-server",
        "version": chime_core::core_version(),
    }))
}

async fn add_alarm(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddAlarmRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    match state
        .service
        .submit(&request.description, &request.due_at, request.recurrence)
    {
        Ok(id) => (StatusCode::CREATED, Json(serde_json::json!({ "id": id }))),
        Err(err @ SubmitError::InvalidDueAt(_)) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": err.to_string() })),
        ),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": err.to_string() })),
        ),
    }
}

async fn get_alarms(State(state): State<Arc<AppState>>) -> Json<Vec<AlarmListEntry>> {
    Json(state.service.list())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chime_core::db::open_db_in_memory;
    use chime_core::AlarmQueue;

    fn test_state() -> State<Arc<AppState>> {
        let repo = SqliteAlarmRepository::try_new(open_db_in_memory().unwrap()).unwrap();
        let queue = Arc::new(AlarmQueue::new());
        State(Arc::new(AppState {
            service: AlarmService::new(repo, queue),
        }))
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let json = health().await.0;
        assert_eq!(json["status"], "ok");
        assert!(json["version"].is_string());
    }

    #[tokio::test]
    async fn add_then_get_roundtrip() {
        let state = test_state();

        let (status, body) = add_alarm(
            State(Arc::clone(&state.0)),
            Json(AddAlarmRequest {
                description: "Meeting".to_string(),
                due_at: "2099-01-01 09:00".to_string(),
                recurrence: Recurrence::None,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body.0["id"].is_i64());

        let alarms = get_alarms(state).await.0;
        assert_eq!(alarms.len(), 1);
        assert_eq!(alarms[0].description, "Meeting");
        assert_eq!(alarms[0].due_at, "2099-01-01 09:00");
    }

    #[tokio::test]
    async fn recurring_alarm_is_annotated_in_listing() {
        let state = test_state();

        let (status, _) = add_alarm(
            State(Arc::clone(&state.0)),
            Json(AddAlarmRequest {
                description: "Standup".to_string(),
                due_at: "2099-01-01 09:30".to_string(),
                recurrence: Recurrence::Daily,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let alarms = get_alarms(state).await.0;
        assert_eq!(alarms[0].description, "Standup (Daily)");
    }

    #[tokio::test]
    async fn malformed_due_time_is_a_bad_request() {
        let state = test_state();

        let (status, body) = add_alarm(
            state,
            Json(AddAlarmRequest {
                description: "broken".to_string(),
                due_at: "soon".to_string(),
                recurrence: Recurrence::None,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.0["error"].as_str().unwrap().contains("soon"));
    }
}
