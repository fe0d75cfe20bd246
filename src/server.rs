use axum::extract::rejection::JsonRejection;
use axum::http::{Method, StatusCode};
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::errors::EngineError;
use crate::session::EngineSession;
use crate::wire::{GameStateRequest, PlayResponse};

/// Sessions are driven from blocking tasks, so they sit behind a std mutex.
pub type SharedSession = Arc<StdMutex<EngineSession>>;

#[derive(Clone)]
pub struct AppState {
    config: EngineConfig,
    default_session: SharedSession,
    sessions: Arc<Mutex<HashMap<String, SharedSession>>>,
}

impl AppState {
    pub fn new(config: EngineConfig) -> Self {
        AppState {
            default_session: Arc::new(StdMutex::new(EngineSession::with_config(config.clone()))),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            config,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    status: String,
    code: u16,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SessionCreated {
    pub id: String,
}

/// Everything a handler can fail with.
#[derive(Debug)]
pub enum ApiError {
    Engine(EngineError),
    BadJson(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Engine(EngineError::NotYourTurn { .. }) => StatusCode::CONFLICT,
            ApiError::Engine(EngineError::SessionNotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Engine(e) if e.is_malformed_input() => StatusCode::BAD_REQUEST,
            ApiError::BadJson(_) => StatusCode::BAD_REQUEST,
            ApiError::Engine(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        ApiError::Engine(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadJson(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match &self {
            ApiError::Engine(e) => e.to_string(),
            ApiError::BadJson(details) | ApiError::Internal(details) => details.clone(),
        };
        log::warn!("Request failed ({}): {}", status, error);
        let body = ErrorBody {
            error,
            status: status.canonical_reason().unwrap_or("Unknown").to_string(),
            code: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn decide_with(session: SharedSession, request: GameStateRequest) -> Result<Json<PlayResponse>, ApiError> {
    let snapshot = request.to_snapshot()?;
    let mv = tokio::task::spawn_blocking(move || {
        let mut session = session.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        session.decide(&snapshot)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    log::info!("{}", mv);
    Ok(Json(PlayResponse::from(mv)))
}

async fn play_default(
    State(state): State<AppState>,
    payload: Result<Json<GameStateRequest>, JsonRejection>,
) -> Result<Json<PlayResponse>, ApiError> {
    let Json(request) = payload?;
    decide_with(state.default_session.clone(), request).await
}

async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionCreated>) {
    let id = Uuid::new_v4().to_string();
    let session = Arc::new(StdMutex::new(EngineSession::with_config(state.config.clone())));
    state.sessions.lock().await.insert(id.clone(), session);
    log::info!("Created session {}", id);
    (StatusCode::CREATED, Json(SessionCreated { id }))
}

async fn play_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<GameStateRequest>, JsonRejection>,
) -> Result<Json<PlayResponse>, ApiError> {
    let Json(request) = payload?;
    let session = state
        .sessions
        .lock()
        .await
        .get(&id)
        .cloned()
        .ok_or(EngineError::SessionNotFound { id })?;
    decide_with(session, request).await
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    match state.sessions.lock().await.remove(&id) {
        Some(_) => {
            log::info!("Deleted session {}", id);
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(EngineError::SessionNotFound { id }.into()),
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/", post(play_default))
        .route("/health", get(health))
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", axum::routing::delete(delete_session))
        .route("/sessions/{id}/play", post(play_session))
        .with_state(state)
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::Seat;
    use crate::wire::PlayRequest;

    fn opening_request(seat: u8) -> GameStateRequest {
        GameStateRequest {
            seat,
            hand: ["0-0", "0-3", "1-2", "1-3", "1-6", "3-6", "5-5"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            table: Vec::new(),
            plays: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_default_session_plays_opening() {
        let state = AppState::new(EngineConfig::default());
        let Json(response) = play_default(State(state), Ok(Json(opening_request(1))))
            .await
            .unwrap();
        assert_eq!(response.tile.as_deref(), Some("5-5"));
        assert_eq!(response.edge.as_deref(), Some("esquerda"));
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let state = AppState::new(EngineConfig::default());
        let (status, Json(created)) = create_session(State(state.clone())).await;
        assert_eq!(status, StatusCode::CREATED);

        let result = play_session(State(state.clone()), Path(created.id.clone()), Ok(Json(opening_request(2)))).await;
        assert_eq!(result.unwrap().0.seat, 2);

        let deleted = delete_session(State(state.clone()), Path(created.id.clone())).await.unwrap();
        assert_eq!(deleted, StatusCode::NO_CONTENT);

        let missing = play_session(State(state), Path(created.id), Ok(Json(opening_request(2)))).await;
        assert_eq!(missing.unwrap_err().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_request_is_bad_request() {
        let state = AppState::new(EngineConfig::default());
        let mut request = opening_request(1);
        request.plays.push(PlayRequest {
            seat: 1,
            tile: "9-9".to_string(),
            edge: "esquerda".to_string(),
        });
        let err = play_default(State(state), Ok(Json(request))).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_turn_violation_is_conflict() {
        let seat = |n| Seat::new(n).unwrap();
        let err = ApiError::from(EngineError::not_your_turn(seat(1), seat(2)));
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }
}
