//! HTTP + WebSocket API for Repify
//!
//! Endpoints:
//! - GET /health - Health check
//! - GET /exercises - Exercise table
//! - POST /session/new - Start a tracking session
//! - GET /session/:id - Session status
//! - DELETE /session/:id - Drop a session
//! - POST /session/:id/start - Start (or restart) tracking
//! - POST /session/:id/frame - Feed one landmark set
//! - POST /session/:id/stop - Stop tracking
//! - POST /session/:id/reset - Reset count
//! - WS /ws/:id - Live frame and rep updates

use axum::{
    extract::{Path, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::core::{ExerciseTable, RepEngine};
use crate::error::ConfigurationError;
use crate::types::{FrameOutput, LandmarkSet, RepCompleted, SessionSummary, Side};
use crate::DEFAULT_EXERCISE;

/// Capacity of each session's update channel
const UPDATE_CHANNEL_CAPACITY: usize = 256;

/// One tracking session
#[derive(Debug)]
pub struct Session {
    pub id: String,
    pub engine: RepEngine,
    pub update_tx: broadcast::Sender<SessionUpdate>,
}

/// Live update message
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionUpdate {
    Frame(FrameOutput),
    Rep(RepCompleted),
}

/// App state
pub struct AppState {
    pub sessions: RwLock<HashMap<String, Session>>,
    pub table: Arc<ExerciseTable>,
    next_id: AtomicU64,
}

impl AppState {
    pub fn new(table: Arc<ExerciseTable>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            table,
            next_id: AtomicU64::new(1),
        }
    }

    /// Receiver for a session's live updates
    pub async fn subscribe(&self, id: &str) -> Result<broadcast::Receiver<SessionUpdate>, ApiError> {
        let sessions = self.sessions.read().await;
        let session = sessions
            .get(id)
            .ok_or_else(|| ApiError::SessionNotFound(id.to_string()))?;
        Ok(session.update_tx.subscribe())
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// API error, rendered as `{error, message}` JSON
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::SessionNotFound(_) => StatusCode::NOT_FOUND,
            Self::Configuration(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::SessionNotFound(_) => "SESSION_NOT_FOUND",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.code(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

// =============================================================================
// REQUESTS / RESPONSES
// =============================================================================

/// Create new session request
#[derive(Debug, Deserialize)]
pub struct NewSessionRequest {
    pub exercise: Option<String>,
    pub side: Option<Side>,
}

/// Start / restart request; omitted fields keep the session's current choice
#[derive(Debug, Default, Deserialize)]
pub struct StartSessionRequest {
    pub exercise: Option<String>,
    pub side: Option<Side>,
}

/// Create new session response
#[derive(Debug, Serialize)]
pub struct NewSessionResponse {
    pub session_id: String,
    pub websocket_url: String,
}

/// Final report of a deleted session
#[derive(Debug, Serialize)]
pub struct SessionSummaryResponse {
    pub session_id: String,
    pub summary: Option<SessionSummary>,
}

/// Session status response
#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub tracking: bool,
    pub current: FrameOutput,
    pub summary: Option<SessionSummary>,
}

/// One row of the exercise listing
#[derive(Debug, Serialize)]
pub struct ExerciseInfo {
    pub id: String,
    pub name: String,
    pub joint: String,
    pub extended_threshold: f64,
    pub contracted_threshold: f64,
    pub instructions: String,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions_active: usize,
}

// =============================================================================
// ROUTER
// =============================================================================

/// Create the API router
pub fn create_router(table: Arc<ExerciseTable>) -> Router {
    router_with_state(Arc::new(AppState::new(table)))
}

/// Router over caller-owned state
pub fn router_with_state(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/exercises", get(list_exercises))
        .route("/session/new", post(create_session))
        .route("/session/:id", get(get_session).delete(delete_session))
        .route("/session/:id/start", post(start_session))
        .route("/session/:id/frame", post(add_frame))
        .route("/session/:id/stop", post(stop_session))
        .route("/session/:id/reset", post(reset_session))
        .route("/ws/:id", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let sessions = state.sessions.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        sessions_active: sessions.len(),
    })
}

/// List the exercise table
async fn list_exercises(State(state): State<Arc<AppState>>) -> Json<Vec<ExerciseInfo>> {
    let exercises = state
        .table
        .iter()
        .map(|(id, def)| ExerciseInfo {
            id: id.to_string(),
            name: def.name.clone(),
            joint: def.primary.joint_name().trim_start_matches("left_").to_string(),
            extended_threshold: def.extended_threshold,
            contracted_threshold: def.contracted_threshold,
            instructions: def.instructions.clone(),
        })
        .collect();
    Json(exercises)
}

/// Create a session and start tracking
async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewSessionRequest>,
) -> Result<Json<NewSessionResponse>, ApiError> {
    let exercise = req.exercise.unwrap_or_else(|| DEFAULT_EXERCISE.to_string());
    let side = req.side.unwrap_or_default();

    let mut engine = RepEngine::with_table(Arc::clone(&state.table));
    engine.start(&exercise, side)?;

    let (tx, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
    let rep_tx = tx.clone();
    engine.on_rep(move |event| {
        let _ = rep_tx.send(SessionUpdate::Rep(event.clone()));
    });

    let session_id = generate_session_id(&state.next_id);
    info!(session = %session_id, %exercise, %side, "session created");

    let session = Session {
        id: session_id.clone(),
        engine,
        update_tx: tx,
    };
    state.sessions.write().await.insert(session_id.clone(), session);

    Ok(Json(NewSessionResponse {
        websocket_url: format!("/ws/{}", session_id),
        session_id,
    }))
}

/// Get session status
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatusResponse>, ApiError> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or_else(|| ApiError::SessionNotFound(id.clone()))?;

    Ok(Json(SessionStatusResponse {
        session_id: session.id.clone(),
        tracking: session.engine.is_tracking(),
        current: session.engine.snapshot(),
        summary: session.engine.summary(),
    }))
}

/// Drop a session; its update channel closes with it
async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionSummaryResponse>, ApiError> {
    let session = state
        .sessions
        .write()
        .await
        .remove(&id)
        .ok_or_else(|| ApiError::SessionNotFound(id.clone()))?;

    info!(session = %id, reps = session.engine.rep_count(), "session deleted");
    Ok(Json(SessionSummaryResponse {
        session_id: id,
        summary: session.engine.summary(),
    }))
}

/// Start tracking again, optionally switching exercise or side
async fn start_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    req: Option<Json<StartSessionRequest>>,
) -> Result<Json<FrameOutput>, ApiError> {
    let req = req.map(|Json(r)| r).unwrap_or_default();
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or_else(|| ApiError::SessionNotFound(id.clone()))?;

    let exercise = req
        .exercise
        .or_else(|| session.engine.exercise_id().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_EXERCISE.to_string());
    let side = req.side.or_else(|| session.engine.side()).unwrap_or_default();

    session.engine.start(&exercise, side)?;
    Ok(Json(session.engine.snapshot()))
}

/// Feed one frame to the session's engine
async fn add_frame(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(landmarks): Json<LandmarkSet>,
) -> Result<Json<FrameOutput>, ApiError> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or_else(|| ApiError::SessionNotFound(id.clone()))?;

    let output = session.engine.process_frame(&landmarks);
    let _ = session.update_tx.send(SessionUpdate::Frame(output.clone()));

    Ok(Json(output))
}

/// Stop tracking; count stays readable
async fn stop_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FrameOutput>, ApiError> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or_else(|| ApiError::SessionNotFound(id.clone()))?;

    session.engine.stop();
    Ok(Json(session.engine.snapshot()))
}

/// Stop tracking and zero the count
async fn reset_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FrameOutput>, ApiError> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or_else(|| ApiError::SessionNotFound(id.clone()))?;

    session.engine.reset();
    Ok(Json(session.engine.snapshot()))
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, ApiError> {
    let rx = state.subscribe(&id).await?;

    Ok(ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, rx, id).await;
    }))
}

/// Forward updates until the client goes away
async fn handle_websocket(
    socket: WebSocket,
    mut rx: broadcast::Receiver<SessionUpdate>,
    session_id: String,
) {
    let (mut sender, mut receiver) = socket.split();
    debug!(session = %session_id, "websocket connected");

    loop {
        tokio::select! {
            update = rx.recv() => match update {
                Ok(update) => {
                    let json = serde_json::to_string(&update).unwrap_or_default();
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(session = %session_id, skipped, "websocket client lagging");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    debug!(session = %session_id, "websocket closed");
}

/// Generate session ID
fn generate_session_id(counter: &AtomicU64) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    let seq = counter.fetch_add(1, Ordering::Relaxed);
    format!("session_{:x}_{}", nanos, seq)
}

/// Address line plus route table, printed at startup
fn startup_banner(addr: &str) -> String {
    let routes = [
        ("GET", "/health", "Health check"),
        ("GET", "/exercises", "Exercise table"),
        ("POST", "/session/new", "Create session"),
        ("GET", "/session/:id", "Get status"),
        ("DELETE", "/session/:id", "Delete session"),
        ("POST", "/session/:id/start", "Start tracking"),
        ("POST", "/session/:id/frame", "Add frame"),
        ("POST", "/session/:id/stop", "Stop tracking"),
        ("POST", "/session/:id/reset", "Reset count"),
        ("WS", "/ws/:id", "Live updates"),
    ];
    let mut banner = format!("Repify API running on {}\n", addr);
    for (method, path, what) in routes {
        banner.push_str(&format!("  {:<6} {:<19} - {}\n", method, path, what));
    }
    banner
}

/// Run the API server
pub async fn run_server(addr: &str, table: Arc<ExerciseTable>) -> Result<(), Box<dyn std::error::Error>> {
    let router = create_router(table);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Repify API listening");
    print!("{}", startup_banner(addr));
    axum::serve(listener, router).await?;
    Ok(())
}
