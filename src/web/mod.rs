//! Local HTTP bridge for a browser front end: renders state, forwards intents.

use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::{net::TcpListener, sync::Mutex};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use tracing::info;

use crate::{
    actions::{Action, ActionError, ActionReceipt},
    config::SimulationConfig,
    session::Session,
    snapshot::FarmSnapshot,
};

type SharedSession = Arc<Mutex<Session>>;

pub struct WebServerConfig {
    pub simulation: SimulationConfig,
    pub host: String,
    pub port: u16,
}

pub fn router(session: SharedSession) -> Router {
    Router::new()
        .route("/api/state", get(latest_state))
        .route("/api/session/start", post(start_session))
        .route("/api/session/stop", post(stop_session))
        .route("/api/actions", post(dispatch_action))
        .route("/api/events", get(stream_events))
        .with_state(session)
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig {
        simulation,
        host,
        port,
    } = config;

    let session = Session::from_config(&simulation)?;
    let session: SharedSession = Arc::new(Mutex::new(session));

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid listen address {host}:{port}"))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, farm = %simulation.name, "farm UI bridge listening");

    axum::serve(listener, router(session.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    session.lock().await.stop().await;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down farm UI bridge");
}

async fn latest_state(State(session): State<SharedSession>) -> Json<FarmSnapshot> {
    Json(session.lock().await.snapshot())
}

async fn start_session(State(session): State<SharedSession>) -> Json<FarmSnapshot> {
    let mut session = session.lock().await;
    session.start();
    Json(session.snapshot())
}

async fn stop_session(State(session): State<SharedSession>) -> Json<FarmSnapshot> {
    let mut session = session.lock().await;
    session.stop().await;
    Json(session.snapshot())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActionResponse {
    receipt: ActionReceipt,
    state: FarmSnapshot,
}

#[derive(Serialize)]
struct ErrorBody {
    kind: &'static str,
    error: String,
}

struct ApiError(ActionError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self.0 {
            ActionError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation"),
            ActionError::InvariantViolation(_) => (StatusCode::BAD_REQUEST, "invariant_violation"),
        };
        let body = ErrorBody {
            kind,
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

async fn dispatch_action(
    State(session): State<SharedSession>,
    Json(action): Json<Action>,
) -> Result<Json<ActionResponse>, ApiError> {
    let session = session.lock().await;
    let receipt = session.dispatch(action).map_err(ApiError)?;
    Ok(Json(ActionResponse {
        receipt,
        state: session.snapshot(),
    }))
}

async fn stream_events(
    State(session): State<SharedSession>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = session.lock().await.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|frame| {
        let frame = frame.ok()?;
        let payload = serde_json::to_string(&frame).ok()?;
        Some(Ok(Event::default().data(payload)))
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(2))
            .text("keep-alive"),
    )
}
