use super::{BotError, UpdateHandler};
use crate::telegram::Update;
use crate::text::ellipsis;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use prometheus::{Encoder, Registry, TextEncoder};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

const BODY_LOG_CHARS: usize = 100;

#[derive(Clone)]
struct WebhookState {
	handler: Arc<dyn UpdateHandler>,
	registry: Registry,
}

/// `POST /webhook/{name}` receives updates, `GET /metrics` exposes the registry.
pub fn router(name: &str, handler: Arc<dyn UpdateHandler>, registry: Registry) -> Router {
	Router::new()
		.route(&format!("/webhook/{name}"), post(receive_update))
		.route("/metrics", get(metrics))
		.layer(TraceLayer::new_for_http())
		.with_state(WebhookState { handler, registry })
}

async fn receive_update(State(state): State<WebhookState>, body: Bytes) -> Response {
	let request_id = Uuid::new_v4();

	let update: Update = match serde_json::from_slice(&body) {
		Ok(update) => update,
		Err(e) => {
			error!(%request_id, error = %e, body = %ellipsis(&String::from_utf8_lossy(&body), BODY_LOG_CHARS), "Error decoding update");
			return (StatusCode::BAD_REQUEST, format!("error decoding update: {e}")).into_response();
		}
	};

	info!(%request_id, update_id = update.update_id, "Start update handler");
	match state.handler.handle(update).await {
		Ok(()) => {
			info!(%request_id, "Finish update handler");
			StatusCode::OK.into_response()
		}
		Err(e) => {
			error!(%request_id, error = %e, "Error in update handler");
			(StatusCode::INTERNAL_SERVER_ERROR, format!("error in update handler: {e}")).into_response()
		}
	}
}

async fn metrics(State(state): State<WebhookState>) -> Response {
	let encoder = TextEncoder::new();
	let mut buffer = Vec::new();

	if let Err(e) = encoder.encode(&state.registry.gather(), &mut buffer) {
		error!(error = %e, "Failed to encode metrics");
		return StatusCode::INTERNAL_SERVER_ERROR.into_response();
	}

	([(header::CONTENT_TYPE, encoder.format_type().to_string())], buffer).into_response()
}

/// Serves `router` on `listen_addr` until cancelled.
pub async fn run_webhook(cancellation_token: CancellationToken, listen_addr: SocketAddr, router: Router) -> Result<(), BotError> {
	let listener = tokio::net::TcpListener::bind(listen_addr).await?;
	info!(%listen_addr, "Start server for webhooks");

	axum::serve(listener, router)
		.with_graceful_shutdown(async move {
			cancellation_token.cancelled().await;
			warn!("Webhook server shutting down");
		})
		.await?;

	info!("Webhook server stopped");
	Ok(())
}
