use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::Value as JsonValue;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::api::APIResponse;
use crate::channel::{self, MethodResult};
use crate::error::IntakeError;
use crate::intake::ShareIntake;
use crate::model::ShareEvent;
use crate::store::SqlStore;
use crate::{bad_request, not_implemented, server_error, unpack_error};

#[derive(Clone)]
pub struct AppState {
    pub intake: Arc<ShareIntake<SqlStore>>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/", get(healthcheck))
        .route("/share", post(share))
        .route("/channel/:method", post(call_method))
        .layer(cors)
        .with_state(state)
}

pub async fn healthcheck() -> impl IntoResponse {
    info!("got healthcheck request");
    Json(APIResponse::new_from_msg("ok"))
}

pub async fn share(State(state): State<AppState>, Json(payload): Json<JsonValue>) -> Response {
    let kind = payload
        .get("kind")
        .and_then(JsonValue::as_str)
        .unwrap_or("<missing>")
        .to_string();

    let event: ShareEvent = match serde_json::from_value(payload) {
        Ok(event) => event,
        Err(e) => {
            let err = IntakeError::UnsupportedEvent(kind.clone());
            tracing::warn!(error = %err, cause = %e, "rejected share event");
            return not_implemented(APIResponse::new_from_msg(&format!("unsupported share event: {}", kind)));
        }
    };

    match state.intake.handle(event).await {
        Ok(report) => {
            info!(added = report.added, "share event stored");
            (StatusCode::OK, Json(APIResponse::from_report("ok", report))).into_response()
        }
        Err(e) => {
            tracing::error!("failed to store share event: {}", unpack_error(&e));
            server_error(APIResponse::new_from_msg("failed to store share event"))
        }
    }
}

pub async fn call_method(State(state): State<AppState>, Path(method): Path<String>) -> Response {
    if method.trim().is_empty() {
        return bad_request(APIResponse::new_from_msg("missing method"));
    }

    match channel::dispatch(state.intake.buffer(), &method).await {
        MethodResult::Success(body) => {
            (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        MethodResult::NotImplemented(name) => {
            not_implemented(APIResponse::new_from_msg(&format!("not implemented: {}", name)))
        }
    }
}
