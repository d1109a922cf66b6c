//! JSON endpoints polled by the display page and driven by the admin panel.

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};

use crate::{
    config::LogoOption,
    dto::scoreboard::UpdateResponse,
    error::AppError,
    services::{auth_service, scoreboard_service},
    state::{
        SharedState,
        scoreboard::{MatchState, StatePatch},
    },
};

/// Configure the `/api` subtree; the update route requires an admin session.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/api/update", post(update_data))
        .route_layer(middleware::from_fn_with_state(state, require_session))
        .route("/api/data", get(get_data))
        .route("/api/logos", get(get_logos))
}

#[utoipa::path(
    get,
    path = "/api/data",
    tag = "scoreboard",
    responses((status = 200, description = "Current match record", body = MatchState))
)]
/// Return the live record for the polling display page.
pub async fn get_data(State(state): State<SharedState>) -> Json<MatchState> {
    Json(scoreboard_service::live_state(&state).await)
}

#[utoipa::path(
    get,
    path = "/api/logos",
    tag = "scoreboard",
    responses((status = 200, description = "Selectable team logos", body = [LogoOption]))
)]
/// Return the static logo catalogue offered by the admin panel.
pub async fn get_logos(State(state): State<SharedState>) -> Json<Vec<LogoOption>> {
    Json(state.config().logos.clone())
}

#[utoipa::path(
    post,
    path = "/api/update",
    tag = "scoreboard",
    request_body = StatePatch,
    responses(
        (status = 200, description = "Record after the merge", body = UpdateResponse),
        (status = 401, description = "No live admin session"),
        (status = 503, description = "Storage backend unavailable"),
    )
)]
/// Merge the submitted fields into the stored record and return the result.
pub async fn update_data(
    State(state): State<SharedState>,
    Json(patch): Json<StatePatch>,
) -> Result<Json<UpdateResponse>, AppError> {
    let updated = scoreboard_service::apply_update(&state, patch).await?;
    Ok(Json(UpdateResponse::success(updated)))
}

/// Reject API calls that do not carry a live admin session cookie.
async fn require_session(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if auth_service::authenticated(&state, req.headers()) {
        Ok(next.run(req).await)
    } else {
        Err(AppError::Unauthorized(
            "please log in to update the scoreboard".into(),
        ))
    }
}
