//! Route trees composing the HTTP surface.

use axum::Router;

use crate::state::SharedState;

/// JSON API for the display page and the admin panel.
pub mod api;
/// Swagger documentation routes.
pub mod docs;
/// Health check route.
pub mod health;
/// Browser-facing pages and the login flow.
pub mod pages;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let app_router = health::router()
        .merge(api::router(state.clone()))
        .merge(pages::router(state.clone()));

    let docs_router = docs::router(state.clone());

    app_router.merge(docs_router).with_state(state)
}
