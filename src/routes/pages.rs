//! Browser-facing pages: the public display, the login flow, and the admin panel.

use axum::{
    Form, Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header::SET_COOKIE},
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use tracing::debug;

use crate::{
    dto::auth::LoginForm,
    services::{auth_service, scoreboard_service},
    state::SharedState,
};

const INDEX_PAGE: &str = include_str!("../../assets/index.html");
const LOGIN_PAGE: &str = include_str!("../../assets/login.html");
const ADMIN_PAGE: &str = include_str!("../../assets/admin.html");

/// Configure the page subtree; `/admin` requires an admin session.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/admin", get(admin_page))
        .route_layer(middleware::from_fn_with_state(state, require_session))
        .route("/", get(index_page))
        .route("/login", get(login_page).post(submit_login))
        .route("/logout", get(logout))
}

/// Public display page with the current record embedded for the first paint.
pub async fn index_page(State(state): State<SharedState>) -> Html<String> {
    let record = scoreboard_service::live_state(&state).await;
    // Escape `<` so a hostile team name cannot close the script tag.
    let payload = serde_json::to_string(&record)
        .unwrap_or_else(|_| "null".to_owned())
        .replace('<', "\\u003c");
    Html(INDEX_PAGE.replace("__INITIAL_STATE__", &payload))
}

/// Login form; an existing session skips straight to the admin panel.
pub async fn login_page(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if auth_service::authenticated(&state, &headers) {
        Redirect::to("/admin").into_response()
    } else {
        Html(LOGIN_PAGE).into_response()
    }
}

/// Validate submitted credentials and open an admin session.
pub async fn submit_login(
    State(state): State<SharedState>,
    Form(form): Form<LoginForm>,
) -> Response {
    match auth_service::login(&state, &form.username, &form.password).await {
        Ok(token) => {
            let cookie = auth_service::session_cookie(&token);
            ([(SET_COOKIE, cookie)], Redirect::to("/admin")).into_response()
        }
        Err(err) => {
            debug!(error = %err, "login rejected");
            Redirect::to("/login?error=1").into_response()
        }
    }
}

/// Drop the caller's session and bounce back to the login form.
pub async fn logout(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    auth_service::logout(&state, &headers);
    (
        [(SET_COOKIE, auth_service::expired_session_cookie())],
        Redirect::to("/login"),
    )
        .into_response()
}

/// Admin panel shell; record and logo options are fetched by the page itself.
pub async fn admin_page() -> Html<&'static str> {
    Html(ADMIN_PAGE)
}

/// Redirect browsers without a live session to the login form.
async fn require_session(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if auth_service::authenticated(&state, req.headers()) {
        next.run(req).await
    } else {
        Redirect::to("/login?notice=1").into_response()
    }
}
