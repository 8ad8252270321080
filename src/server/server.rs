use anyhow::{Context, Result};
use tracing::info;

use crate::app_state::AppState;
use crate::render::{self, ViewContext};
use crate::video::feed::newest_first;
use tower_http::services::ServeDir;

use axum::{
    extract::{DefaultBodyLimit, Query, State},
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use serde::Deserialize;

use super::account_routes::make_account_routes;
use super::video_routes::make_video_routes;
use super::{log_requests, state::*, ServerConfig};

/// Banner text carried over a redirect.
#[derive(Deserialize, Debug, Default)]
pub struct NoticeQuery {
    pub notice: Option<String>,
}

pub fn notice_location(path: &str, notice: &str) -> String {
    format!("{}?notice={}", path, urlencoding::encode(notice))
}

pub fn notice_redirect(path: &str, notice: &str) -> Response {
    Redirect::to(&notice_location(path, notice)).into_response()
}

/// Renders a page for whoever is logged in right now.
pub fn render_page<F>(app: &GuardedAppState, notice: Option<&str>, render: F) -> Html<String>
where
    F: FnOnce(&ViewContext) -> String,
{
    let state = app.lock().unwrap();
    let ctx = ViewContext {
        current_user: state.current_user(),
        notice,
    };
    Html(render(&ctx))
}

pub fn not_found(state: &AppState, what: &str) -> Response {
    let ctx = ViewContext {
        current_user: state.current_user(),
        notice: None,
    };
    (StatusCode::NOT_FOUND, Html(render::not_found_page(&ctx, what))).into_response()
}

async fn home(
    State(app): State<GuardedAppState>,
    Query(query): Query<NoticeQuery>,
) -> Html<String> {
    let state = app.lock().unwrap();
    let feed = newest_first(state.all_videos());
    let ctx = ViewContext {
        current_user: state.current_user(),
        notice: query.notice.as_deref(),
    };
    Html(render::home_page(&ctx, &feed))
}

pub fn make_app(config: ServerConfig, app_state: GuardedAppState) -> Router {
    let state = ServerState::new(config.clone(), app_state);

    let home_router: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone());

    let mut app: Router = home_router
        .merge(make_account_routes(state.clone()))
        .merge(make_video_routes(state.clone()));

    if let Some(assets_dir) = &config.assets_dir {
        app = app.nest_service("/assets", ServeDir::new(assets_dir));
    }

    app.layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(middleware::from_fn_with_state(state, log_requests))
}

pub async fn run_server(config: ServerConfig, app_state: GuardedAppState) -> Result<()> {
    let port = config.port;
    let app = make_app(config, app_state);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .with_context(|| format!("Could not bind port {}", port))?;
    info!("Listening on http://127.0.0.1:{}", port);

    Ok(axum::serve(listener, app).await?)
}
