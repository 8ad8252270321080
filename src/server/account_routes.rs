use super::server::{notice_redirect, render_page, NoticeQuery};
use super::session::Session;
use super::state::{GuardedAppState, ServerState};
use crate::error::ServiceError;
use crate::render::{self, ViewContext};
use crate::user::{Permission, UserRole};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct CredentialsForm {
    username: String,
    password: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct RoleForm {
    username: String,
    role: String,
}

async fn register_form(
    State(app): State<GuardedAppState>,
    Query(query): Query<NoticeQuery>,
) -> Html<String> {
    render_page(&app, query.notice.as_deref(), |ctx| {
        render::register_page(ctx, None)
    })
}

async fn register(
    State(app): State<GuardedAppState>,
    Form(form): Form<CredentialsForm>,
) -> Response {
    let mut state = app.lock().unwrap();
    let result = state
        .identity()
        .register(form.username.trim(), form.password.trim());
    match result {
        Ok(user) => {
            debug!("Registered {}", user.username);
            notice_redirect("/login", "Registration successful! You can now log in.")
        }
        Err(err) => {
            warn!("Registration of {} failed: {}", form.username, err);
            let ctx = ViewContext {
                current_user: state.current_user(),
                notice: None,
            };
            let page = render::register_page(&ctx, Some(&err.to_string()));
            (err.status_code(), Html(page)).into_response()
        }
    }
}

async fn login_form(
    State(app): State<GuardedAppState>,
    Query(query): Query<NoticeQuery>,
) -> Html<String> {
    render_page(&app, query.notice.as_deref(), |ctx| {
        render::login_page(ctx, None)
    })
}

async fn login(State(app): State<GuardedAppState>, Form(form): Form<CredentialsForm>) -> Response {
    let mut state = app.lock().unwrap();
    let result = state
        .identity()
        .login(form.username.trim(), form.password.trim());
    match result {
        Ok(_) => Redirect::to("/").into_response(),
        Err(err) => {
            warn!("Login of {} failed: {}", form.username, err);
            let ctx = ViewContext {
                current_user: state.current_user(),
                notice: None,
            };
            let page = render::login_page(&ctx, Some(&err.to_string()));
            (err.status_code(), Html(page)).into_response()
        }
    }
}

async fn logout(State(app): State<GuardedAppState>) -> Response {
    let result = app.lock().unwrap().identity().logout();
    match result {
        Ok(()) => Redirect::to("/").into_response(),
        Err(err) => err.into_response(),
    }
}

async fn set_role(
    session: Session,
    State(app): State<GuardedAppState>,
    Form(form): Form<RoleForm>,
) -> Response {
    if !session.has_permission(Permission::ManageRoles) {
        warn!("{} tried to change the role of {}", session.username, form.username);
        return ServiceError::Forbidden.into_response();
    }
    let Some(role) = UserRole::from_str(form.role.trim()) else {
        return (StatusCode::BAD_REQUEST, format!("Unknown role {}", form.role)).into_response();
    };
    let result = app
        .lock()
        .unwrap()
        .identity()
        .set_role(form.username.trim(), role);
    match result {
        Ok(user) => notice_redirect(
            "/",
            &format!("{} is now {}", user.username, user.role.as_str()),
        ),
        Err(err @ ServiceError::NotFound(_)) => notice_redirect("/", &err.to_string()),
        Err(err) => err.into_response(),
    }
}

pub fn make_account_routes(state: ServerState) -> Router {
    Router::new()
        .route("/register", get(register_form).post(register))
        .route("/login", get(login_form).post(login))
        .route("/logout", post(logout))
        .route("/admin/role", post(set_role))
        .with_state(state)
}
