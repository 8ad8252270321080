use super::state::ServerState;
use crate::user::Permission;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use std::convert::Infallible;
use tracing::debug;

/// The process-wide login, as seen by one request.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub username: String,
    pub permissions: Vec<Permission>,
}

impl Session {
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

pub const LOGIN_REQUIRED_NOTICE: &str = "Please log in first";

/// Location of the login page showing `notice`.
pub fn login_location(notice: &str) -> String {
    format!("/login?notice={}", urlencoding::encode(notice))
}

pub fn login_redirect(notice: &str) -> Response {
    Redirect::to(&login_location(notice)).into_response()
}

pub enum SessionExtractionError {
    LoginRequired,
}

impl IntoResponse for SessionExtractionError {
    fn into_response(self) -> Response {
        match self {
            SessionExtractionError::LoginRequired => login_redirect(LOGIN_REQUIRED_NOTICE),
        }
    }
}

fn extract_session(ctx: &ServerState) -> Option<Session> {
    let app = ctx.app.lock().unwrap();
    let Some(user) = app.current_user() else {
        debug!("Nobody is logged in");
        return None;
    };
    Some(Session {
        user_id: user.id.clone(),
        username: user.username.clone(),
        permissions: user.role.permissions().to_vec(),
    })
}

impl FromRequestParts<ServerState> for Session {
    type Rejection = SessionExtractionError;

    async fn from_request_parts(
        _parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        extract_session(ctx).ok_or(SessionExtractionError::LoginRequired)
    }
}

impl OptionalFromRequestParts<ServerState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(extract_session(ctx))
    }
}
