use axum::extract::FromRef;

pub use crate::app_state::GuardedAppState;

use super::ServerConfig;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub app: GuardedAppState,
}

impl ServerState {
    pub fn new(config: ServerConfig, app: GuardedAppState) -> ServerState {
        ServerState { config, app }
    }
}

impl FromRef<ServerState> for GuardedAppState {
    fn from_ref(input: &ServerState) -> Self {
        input.app.clone()
    }
}
