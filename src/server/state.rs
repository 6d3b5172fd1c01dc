use axum::extract::FromRef;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;
use crate::panel::{HtmlDisplay, InjectionHandle, NotificationPanel};

pub type GuardedPanel = Arc<NotificationPanel>;
pub type GuardedDisplay = Arc<HtmlDisplay>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub panel: GuardedPanel,
    pub display: GuardedDisplay,
    pub injection: InjectionHandle,
}

impl ServerState {
    pub fn new(config: ServerConfig, panel: GuardedPanel, display: GuardedDisplay) -> Self {
        let injection = panel.injection_handle();
        Self {
            config,
            start_time: Instant::now(),
            panel,
            display,
            injection,
        }
    }
}

impl FromRef<ServerState> for GuardedPanel {
    fn from_ref(input: &ServerState) -> Self {
        input.panel.clone()
    }
}

impl FromRef<ServerState> for GuardedDisplay {
    fn from_ref(input: &ServerState) -> Self {
        input.display.clone()
    }
}

impl FromRef<ServerState> for InjectionHandle {
    fn from_ref(input: &ServerState) -> Self {
        input.injection.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
