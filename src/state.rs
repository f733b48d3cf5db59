use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use crate::config::SiteConfig;
use crate::content_loader::SiteContent;

pub type RefreshBroadcaster = broadcast::Sender<()>;

pub struct AppState {
    pub config: SiteConfig,
    pub content: RwLock<SiteContent>,
    pub is_development: bool,
}

impl AppState {
    pub fn new(config: SiteConfig, content: SiteContent, is_development: bool) -> Self {
        Self {
            config,
            content: RwLock::new(content),
            is_development,
        }
    }
}

#[derive(Clone)]
pub struct RouterState {
    pub app_state: Arc<AppState>,
    pub broadcaster: RefreshBroadcaster,
}

impl axum::extract::FromRef<RouterState> for Arc<AppState> {
    fn from_ref(state: &RouterState) -> Self {
        state.app_state.clone()
    }
}

impl axum::extract::FromRef<RouterState> for RefreshBroadcaster {
    fn from_ref(state: &RouterState) -> Self {
        state.broadcaster.clone()
    }
}
