// Application state for HTTP handlers
use crate::application::polling_service::PollingController;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<PollingController>,
}
