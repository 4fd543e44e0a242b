use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::RegistrationStore;
use crate::services::RegistrationService;

/// Shared handler state. Built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub registrations: RegistrationService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn RegistrationStore>, config: AppConfig) -> Self {
        Self {
            registrations: RegistrationService::new(store),
            config: Arc::new(config),
        }
    }

    pub fn expose_error_details(&self) -> bool {
        self.config.api.expose_error_details
    }
}
