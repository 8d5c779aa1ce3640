//! Application state shared by handlers and interceptors

use std::sync::Arc;

use crate::domain::TaskRepository;
use crate::infrastructure::api_key::AuthorizationService;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthorizationService>,
    pub tasks: Arc<dyn TaskRepository>,
    /// Allow `POST /register` without an admin key
    pub open_registration: bool,
}

impl AppState {
    pub fn new(
        auth: Arc<AuthorizationService>,
        tasks: Arc<dyn TaskRepository>,
        open_registration: bool,
    ) -> Self {
        Self {
            auth,
            tasks,
            open_registration,
        }
    }
}
