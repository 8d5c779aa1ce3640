//! Taskgate
//!
//! A task-tracking HTTP service guarded by API keys:
//! - Random keys handed out once, persisted only as SHA-256 digests
//! - Named permissions granted per key and checked per route
//! - One-time bootstrap of an administrator key

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use config::{AdminKeyOutput, AuthConfig};
use domain::task::task_permissions;
use domain::{KeyStore, TaskRepository};
use infrastructure::{
    api_key::{
        AdminBootstrap, AuthorizationService, BootstrapOutcome, CredentialSink,
        FileCredentialSink, SqliteKeyStore, StderrCredentialSink,
    },
    storage,
    task::SqliteTaskRepository,
};
use tracing::info;

/// Schema-initialized stores sharing one pool
pub struct Stores {
    pub keys: Arc<dyn KeyStore>,
    pub tasks: Arc<dyn TaskRepository>,
}

/// Connect to the configured database and create any missing tables
pub async fn open_stores(config: &AppConfig) -> anyhow::Result<Stores> {
    let pool = storage::connect(&config.storage).await?;

    let keys = SqliteKeyStore::new(pool.clone());
    keys.initialize_schema().await?;

    let tasks = SqliteTaskRepository::new(pool);
    tasks.initialize_schema().await?;

    info!("Database schema ready");

    Ok(Stores {
        keys: Arc::new(keys),
        tasks: Arc::new(tasks),
    })
}

/// Operator channel for the bootstrap admin key
pub fn credential_sink(config: &AuthConfig) -> Arc<dyn CredentialSink> {
    match config.admin_key_output {
        AdminKeyOutput::Stderr => Arc::new(StderrCredentialSink),
        AdminKeyOutput::File => Arc::new(FileCredentialSink::new(&config.admin_key_file)),
    }
}

/// Ensure the admin key exists; fatal on any failure
pub async fn bootstrap_admin(
    keys: Arc<dyn KeyStore>,
    sink: Arc<dyn CredentialSink>,
) -> anyhow::Result<BootstrapOutcome> {
    let outcome = AdminBootstrap::new(keys, sink)
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Admin bootstrap failed: {}", e))?;

    Ok(outcome)
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    create_app_state_with_sink(config, credential_sink(&config.auth)).await
}

/// Full startup sequence: schema, admin bootstrap, task permissions.
///
/// Completes before the listener is bound, so no request can observe a
/// half-initialized store.
pub async fn create_app_state_with_sink(
    config: &AppConfig,
    sink: Arc<dyn CredentialSink>,
) -> anyhow::Result<AppState> {
    let stores = open_stores(config).await?;

    bootstrap_admin(stores.keys.clone(), sink).await?;

    let auth = Arc::new(AuthorizationService::new(stores.keys));

    for permission in task_permissions() {
        auth.create_permission(&permission).await?;
    }

    Ok(AppState::new(
        auth,
        stores.tasks,
        config.auth.open_registration,
    ))
}
