//! API Key infrastructure implementations
//!
//! Key generation, the SQLite key store, the authorization service and
//! the one-time admin bootstrap.

mod bootstrap;
pub mod generator;
mod service;
pub mod sink;
mod sqlite_repository;

pub use bootstrap::{AdminBootstrap, BootstrapOutcome};
pub use generator::{digest_key, digest_secret, ApiKeyGenerator, GeneratedApiKey};
pub use service::{AuthorizationService, IssuedApiKey};
pub use sink::{CredentialSink, FileCredentialSink, StderrCredentialSink};
pub use sqlite_repository::SqliteKeyStore;
