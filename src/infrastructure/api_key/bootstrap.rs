//! Admin bootstrap
//!
//! Creates the administrator key and the `admin` permission on first start.
//! Restarting is safe: an existing admin-owned key makes this a no-op.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::api_key::{ApiKeyId, KeyStore, Owner, PermissionName};
use crate::domain::DomainError;

use super::generator::ApiKeyGenerator;
use super::sink::CredentialSink;

/// Outcome of an admin bootstrap run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// An admin key was already present
    AlreadyPresent,
    /// A new admin key was issued and delivered
    Created(ApiKeyId),
}

/// One-time admin identity setup
pub struct AdminBootstrap {
    store: Arc<dyn KeyStore>,
    generator: ApiKeyGenerator,
    sink: Arc<dyn CredentialSink>,
}

impl AdminBootstrap {
    pub fn new(store: Arc<dyn KeyStore>, sink: Arc<dyn CredentialSink>) -> Self {
        Self {
            store,
            generator: ApiKeyGenerator::new(),
            sink,
        }
    }

    /// Ensure an admin key holding the `admin` permission exists.
    ///
    /// Any error is fatal to startup. The key stays uncommitted until the
    /// sink has accepted the plaintext, so a failed delivery leaves no admin
    /// identity behind and the next start issues a fresh key.
    pub async fn run(&self) -> Result<BootstrapOutcome, DomainError> {
        let owner = Owner::admin();

        if self.store.has_key_owned_by(&owner).await? {
            info!("Admin key already exists");
            return Ok(BootstrapOutcome::AlreadyPresent);
        }

        let generated = self.generator.generate()?;
        let Some(pending) = self
            .store
            .bootstrap_key(&generated.digest, &owner, &PermissionName::admin())
            .await?
        else {
            info!("Admin key created by another process");
            return Ok(BootstrapOutcome::AlreadyPresent);
        };

        let key_id = pending.key_id();

        // Dropping `pending` on a delivery error rolls the key back
        self.sink.deliver(key_id, &generated.plaintext)?;
        pending.commit().await?;

        warn!(
            key_id = %key_id,
            channel = %self.sink.describe(),
            "Admin API key generated - save it securely, it will not be shown again"
        );

        Ok(BootstrapOutcome::Created(key_id))
    }
}
