//! Operator channels for one-time credentials
//!
//! The bootstrap admin key is handed to the operator through one of these
//! sinks instead of the log pipeline.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};

use crate::domain::{ApiKeyId, DomainError};

/// Destination for a freshly issued plaintext credential
pub trait CredentialSink: Send + Sync {
    /// Hand the plaintext to the operator
    fn deliver(&self, key_id: ApiKeyId, plaintext: &SecretString) -> Result<(), DomainError>;

    /// Channel name for log lines
    fn describe(&self) -> String;
}

/// Writes the credential to the process's standard error, outside of tracing
#[derive(Debug, Clone, Default)]
pub struct StderrCredentialSink;

impl CredentialSink for StderrCredentialSink {
    fn deliver(&self, key_id: ApiKeyId, plaintext: &SecretString) -> Result<(), DomainError> {
        let mut stderr = std::io::stderr().lock();

        writeln!(
            stderr,
            "\n==== ADMIN API KEY (id {}) - shown once, store it securely ====\n{}\n====\n",
            key_id,
            plaintext.expose_secret()
        )
        .map_err(|e| DomainError::internal(format!("Failed to write admin key: {}", e)))
    }

    fn describe(&self) -> String {
        "stderr".to_string()
    }
}

/// Writes the credential to a new owner-only file
#[derive(Debug, Clone)]
pub struct FileCredentialSink {
    path: PathBuf,
}

impl FileCredentialSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialSink for FileCredentialSink {
    fn deliver(&self, _key_id: ApiKeyId, plaintext: &SecretString) -> Result<(), DomainError> {
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path).map_err(|e| {
            DomainError::internal(format!(
                "Failed to create admin key file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        writeln!(file, "{}", plaintext.expose_secret())
            .and_then(|_| file.sync_all())
            .map_err(|e| {
                DomainError::internal(format!(
                    "Failed to write admin key file {}: {}",
                    self.path.display(),
                    e
                ))
            })
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}
