//! Unified error type for zanzibar.
//!
//! All public APIs return `Result<T, ZanzibarError>`. Remote failures are
//! split by the operation that failed (authentication, secret lookup,
//! attachment download) so the operator always sees which secret id was
//! involved, whether the server reported the problem in-band or the
//! transport itself broke.

use std::fmt;
use std::path::PathBuf;

use crate::client::TransportError;

/// The unified error type for all zanzibar operations.
#[derive(Debug)]
pub enum ZanzibarError {
    // ── Manifest ───────────────────────────────────────────────────────
    /// No Zanzifile at the expected location.
    ManifestMissing(PathBuf),

    /// The Zanzifile parsed, but is unusable (no settings, no secrets, bad entry).
    ManifestInvalid(String),

    // ── Remote ─────────────────────────────────────────────────────────
    /// The server rejected the credentials, or the authenticate call failed.
    Authentication {
        username: String,
        message: String,
        cause: Option<TransportError>,
    },

    /// Looking up a secret failed.
    SecretFetch {
        id: i64,
        message: String,
        cause: Option<TransportError>,
    },

    /// Downloading a file attachment failed.
    AttachmentFetch {
        id: i64,
        message: String,
        cause: Option<TransportError>,
    },

    /// The secret exists but has no item with the requested field name.
    UnknownField { id: i64, field_name: String },

    /// A transport failure outside of any specific secret operation.
    Transport(TransportError),

    // ── Local ──────────────────────────────────────────────────────────
    /// Filesystem or I/O operation failed.
    Io(std::io::Error),

    /// YAML serialization/deserialization error.
    Yaml(serde_yaml::Error),

    /// KDL config file error.
    Config(String),

    /// The user cancelled an interactive prompt.
    Cancelled,

    /// Any other error.
    Other(String),
}

impl fmt::Display for ZanzibarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZanzibarError::ManifestMissing(path) => write!(
                f,
                "You don't have a {} at {}! Run `zanzibar init` to create one.",
                crate::manifest::MANIFEST_NAME,
                path.display()
            ),
            ZanzibarError::ManifestInvalid(msg) => write!(f, "invalid Zanzifile: {}", msg),
            ZanzibarError::Authentication {
                username, message, ..
            } => write!(
                f,
                "error generating the authentication token for user {}: {}",
                username, message
            ),
            ZanzibarError::SecretFetch { id, message, .. } => {
                write!(f, "error getting secret {}: {}", id, message)
            }
            ZanzibarError::AttachmentFetch { id, message, .. } => {
                write!(f, "error downloading attachment for secret {}: {}", id, message)
            }
            ZanzibarError::UnknownField { id, field_name } => {
                write!(f, "secret {} has no item named '{}'", id, field_name)
            }
            ZanzibarError::Transport(e) => write!(f, "{}", e),
            ZanzibarError::Io(e) => write!(f, "{}", e),
            ZanzibarError::Yaml(e) => write!(f, "YAML error: {}", e),
            ZanzibarError::Config(msg) => write!(f, "config error: {}", msg),
            ZanzibarError::Cancelled => write!(f, "cancelled"),
            ZanzibarError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ZanzibarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ZanzibarError::Authentication { cause, .. }
            | ZanzibarError::SecretFetch { cause, .. }
            | ZanzibarError::AttachmentFetch { cause, .. } => cause
                .as_ref()
                .map(|e| e as &(dyn std::error::Error + 'static)),
            ZanzibarError::Transport(e) => Some(e),
            ZanzibarError::Io(e) => Some(e),
            ZanzibarError::Yaml(e) => Some(e),
            _ => None,
        }
    }
}

// ── From implementations for common error types ────────────────────────

impl From<std::io::Error> for ZanzibarError {
    fn from(e: std::io::Error) -> Self {
        ZanzibarError::Io(e)
    }
}

impl From<serde_yaml::Error> for ZanzibarError {
    fn from(e: serde_yaml::Error) -> Self {
        ZanzibarError::Yaml(e)
    }
}

impl From<TransportError> for ZanzibarError {
    fn from(e: TransportError) -> Self {
        ZanzibarError::Transport(e)
    }
}

impl From<tempfile::PersistError> for ZanzibarError {
    fn from(e: tempfile::PersistError) -> Self {
        ZanzibarError::Io(e.error)
    }
}

// ── Convenience constructors ───────────────────────────────────────────

impl ZanzibarError {
    /// Create a manifest validation error.
    pub fn manifest_invalid(message: impl Into<String>) -> Self {
        ZanzibarError::ManifestInvalid(message.into())
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        ZanzibarError::Config(message.into())
    }

    /// True for failures the server or transport reported while authenticating.
    pub fn is_authentication(&self) -> bool {
        matches!(self, ZanzibarError::Authentication { .. })
    }

    /// The remote secret id this error concerns, if any.
    pub fn secret_id(&self) -> Option<i64> {
        match self {
            ZanzibarError::SecretFetch { id, .. }
            | ZanzibarError::AttachmentFetch { id, .. }
            | ZanzibarError::UnknownField { id, .. } => Some(*id),
            _ => None,
        }
    }
}

/// Convenience type alias for Results using ZanzibarError.
pub type Result<T> = std::result::Result<T, ZanzibarError>;
