//! Error types for greeter-core

use thiserror::Error;

use crate::capability::CapabilityKind;

/// Result type alias for registry and resolver operations
pub type Result<T> = std::result::Result<T, CapabilityError>;

/// Capability error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("{kind} already registered: {name}")]
    DuplicateName { kind: CapabilityKind, name: String },

    #[error("Resource URI already registered: {0}")]
    DuplicateUri(String),

    #[error("{kind} not found: {name}")]
    NotFound { kind: CapabilityKind, name: String },

    #[error("Invalid resource URI {uri:?}: {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("Unsupported resource scheme: {0:?}")]
    UnsupportedScheme(String),

    #[error("No {scheme} resource named {key:?}")]
    UnknownResource { scheme: String, key: String },

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Handler failed: {0}")]
    HandlerFailed(String),
}

impl CapabilityError {
    /// Whether the error means "nothing to read here" rather than a malformed request
    pub fn is_missing_resource(&self) -> bool {
        matches!(
            self,
            CapabilityError::UnknownResource { .. }
                | CapabilityError::NotFound {
                    kind: CapabilityKind::Resource,
                    ..
                }
        )
    }
}
