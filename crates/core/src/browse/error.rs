use serde::Serialize;
use thiserror::Error;

use crate::remote_catalog::CatalogError;
use crate::store::StoreError;

/// Category of a failure surfaced to display collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A remote call was rejected or timed out.
    NetworkFailure,
    /// The requested item does not exist.
    NotFound,
    /// The persistent store could not be read or written.
    StorageUnavailable,
}

/// A failure recorded in the browse state.
///
/// Fetch failures are never returned to callers; they are stored here and
/// observed through snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct BrowseError {
    pub kind: ErrorKind,
    pub message: String,
}

impl BrowseError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Wrap a catalog failure with a user-facing prefix.
    pub fn from_catalog(context: &str, err: &CatalogError) -> Self {
        let kind = match err {
            CatalogError::NotFound(_) => ErrorKind::NotFound,
            _ => ErrorKind::NetworkFailure,
        };
        Self::new(kind, format!("{}: {}", context, err))
    }

    /// Wrap a storage failure.
    pub fn from_store(context: &str, err: &StoreError) -> Self {
        Self::new(
            ErrorKind::StorageUnavailable,
            format!("{}: {}", context, err),
        )
    }
}
