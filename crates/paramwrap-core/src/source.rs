//! The seam between the engine and the remote parameter store.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// Error from a parameter source implementation.
///
/// Sources reduce their transport errors to a message. Retry and pagination
/// live inside the source, so by the time this surfaces the fetch has failed
/// for good.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct SourceError {
    message: String,
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One fetch issued against the source, kept for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchBatch {
    /// A batch get of exact parameter names.
    Names(Vec<String>),
    /// A hierarchy query under one path.
    Path { path: String, recursive: bool },
}

impl fmt::Display for FetchBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchBatch::Names(names) => write!(f, "names {names:?}"),
            FetchBatch::Path { path, recursive } => {
                if *recursive {
                    write!(f, "path {path} (recursive)")
                } else {
                    write!(f, "path {path}")
                }
            }
        }
    }
}

/// A hierarchical remote key-value parameter store.
///
/// Implementations own authentication, pagination, decryption, and retry.
/// Both methods return an empty map, not an error, when nothing matches or
/// the input is empty.
#[async_trait]
pub trait ParameterSource: Send + Sync {
    /// Fetch parameters by exact names, as one batch.
    async fn fetch_by_names(
        &self,
        names: &[String],
    ) -> Result<HashMap<String, String>, SourceError>;

    /// Fetch every parameter under `path`; only one segment deep unless
    /// `recursive` is set.
    async fn fetch_by_path(
        &self,
        path: &str,
        recursive: bool,
    ) -> Result<HashMap<String, String>, SourceError>;
}
