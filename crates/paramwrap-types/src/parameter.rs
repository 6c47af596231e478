//! A single resolved parameter from the remote store.

use serde::{Deserialize, Serialize};

/// One key/value pair returned by the parameter source.
///
/// Unique by path within a single run. Never mutated after the cache is
/// populated, and discarded when the run ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Full slash-rooted path of the parameter in the store.
    pub path: String,
    /// The parameter's value, already decrypted by the source.
    pub value: String,
}

impl Parameter {
    pub fn new(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }
}
