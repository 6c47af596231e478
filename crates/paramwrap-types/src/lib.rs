//! Pure data types for paramwrap — path scopes, rules, parameters.
//!
//! This crate is a leaf dependency with no async runtime and no I/O. It exists
//! so that embedders can construct and inspect export rules without pulling in
//! the engine or any AWS machinery.

pub mod parameter;
pub mod rule;
pub mod scope;

// Flat re-exports for convenience
pub use parameter::*;
pub use rule::*;
pub use scope::*;

use thiserror::Error;

/// Errors raised while constructing scopes and rules from user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// The path expression does not match the allowed grammar
    /// (slash-rooted, `[-_/a-zA-Z0-9]`, optional `/*` or `/**/*` suffix).
    #[error("invalid path format: {0:?}")]
    InvalidPathFormat(String),

    /// A file destination was combined with a scope that can fan out to more
    /// than one parameter. Paths ending with `/*` or `/**/*` are not allowed
    /// for `type=file`.
    #[error("path {0:?} ends with `/*` or `/**/*`, which is not allowed for a file destination")]
    UnsupportedScopeForDestination(String),
}
