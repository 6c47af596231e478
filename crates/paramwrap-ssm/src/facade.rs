//! Embedding facade: fetch by path expressions, export to the environment.
//!
//! For programs that want SSM values in their own environment without
//! wrapping a command. Every path expression becomes an env rule; files and
//! exec are not involved.

use paramwrap_core::{run_rules, EngineError};
use paramwrap_types::{DestinationKind, EnvOptions, PathScope, Rule, RuleError};
use thiserror::Error;

use crate::source::SsmSource;

/// Errors from the [`export`] facade.
#[derive(Debug, Error)]
pub enum SsmExportError {
    #[error("invalid path expression")]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Options for the [`export`] facade.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Path expressions to resolve (`/app/db_url`, `/app/*`, `/app/**/*`).
    pub paths: Vec<String>,
    /// Prefix prepended verbatim to every derived name.
    pub prefix: String,
    /// Derive names from entire parameter paths instead of final segments.
    pub entire_path: bool,
    /// Retry budget for the SDK; 0 keeps the default.
    pub retries: u32,
}

/// Fetch the parameters selected by `options.paths` and export them as
/// environment variables of the current process.
pub async fn export(options: ExportOptions) -> Result<(), SsmExportError> {
    let mut rules = Vec::with_capacity(options.paths.len());

    for path in &options.paths {
        let scope = PathScope::parse(path)?;
        rules.push(Rule::new(
            scope,
            DestinationKind::Env(EnvOptions {
                prefix: options.prefix.clone(),
                entire_path: options.entire_path,
            }),
        )?);
    }

    let source = SsmSource::connect(options.retries).await;
    run_rules(&source, &rules).await?;

    Ok(())
}
