//! paramwrap-core: the rule resolution and parameter-distribution engine.
//!
//! This crate provides:
//!
//! - **Source**: the `ParameterSource` trait the remote store is consumed
//!   through, plus the batch descriptions used in errors
//! - **Overlap**: redundancy elimination over path scopes before any fetch
//! - **Cache**: the per-run in-memory parameter map (populate, then retrieve)
//! - **Export**: the env/file exporter sinks
//! - **Execute**: per-rule expansion of cached values into export actions
//! - **Run**: the two-phase populate-then-execute orchestrator
//! - **Testing**: in-memory and call-recording sources for tests and embedders
//!
//! Data flows one direction: rules → scopes → cache → values per rule →
//! exporters. Nothing in here execs processes or parses flags.

pub mod cache;
pub mod execute;
pub mod export;
pub mod overlap;
pub mod run;
pub mod source;
pub mod testing;

pub use cache::ParameterCache;
pub use execute::{env_name, execute_rule};
pub use export::{EnvExporter, ExportError, Exporter, FileExporter};
pub use overlap::{partition, resolve, ScopeBatches};
pub use run::run_rules;
pub use source::{FetchBatch, ParameterSource, SourceError};

use thiserror::Error;

/// Fatal engine errors. None of these are retried here; retry, if any,
/// belongs to the parameter source. Exports already performed before a
/// failure are not rolled back.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A fetch batch failed. The cache is not exposed in this state.
    #[error("failed to fetch parameters for {batch}")]
    SourceFetch {
        batch: FetchBatch,
        #[source]
        source: SourceError,
    },

    /// An exporter failed; remaining rule executions are abandoned.
    #[error("failed to export parameter to {address}")]
    Export {
        address: String,
        #[source]
        source: ExportError,
    },
}
