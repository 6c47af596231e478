//! AWS SSM Parameter Store bindings for paramwrap.
//!
//! Provides:
//!
//! - **SsmSource**: the default `ParameterSource`, wrapping the AWS SDK with
//!   decryption always on and manual next-token pagination
//! - **export**: an embedding facade that fetches by path expressions and
//!   exports to the process environment, without touching files or exec

pub mod facade;
pub mod source;

pub use facade::{export, ExportOptions, SsmExportError};
pub use source::SsmSource;
