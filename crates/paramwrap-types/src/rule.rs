//! Export rules — a path scope bound to exactly one destination.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{PathScope, RuleError, ScopeLevel};

/// Options for an environment-variable destination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvOptions {
    /// Prepended verbatim to every derived name before uppercasing. No
    /// separator is inserted; include a trailing `_` in the prefix if one is
    /// wanted.
    pub prefix: String,

    /// Derive the name from the entire parameter path (`/a/b/c` → `A_B_C`)
    /// instead of only the final segment (`C`).
    pub entire_path: bool,
}

/// Options for a file destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOptions {
    /// Target file path, written verbatim.
    pub path: PathBuf,

    /// Permission bits for the created file. Defaults to 0644 when unset.
    pub mode: Option<u32>,

    /// Owner uid. The file keeps the process's effective uid when unset.
    pub uid: Option<u32>,

    /// Owner gid. The file keeps the process's effective gid when unset.
    pub gid: Option<u32>,
}

impl FileOptions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: None,
            uid: None,
            gid: None,
        }
    }
}

/// Where a rule sends its resolved values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DestinationKind {
    /// Export as process environment variables.
    Env(EnvOptions),
    /// Write to a single file.
    File(FileOptions),
}

/// A user-declared binding from a path scope to one export destination.
///
/// Immutable once built; construction is the validation point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub scope: PathScope,
    pub destination: DestinationKind,
}

impl Rule {
    /// Build a rule, rejecting combinations that cannot execute.
    ///
    /// A file destination writes exactly one target, so its scope must be
    /// [`ScopeLevel::Exact`]; a Children or Descendants scope would fan out
    /// several parameters onto the same file.
    pub fn new(scope: PathScope, destination: DestinationKind) -> Result<Self, RuleError> {
        if matches!(destination, DestinationKind::File(_)) && scope.level != ScopeLevel::Exact {
            return Err(RuleError::UnsupportedScopeForDestination(scope.to_string()));
        }

        Ok(Self { scope, destination })
    }
}

impl fmt::Display for Rule {
    /// Renders the flag form the rule was declared in, for diagnostics.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "path={}", self.scope)?;

        match &self.destination {
            DestinationKind::Env(opts) => {
                write!(
                    f,
                    ",type=env,prefix={},entirepath={}",
                    opts.prefix, opts.entire_path
                )
            }
            DestinationKind::File(opts) => {
                write!(f, ",type=file,to={}", opts.path.display())?;
                if let Some(mode) = opts.mode {
                    write!(f, ",mode={mode:04o}")?;
                }
                if let Some(uid) = opts.uid {
                    write!(f, ",uid={uid}")?;
                }
                if let Some(gid) = opts.gid {
                    write!(f, ",gid={gid}")?;
                }
                Ok(())
            }
        }
    }
}
