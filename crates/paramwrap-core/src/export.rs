//! Exporter sinks — where resolved values finally land.
//!
//! Two implementations: the process environment and a file on disk. Both are
//! synchronous; the writes are small and local.

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Default permission bits for exported files.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Errors from an exporter sink.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The derived name cannot be set as an environment variable.
    #[error("invalid environment variable name {0:?}")]
    InvalidEnvName(String),

    /// Writing the target file failed.
    #[error("failed to write file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Changing the target file's owner failed.
    #[error("failed to change owner of {path}: {source}")]
    ChownFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A sink that receives one resolved value.
pub trait Exporter {
    /// The destination name or address, for diagnostics.
    fn address(&self) -> String;

    /// Deliver the value to the destination.
    fn export(&self, value: &str) -> Result<(), ExportError>;
}

/// Sets one environment variable in the current process.
#[derive(Debug, Clone)]
pub struct EnvExporter {
    name: String,
}

impl EnvExporter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Exporter for EnvExporter {
    fn address(&self) -> String {
        self.name.clone()
    }

    fn export(&self, value: &str) -> Result<(), ExportError> {
        // set_var panics on names the platform rejects, so check first.
        if self.name.is_empty() || self.name.contains('=') || self.name.contains('\0') {
            return Err(ExportError::InvalidEnvName(self.name.clone()));
        }

        std::env::set_var(&self.name, value);
        Ok(())
    }
}

/// Writes one file, then adjusts ownership when asked to.
///
/// The mode applies at creation time; an already existing file keeps its
/// permissions, matching plain `write`-then-`chown` semantics. Unset uid/gid
/// leave the file owned by the current effective uid/gid.
#[derive(Debug, Clone)]
pub struct FileExporter {
    pub path: PathBuf,
    pub mode: u32,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
}

impl FileExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: DEFAULT_FILE_MODE,
            uid: None,
            gid: None,
        }
    }
}

impl Exporter for FileExporter {
    fn address(&self) -> String {
        self.path.display().to_string()
    }

    fn export(&self, value: &str) -> Result<(), ExportError> {
        write_file(&self.path, value, self.mode).map_err(|source| ExportError::WriteFile {
            path: self.path.clone(),
            source,
        })?;

        if self.uid.is_some() || self.gid.is_some() {
            std::os::unix::fs::chown(&self.path, self.uid, self.gid).map_err(|source| {
                ExportError::ChownFile {
                    path: self.path.clone(),
                    source,
                }
            })?;
        }

        Ok(())
    }
}

fn write_file(path: &Path, value: &str, mode: u32) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(path)?;
    file.write_all(value.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn env_exporter_sets_variable() {
        let exporter = EnvExporter::new("PARAMWRAP_EXPORT_TEST");
        exporter.export("value-1").unwrap();
        assert_eq!(
            std::env::var("PARAMWRAP_EXPORT_TEST").as_deref(),
            Ok("value-1")
        );
    }

    #[test]
    fn env_exporter_rejects_bad_names() {
        for name in ["", "LEFT=RIGHT"] {
            let err = EnvExporter::new(name).export("v").unwrap_err();
            assert!(matches!(err, ExportError::InvalidEnvName(_)), "{name:?}");
        }
    }

    #[test]
    fn file_exporter_writes_value_with_mode() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("secret");

        let mut exporter = FileExporter::new(&target);
        exporter.mode = 0o600;
        exporter.export("hush").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "hush");
        let mode = fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn file_exporter_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("secret");
        fs::write(&target, "old contents, longer than the new ones").unwrap();

        FileExporter::new(&target).export("new").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
    }

    #[test]
    fn file_exporter_reports_write_failures_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing-dir").join("secret");

        let err = FileExporter::new(&target).export("v").unwrap_err();

        match err {
            ExportError::WriteFile { path, .. } => assert_eq!(path, target),
            other => panic!("unexpected error: {other}"),
        }
    }
}
