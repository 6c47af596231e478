//! Parameter-source test doubles.
//!
//! `StaticSource` serves a fixed map the way the real store answers path
//! queries; `RecordingSource` wraps any source and remembers which batches
//! were issued. Used by this crate's tests and available to embedders.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::source::{FetchBatch, ParameterSource, SourceError};

/// In-memory parameter source over a fixed path→value map.
#[derive(Debug, Default)]
pub struct StaticSource {
    data: HashMap<String, String>,
    failure: Option<String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source whose every fetch fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            data: HashMap::new(),
            failure: Some(message.into()),
        }
    }

    pub fn insert(&mut self, path: impl Into<String>, value: impl Into<String>) {
        self.data.insert(path.into(), value.into());
    }

    fn check_failure(&self) -> Result<(), SourceError> {
        match &self.failure {
            Some(message) => Err(SourceError::new(message.clone())),
            None => Ok(()),
        }
    }
}

impl<P: Into<String>, V: Into<String>> FromIterator<(P, V)> for StaticSource {
    fn from_iter<T: IntoIterator<Item = (P, V)>>(iter: T) -> Self {
        Self {
            data: iter
                .into_iter()
                .map(|(p, v)| (p.into(), v.into()))
                .collect(),
            failure: None,
        }
    }
}

#[async_trait]
impl ParameterSource for StaticSource {
    async fn fetch_by_names(
        &self,
        names: &[String],
    ) -> Result<HashMap<String, String>, SourceError> {
        self.check_failure()?;

        Ok(names
            .iter()
            .filter_map(|name| {
                self.data
                    .get(name)
                    .map(|value| (name.clone(), value.clone()))
            })
            .collect())
    }

    async fn fetch_by_path(
        &self,
        path: &str,
        recursive: bool,
    ) -> Result<HashMap<String, String>, SourceError> {
        self.check_failure()?;

        Ok(self
            .data
            .iter()
            .filter(|(key, _)| match key.strip_prefix(path) {
                Some(rest) => recursive || !rest.contains('/'),
                None => false,
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }
}

/// Wraps a source and records every fetch batch issued through it.
#[derive(Debug)]
pub struct RecordingSource<S> {
    inner: S,
    calls: Mutex<Vec<FetchBatch>>,
}

impl<S> RecordingSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// The batches issued so far, in order.
    pub fn calls(&self) -> Vec<FetchBatch> {
        self.calls.lock().expect("recording lock").clone()
    }

    fn record(&self, batch: FetchBatch) {
        self.calls.lock().expect("recording lock").push(batch);
    }
}

#[async_trait]
impl<S: ParameterSource> ParameterSource for RecordingSource<S> {
    async fn fetch_by_names(
        &self,
        names: &[String],
    ) -> Result<HashMap<String, String>, SourceError> {
        self.record(FetchBatch::Names(names.to_vec()));
        self.inner.fetch_by_names(names).await
    }

    async fn fetch_by_path(
        &self,
        path: &str,
        recursive: bool,
    ) -> Result<HashMap<String, String>, SourceError> {
        self.record(FetchBatch::Path {
            path: path.to_string(),
            recursive,
        });
        self.inner.fetch_by_path(path, recursive).await
    }
}
