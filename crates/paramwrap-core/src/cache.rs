//! The per-run in-memory parameter cache.
//!
//! Populated once from the minimal fetch batches, then read-only. Lives for a
//! single run; nothing is persisted.

use std::collections::BTreeMap;
use std::collections::HashMap;

use paramwrap_types::{Parameter, PathScope, ScopeLevel};
use tracing::debug;

use crate::overlap;
use crate::source::{FetchBatch, ParameterSource};
use crate::EngineError;

/// Map from parameter path to value for one run.
///
/// Keys are kept sorted so retrieval order (and therefore export order) is
/// deterministic.
#[derive(Debug, Default)]
pub struct ParameterCache {
    parameters: BTreeMap<String, String>,
}

impl ParameterCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Fill the cache for the given scopes.
    ///
    /// Runs the overlap resolver, then issues one get-by-names call for the
    /// Exact batch and one get-by-path call per surviving Children
    /// (non-recursive) and Descendants (recursive) path. Any fetch failure is
    /// fatal; no partial cache is exposed to callers that propagate the error.
    pub async fn populate(
        &mut self,
        source: &dyn ParameterSource,
        scopes: Vec<PathScope>,
    ) -> Result<(), EngineError> {
        let batches = overlap::partition(overlap::resolve(scopes));

        if !batches.exact.is_empty() {
            let fetched = source
                .fetch_by_names(&batches.exact)
                .await
                .map_err(|source| EngineError::SourceFetch {
                    batch: FetchBatch::Names(batches.exact.clone()),
                    source,
                })?;
            self.merge(fetched);
        }

        for path in &batches.children {
            let fetched = source.fetch_by_path(path, false).await.map_err(|source| {
                EngineError::SourceFetch {
                    batch: FetchBatch::Path {
                        path: path.clone(),
                        recursive: false,
                    },
                    source,
                }
            })?;
            self.merge(fetched);
        }

        for path in &batches.descendants {
            let fetched = source.fetch_by_path(path, true).await.map_err(|source| {
                EngineError::SourceFetch {
                    batch: FetchBatch::Path {
                        path: path.clone(),
                        recursive: true,
                    },
                    source,
                }
            })?;
            self.merge(fetched);
        }

        debug!(parameters = self.parameters.len(), "parameter cache populated");

        Ok(())
    }

    fn merge(&mut self, fetched: HashMap<String, String>) {
        // Last write wins. Surviving scopes never legitimately disagree on a
        // path's value, so overlap here is a no-op in practice.
        self.parameters.extend(fetched);
    }

    /// All parameters matching a rule's scope, sorted by path.
    ///
    /// An empty result is not an error; the scope simply matched nothing.
    pub fn retrieve(&self, scope: &PathScope) -> Vec<Parameter> {
        match scope.level {
            ScopeLevel::Exact => self
                .parameters
                .get(&scope.path)
                .map(|value| vec![Parameter::new(&scope.path, value)])
                .unwrap_or_default(),
            ScopeLevel::Children => self.search(&scope.path, false),
            ScopeLevel::Descendants => self.search(&scope.path, true),
        }
    }

    fn search(&self, prefix: &str, recursive: bool) -> Vec<Parameter> {
        self.parameters
            .iter()
            .filter(|(path, _)| match path.strip_prefix(prefix) {
                Some(rest) => recursive || !rest.contains('/'),
                None => false,
            })
            .map(|(path, value)| Parameter::new(path, value))
            .collect()
    }
}
