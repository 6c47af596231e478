//! Redundancy elimination over path scopes.
//!
//! Multiple rules routinely target overlapping or nested paths. Fetching each
//! rule's scope independently would repeat work against the remote store, so
//! before querying, the scope list is reduced to a minimal covering set and
//! partitioned into the three batch shapes the source understands. Dropping a
//! covered scope is safe because cache retrieval re-filters by each rule's
//! original scope.

use paramwrap_types::{PathScope, ScopeLevel};
use tracing::debug;

/// Surviving scopes partitioned by query shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeBatches {
    /// Exact paths, fetched as one get-by-names batch.
    pub exact: Vec<String>,
    /// Children paths, each fetched non-recursively.
    pub children: Vec<String>,
    /// Descendants paths, each fetched recursively.
    pub descendants: Vec<String>,
}

/// Reduce a scope list to the minimal set that still fetches a superset of
/// every input scope's data.
///
/// Scopes are considered broadest-first (level descending, then path
/// ascending as a deterministic tie-break) and dropped when an already
/// accepted scope covers them. Idempotent: resolving an already-minimal list
/// returns it unchanged.
pub fn resolve(mut scopes: Vec<PathScope>) -> Vec<PathScope> {
    scopes.sort_by(|a, b| b.level.cmp(&a.level).then_with(|| a.path.cmp(&b.path)));

    let mut accepted: Vec<PathScope> = Vec::new();

    for scope in scopes {
        if let Some(covering) = accepted.iter().find(|a| a.covers(&scope)) {
            debug!(scope = %scope, covered_by = %covering, "skipping fetch for covered scope");
            continue;
        }

        accepted.push(scope);
    }

    accepted
}

/// Split resolved scopes into the three fetch batches.
pub fn partition(scopes: Vec<PathScope>) -> ScopeBatches {
    let mut batches = ScopeBatches::default();

    for scope in scopes {
        match scope.level {
            ScopeLevel::Exact => batches.exact.push(scope.path),
            ScopeLevel::Children => batches.children.push(scope.path),
            ScopeLevel::Descendants => batches.descendants.push(scope.path),
        }
    }

    batches
}
