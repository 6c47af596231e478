//! The two-phase orchestrator: populate the cache, then execute every rule.

use paramwrap_types::Rule;
use tracing::debug;

use crate::cache::ParameterCache;
use crate::execute::execute_rule;
use crate::source::ParameterSource;
use crate::EngineError;

/// Resolve and distribute every rule, in input order.
///
/// One cache is built from all rules' scopes up front, then each rule is
/// answered from it. Returns normally when all exports landed; the caller
/// owns whatever happens next (typically replacing the process with the
/// wrapped command). Exports performed before a failure are not rolled back.
pub async fn run_rules(source: &dyn ParameterSource, rules: &[Rule]) -> Result<(), EngineError> {
    debug!(rules = rules.len(), "start processing rules");

    let scopes = rules.iter().map(|rule| rule.scope.clone()).collect();

    let mut cache = ParameterCache::new();
    cache.populate(source, scopes).await?;

    for rule in rules {
        debug!(rule = %rule, "executing rule");
        execute_rule(&cache, rule)?;
    }

    debug!(rules = rules.len(), "rules processed successfully");

    Ok(())
}
