//! Per-rule execution: expand cached values into export actions.

use paramwrap_types::{DestinationKind, EnvOptions, Rule};
use tracing::debug;

use crate::cache::ParameterCache;
use crate::export::{EnvExporter, Exporter, FileExporter};
use crate::EngineError;

/// Execute one rule against a populated cache.
///
/// Retrieves the parameters matching the rule's scope and pushes each value
/// through the destination exporter. Zero matches is not an error — the rule
/// simply exports nothing, and for a file destination the file is left
/// untouched. The first export failure aborts, tagged with the destination
/// address.
pub fn execute_rule(cache: &ParameterCache, rule: &Rule) -> Result<(), EngineError> {
    for param in cache.retrieve(&rule.scope) {
        let exporter: Box<dyn Exporter> = match &rule.destination {
            DestinationKind::Env(opts) => Box::new(EnvExporter::new(env_name(&param.path, opts))),
            DestinationKind::File(opts) => {
                let mut exporter = FileExporter::new(&opts.path);
                if let Some(mode) = opts.mode {
                    exporter.mode = mode;
                }
                exporter.uid = opts.uid;
                exporter.gid = opts.gid;
                Box::new(exporter)
            }
        };

        let address = exporter.address();
        debug!(parameter = %param.path, %address, "exporting parameter");

        exporter
            .export(&param.value)
            .map_err(|source| EngineError::Export { address, source })?;
    }

    Ok(())
}

/// Derive the environment variable name for one parameter path.
///
/// With `entire_path`, every `/` becomes `_` and the leading underscore is
/// dropped (`/d/e/p` → `D_E_P`); otherwise only the final segment is used
/// (`P`). The prefix is prepended verbatim and the whole name uppercased.
pub fn env_name(param_path: &str, opts: &EnvOptions) -> String {
    let body = if opts.entire_path {
        let joined = param_path.replace('/', "_");
        joined
            .strip_prefix('_')
            .map(str::to_string)
            .unwrap_or(joined)
    } else {
        param_path
            .rsplit('/')
            .next()
            .unwrap_or(param_path)
            .to_string()
    };

    format!("{}{}", opts.prefix, body).to_uppercase()
}
