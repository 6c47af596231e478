//! Rule flag parsing.
//!
//! Rules arrive as comma-separated `key=value` option lists:
//!
//! ```text
//! -rule path=/app/*,type=env,prefix=APP_
//! -rule path=/app/cert,type=file,to=/etc/cert.pem,mode=0600
//! -env  path=/app/*,prefix=APP_           # type=env pre-filled
//! -file path=/app/cert,to=/etc/cert.pem   # type=file pre-filled
//! ```
//!
//! Flag values are also read from the environment (`PARAMWRAP_RULE`,
//! `PARAMWRAP_RULE_1`, ...) before argv, so wrappers-of-wrappers can inject
//! rules without rewriting command lines.

use std::collections::HashMap;

use anyhow::{anyhow, bail, Context, Result};
use paramwrap_types::{DestinationKind, EnvOptions, FileOptions, PathScope, Rule};

/// Accumulates rules from repeated `-rule` / `-env` / `-file` flags.
#[derive(Debug, Default)]
pub struct RuleFlags {
    pub rules: Vec<Rule>,
}

impl RuleFlags {
    pub fn push_rule(&mut self, value: &str) -> Result<()> {
        let opts = parse_opts(value).with_context(|| format!("-rule {value}"))?;
        self.push_opts(opts)
            .with_context(|| format!("-rule {value}"))
    }

    /// `-env` sugar: same grammar with the type pre-filled.
    pub fn push_env(&mut self, value: &str) -> Result<()> {
        let mut opts = parse_opts(value).with_context(|| format!("-env {value}"))?;
        opts.insert("type".to_string(), "env".to_string());
        self.push_opts(opts).with_context(|| format!("-env {value}"))
    }

    /// `-file` sugar: same grammar with the type pre-filled.
    pub fn push_file(&mut self, value: &str) -> Result<()> {
        let mut opts = parse_opts(value).with_context(|| format!("-file {value}"))?;
        opts.insert("type".to_string(), "file".to_string());
        self.push_opts(opts)
            .with_context(|| format!("-file {value}"))
    }

    fn push_opts(&mut self, opts: HashMap<String, String>) -> Result<()> {
        self.rules.push(build_rule(&opts)?);
        Ok(())
    }
}

fn parse_opts(value: &str) -> Result<HashMap<String, String>> {
    let mut opts = HashMap::new();

    for part in value.split(',') {
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| anyhow!("invalid format: {part:?}"))?;
        opts.insert(key.to_string(), value.to_string());
    }

    Ok(opts)
}

fn build_rule(opts: &HashMap<String, String>) -> Result<Rule> {
    let path = opts.get("path").ok_or_else(|| anyhow!("`path` is required"))?;
    let scope = PathScope::parse(path)?;

    let destination = match opts.get("type").map(String::as_str) {
        Some("env") => {
            check_option_keys(opts, &["prefix", "entirepath"])?;

            if opts.contains_key("entirepath") && opts.contains_key("to") {
                bail!("can't use `to` with `entirepath` in same time");
            }

            let entire_path = match opts.get("entirepath") {
                Some(value) => value
                    .parse::<bool>()
                    .map_err(|_| anyhow!("invalid `entirepath`"))?,
                None => false,
            };

            DestinationKind::Env(EnvOptions {
                prefix: opts.get("prefix").cloned().unwrap_or_default(),
                entire_path,
            })
        }
        Some("file") => {
            check_option_keys(opts, &["to", "mode", "uid", "gid"])?;

            let to = opts
                .get("to")
                .ok_or_else(|| anyhow!("`to` is required for `type=file`"))?;

            let mut file = FileOptions::new(to);

            if let Some(mode) = opts.get("mode") {
                file.mode =
                    Some(u32::from_str_radix(mode, 8).map_err(|_| anyhow!("invalid `mode`"))?);
            }

            if let Some(uid) = opts.get("uid") {
                file.uid = Some(uid.parse().map_err(|_| anyhow!("invalid `uid`"))?);
            }

            if let Some(gid) = opts.get("gid") {
                file.gid = Some(gid.parse().map_err(|_| anyhow!("invalid `gid`"))?);
            }

            DestinationKind::File(file)
        }
        _ => bail!("invalid `type`"),
    };

    Ok(Rule::new(scope, destination)?)
}

/// Reject option keys that don't belong to the destination type.
fn check_option_keys(opts: &HashMap<String, String>, allowed: &[&str]) -> Result<()> {
    for key in opts.keys() {
        if key == "path" || key == "type" {
            continue;
        }
        // `to` combines with `entirepath` checks above, so let it through
        // here for both types and validate the combination separately.
        if key == "to" {
            continue;
        }
        if !allowed.contains(&key.as_str()) {
            bail!("`{key}` is not allowed for `type={}`", opts["type"]);
        }
    }

    Ok(())
}

/// Read flag values from the environment.
///
/// `PARAMWRAP_<FLAG>` supplies a single value; repeatable flags additionally
/// read `PARAMWRAP_<FLAG>_<N>` names, ordered by `N`.
pub fn flags_via_env(flag: &str, multiple: bool) -> Vec<String> {
    flags_via_env_from(std::env::vars(), flag, multiple)
}

fn flags_via_env_from(
    vars: impl Iterator<Item = (String, String)>,
    flag: &str,
    multiple: bool,
) -> Vec<String> {
    let wanted = format!("PARAMWRAP_{}", flag.to_uppercase().replace('-', "_"));

    let mut hits: Vec<(u64, String)> = Vec::new();

    for (key, value) in vars {
        if value.is_empty() {
            continue;
        }

        if key == wanted {
            hits.push((0, value));
        } else if multiple {
            let suffix = key.strip_prefix(&wanted).and_then(|s| s.strip_prefix('_'));
            if let Some(n) = suffix.and_then(|s| s.parse::<u64>().ok()) {
                hits.push((n + 1, value));
            }
        }
    }

    hits.sort_by_key(|(order, _)| *order);

    let mut values: Vec<String> = hits.into_iter().map(|(_, value)| value).collect();
    if !multiple {
        values.truncate(1);
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use paramwrap_types::ScopeLevel;
    use rstest::rstest;

    #[test]
    fn parses_env_rule() {
        let mut flags = RuleFlags::default();
        flags
            .push_rule("path=/app/*,type=env,prefix=APP_,entirepath=true")
            .unwrap();

        let rule = &flags.rules[0];
        assert_eq!(rule.scope.path, "/app/");
        assert_eq!(rule.scope.level, ScopeLevel::Children);
        assert_eq!(
            rule.destination,
            DestinationKind::Env(EnvOptions {
                prefix: "APP_".to_string(),
                entire_path: true,
            })
        );
    }

    #[test]
    fn parses_file_rule() {
        let mut flags = RuleFlags::default();
        flags
            .push_rule("path=/app/cert,type=file,to=/etc/cert.pem,mode=0600,uid=1000,gid=2000")
            .unwrap();

        let rule = &flags.rules[0];
        let mut want = FileOptions::new("/etc/cert.pem");
        want.mode = Some(0o600);
        want.uid = Some(1000);
        want.gid = Some(2000);
        assert_eq!(rule.destination, DestinationKind::File(want));
    }

    #[test]
    fn env_and_file_sugar_prefill_type() {
        let mut flags = RuleFlags::default();
        flags.push_env("path=/app/*,prefix=APP_").unwrap();
        flags.push_file("path=/app/cert,to=/etc/cert.pem").unwrap();

        assert!(matches!(flags.rules[0].destination, DestinationKind::Env(_)));
        assert!(matches!(flags.rules[1].destination, DestinationKind::File(_)));
    }

    #[rstest]
    #[case::missing_path("type=env")]
    #[case::missing_type("path=/app/v1")]
    #[case::bad_type("path=/app/v1,type=stdout")]
    #[case::bad_path("path=app/v1,type=env")]
    #[case::no_equals("path")]
    #[case::file_without_to("path=/app/cert,type=file")]
    #[case::file_with_broad_scope("path=/app/*,type=file,to=/etc/out")]
    #[case::bad_mode("path=/app/cert,type=file,to=/etc/out,mode=rw-")]
    #[case::bad_uid("path=/app/cert,type=file,to=/etc/out,uid=root")]
    #[case::bad_entirepath("path=/app/*,type=env,entirepath=yes")]
    #[case::entirepath_with_to("path=/app/*,type=env,entirepath=true,to=X")]
    #[case::env_with_mode("path=/app/*,type=env,mode=0600")]
    #[case::file_with_prefix("path=/app/cert,type=file,to=/etc/out,prefix=X_")]
    #[case::unknown_key("path=/app/*,type=env,shade=dark")]
    fn rejects_invalid_rule_flags(#[case] value: &str) {
        let mut flags = RuleFlags::default();
        assert!(flags.push_rule(value).is_err(), "accepted {value:?}");
    }

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn env_sourcing_collects_numbered_values_in_order() {
        let environ = vars(&[
            ("PARAMWRAP_RULE_2", "second"),
            ("PARAMWRAP_RULE", "bare"),
            ("PARAMWRAP_RULE_10", "tenth"),
            ("PARAMWRAP_RULEX", "ignored"),
            ("OTHER", "ignored"),
        ]);

        let values = flags_via_env_from(environ.into_iter(), "rule", true);
        assert_eq!(values, vec!["bare", "second", "tenth"]);
    }

    #[test]
    fn env_sourcing_single_ignores_numbered_values() {
        let environ = vars(&[("PARAMWRAP_RETRIES_1", "5"), ("PARAMWRAP_RETRIES", "3")]);

        let values = flags_via_env_from(environ.into_iter(), "retries", false);
        assert_eq!(values, vec!["3"]);
    }

    #[test]
    fn env_sourcing_skips_empty_values() {
        let environ = vars(&[("PARAMWRAP_RULE", "")]);
        assert!(flags_via_env_from(environ.into_iter(), "rule", true).is_empty());
    }
}
