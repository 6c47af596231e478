//! paramwrap CLI entry point.
//!
//! Usage:
//!   paramwrap -rule path=/app/*,type=env,prefix=APP_ -- server --port 8080
//!   paramwrap -env path=/app/* -file path=/app/cert,to=/etc/cert.pem -- server
//!
//! Fetches the parameters selected by the rules, injects them into the
//! environment and/or files, then replaces itself with the wrapped command.

use std::env;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use paramwrap_core::run_rules;
use paramwrap_ssm::SsmSource;

mod exec;
mod flags;

use flags::{flags_via_env, RuleFlags};

fn main() -> ExitCode {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

struct Cli {
    rules: RuleFlags,
    retries: u32,
    version: bool,
    help: bool,
    command: Vec<String>,
}

fn run() -> Result<ExitCode> {
    let args: Vec<String> = env::args().skip(1).collect();
    let cli = parse_args(&args)?;

    tracing::debug!(
        rules = cli.rules.rules.len(),
        retries = cli.retries,
        "parsed command line"
    );

    if cli.help {
        print_help();
        return Ok(ExitCode::SUCCESS);
    }

    if cli.version {
        println!("paramwrap v{}", env!("CARGO_PKG_VERSION"));
        return Ok(ExitCode::SUCCESS);
    }

    if cli.command.is_empty() {
        eprintln!("command required in arguments");
        return Ok(ExitCode::from(2));
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let source = SsmSource::connect(cli.retries).await;
        run_rules(&source, &cli.rules.rules).await
    })
    .context("failed to process rules")?;

    // Only returns on failure; on success the command takes over.
    Err(exec::exec_command(&cli.command))
}

fn parse_args(args: &[String]) -> Result<Cli> {
    let mut cli = Cli {
        rules: RuleFlags::default(),
        retries: 0,
        version: false,
        help: false,
        command: Vec::new(),
    };

    // Environment-sourced flag values come first, so argv can extend them.
    for value in flags_via_env("rule", true) {
        cli.rules.push_rule(&value)?;
    }
    for value in flags_via_env("env", true) {
        cli.rules.push_env(&value)?;
    }
    for value in flags_via_env("file", true) {
        cli.rules.push_file(&value)?;
    }
    if let Some(value) = flags_via_env("retries", false).first() {
        cli.retries = value
            .parse()
            .with_context(|| format!("PARAMWRAP_RETRIES={value}"))?;
    }

    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let (flag, inline) = match split_flag(arg) {
            Some(parts) => parts,
            None => {
                // First non-flag argument starts the wrapped command.
                cli.command.push(arg.clone());
                cli.command.extend(iter.by_ref().cloned());
                break;
            }
        };

        if flag.is_empty() {
            // Bare `--`: everything after is the wrapped command.
            cli.command.extend(iter.by_ref().cloned());
            break;
        }

        match flag {
            "help" | "h" => cli.help = true,
            "version" | "V" => cli.version = true,
            "rule" => cli.rules.push_rule(flag_value(flag, inline, &mut iter)?)?,
            "env" => cli.rules.push_env(flag_value(flag, inline, &mut iter)?)?,
            "file" => cli.rules.push_file(flag_value(flag, inline, &mut iter)?)?,
            "retries" => {
                let value = flag_value(flag, inline, &mut iter)?;
                cli.retries = value
                    .parse()
                    .with_context(|| format!("-retries {value}"))?;
            }
            unknown => bail!("unknown option: -{unknown}\nRun 'paramwrap -help' for usage."),
        }
    }

    Ok(cli)
}

/// Split `-flag` / `--flag` / `-flag=value` into name and optional inline
/// value. Returns `None` for non-flag arguments.
fn split_flag(arg: &str) -> Option<(&str, Option<&str>)> {
    let stripped = arg
        .strip_prefix("--")
        .or_else(|| arg.strip_prefix('-'))?;

    match stripped.split_once('=') {
        Some((flag, value)) => Some((flag, Some(value))),
        None => Some((stripped, None)),
    }
}

fn flag_value<'a>(
    flag: &str,
    inline: Option<&'a str>,
    iter: &mut std::slice::Iter<'a, String>,
) -> Result<&'a str> {
    match inline {
        Some(value) => Ok(value),
        None => iter
            .next()
            .map(String::as_str)
            .with_context(|| format!("-{flag} requires a value")),
    }
}

fn print_help() {
    println!(
        r#"paramwrap v{} — wrap a command with parameters injected from a remote store

Usage:
  paramwrap [OPTIONS] [--] <command> [args...]

Options:
  -rule <options>      Add an export rule
                       format:  path=PATH,type=TYPE[,...]
                       env:     path=/app/*,type=env,prefix=APP_,entirepath=false
                       file:    path=/app/cert,type=file,to=/etc/cert.pem,mode=0600,uid=0,gid=0
  -env <options>       Shorthand for -rule with type=env
  -file <options>      Shorthand for -rule with type=file
  -retries <n>         Retry budget for requests to the parameter store
  -h, -help            Show this help
  -V, -version         Show version

Path expressions:
  /app/db_url          Exactly one parameter
  /app/*               Parameters directly under /app/
  /app/**/*            Every parameter under /app/, recursively

Flag values are also read from PARAMWRAP_RULE, PARAMWRAP_RULE_1, ...,
PARAMWRAP_ENV..., PARAMWRAP_FILE..., and PARAMWRAP_RETRIES.

Examples:
  paramwrap -env path=/prod/app/* -- ./server
  paramwrap -file path=/prod/cert,to=/etc/cert.pem,mode=0600 -- nginx
"#,
        env!("CARGO_PKG_VERSION")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use paramwrap_types::{DestinationKind, ScopeLevel};

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_rules_retries_and_command() {
        let cli = parse_args(&args(&[
            "-rule",
            "path=/app/*,type=env,prefix=APP_",
            "-retries=5",
            "--",
            "server",
            "--port",
            "8080",
        ]))
        .unwrap();

        assert_eq!(cli.rules.rules.len(), 1);
        assert_eq!(cli.retries, 5);
        assert_eq!(cli.command, args(&["server", "--port", "8080"]));
    }

    #[test]
    fn command_starts_at_first_non_flag() {
        let cli = parse_args(&args(&["-env", "path=/app/*", "server", "-v"])).unwrap();

        assert_eq!(cli.rules.rules.len(), 1);
        assert_eq!(cli.command, args(&["server", "-v"]));
    }

    #[test]
    fn flags_after_separator_belong_to_command() {
        let cli = parse_args(&args(&["--", "server", "-rule", "x"])).unwrap();

        assert!(cli.rules.rules.is_empty());
        assert_eq!(cli.command, args(&["server", "-rule", "x"]));
    }

    #[test]
    fn env_and_file_sugar_build_typed_rules() {
        let cli = parse_args(&args(&[
            "-env",
            "path=/app/*",
            "-file",
            "path=/app/cert,to=/etc/cert.pem",
            "--",
            "true",
        ]))
        .unwrap();

        let rules = &cli.rules.rules;
        assert!(matches!(rules[0].destination, DestinationKind::Env(_)));
        assert_eq!(rules[0].scope.level, ScopeLevel::Children);
        assert!(matches!(rules[1].destination, DestinationKind::File(_)));
    }

    #[test]
    fn rejects_unknown_flags_and_bad_rules() {
        assert!(parse_args(&args(&["-frobnicate"])).is_err());
        assert!(parse_args(&args(&["-rule", "path=bad"])).is_err());
        assert!(parse_args(&args(&["-rule"])).is_err());
        assert!(parse_args(&args(&["-retries", "many"])).is_err());
    }

    #[test]
    fn version_and_help_flags() {
        assert!(parse_args(&args(&["-V"])).unwrap().version);
        assert!(parse_args(&args(&["--version"])).unwrap().version);
        assert!(parse_args(&args(&["-help"])).unwrap().help);
    }
}
