//! Path scopes — a parameter-store path plus a breadth qualifier.
//!
//! A scope is parsed from a user-supplied path expression:
//!
//! | Expression | Stored path | Level |
//! |------------|-------------|-------|
//! | `/app/db_url` | `/app/db_url` | Exact |
//! | `/app/*` | `/app/` | Children |
//! | `/app/**/*` | `/app/` | Descendants |
//!
//! Children and Descendants keep the trailing slash so that prefix matching
//! against full parameter paths never crosses a segment boundary.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::RuleError;

/// How deep a scope reaches below its path.
///
/// The derived ordering is the breadth ordering: `Descendants > Children >
/// Exact`. The overlap resolver sorts on it to consider broad scopes first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ScopeLevel {
    /// The path names a single parameter.
    Exact,
    /// Parameters directly under the path, one segment deep.
    Children,
    /// Every parameter under the path, any depth.
    Descendants,
}

/// A parameter-store path plus a breadth qualifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathScope {
    /// Slash-rooted store path. Ends with `/` for Children and Descendants.
    pub path: String,
    /// How deep the scope reaches below `path`.
    pub level: ScopeLevel,
}

fn path_expr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^/[-_/a-zA-Z0-9]+((/\**)?/\*)?$").expect("path expression regex is valid")
    })
}

impl PathScope {
    /// Parse a path expression into a scope.
    ///
    /// A `/**/*` suffix selects [`ScopeLevel::Descendants`], a `/*` suffix
    /// selects [`ScopeLevel::Children`], anything else is
    /// [`ScopeLevel::Exact`].
    pub fn parse(expr: &str) -> Result<Self, RuleError> {
        if !path_expr_regex().is_match(expr) {
            return Err(RuleError::InvalidPathFormat(expr.to_string()));
        }

        if let Some(path) = expr.strip_suffix("**/*") {
            return Ok(Self {
                path: path.to_string(),
                level: ScopeLevel::Descendants,
            });
        }

        if let Some(path) = expr.strip_suffix('*') {
            return Ok(Self {
                path: path.to_string(),
                level: ScopeLevel::Children,
            });
        }

        Ok(Self {
            path: expr.to_string(),
            level: ScopeLevel::Exact,
        })
    }

    /// True if fetching this scope's data is guaranteed to already contain
    /// everything `other` would fetch.
    ///
    /// This is the redundancy-elimination relation: it is reflexive, and a
    /// scope dropped in favor of a covering scope is still answered correctly
    /// because retrieval re-filters the cache by the original scope.
    pub fn covers(&self, other: &PathScope) -> bool {
        match self.level {
            ScopeLevel::Exact => self == other,
            ScopeLevel::Children => {
                if other.level == ScopeLevel::Descendants {
                    return false;
                }
                match other.path.strip_prefix(&self.path) {
                    // Covered only while the remainder stays within one segment.
                    Some(rest) => !rest.contains('/'),
                    None => false,
                }
            }
            ScopeLevel::Descendants => other.path.starts_with(&self.path),
        }
    }
}

impl fmt::Display for PathScope {
    /// Renders the original expression form (`/a/b`, `/a/*`, `/a/**/*`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            ScopeLevel::Exact => write!(f, "{}", self.path),
            ScopeLevel::Children => write!(f, "{}*", self.path),
            ScopeLevel::Descendants => write!(f, "{}**/*", self.path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/foo/v1", "/foo/v1", ScopeLevel::Exact)]
    #[case("/foo/*", "/foo/", ScopeLevel::Children)]
    #[case("/foo/**/*", "/foo/", ScopeLevel::Descendants)]
    #[case("/foo/bar/baz", "/foo/bar/baz", ScopeLevel::Exact)]
    #[case("/foo-bar/_baz09/*", "/foo-bar/_baz09/", ScopeLevel::Children)]
    fn parse_accepts(#[case] expr: &str, #[case] path: &str, #[case] level: ScopeLevel) {
        let scope = PathScope::parse(expr).unwrap();
        assert_eq!(scope.path, path);
        assert_eq!(scope.level, level);
    }

    #[rstest]
    #[case("")]
    #[case("foo/v1")]
    #[case("/*")]
    #[case("/foo/v1 ")]
    #[case("/foo/v*")]
    #[case("/foo/***")]
    #[case("/foo/v1?")]
    fn parse_rejects(#[case] expr: &str) {
        assert!(matches!(
            PathScope::parse(expr),
            Err(RuleError::InvalidPathFormat(_))
        ));
    }

    fn scope(path: &str, level: ScopeLevel) -> PathScope {
        PathScope {
            path: path.to_string(),
            level,
        }
    }

    #[rstest]
    // Exact covers only an identical scope.
    #[case(scope("/foo/v1", ScopeLevel::Exact), scope("/foo/v1", ScopeLevel::Exact), true)]
    #[case(scope("/foo/v1", ScopeLevel::Exact), scope("/foo/v2", ScopeLevel::Exact), false)]
    #[case(scope("/foo/", ScopeLevel::Exact), scope("/foo/", ScopeLevel::Children), false)]
    // Children covers one segment below, never deeper.
    #[case(scope("/foo/", ScopeLevel::Children), scope("/foo/v1", ScopeLevel::Exact), true)]
    #[case(scope("/foo/", ScopeLevel::Children), scope("/foo/v1/value", ScopeLevel::Exact), false)]
    #[case(scope("/foo/", ScopeLevel::Children), scope("/foo/", ScopeLevel::Children), true)]
    #[case(scope("/foo/", ScopeLevel::Children), scope("/foo/v1/", ScopeLevel::Children), false)]
    #[case(scope("/foo/", ScopeLevel::Children), scope("/foo/", ScopeLevel::Descendants), false)]
    #[case(scope("/foo/", ScopeLevel::Children), scope("/bar/v1", ScopeLevel::Exact), false)]
    // Descendants covers any prefix match, regardless of level.
    #[case(scope("/foo/", ScopeLevel::Descendants), scope("/foo/v1/value", ScopeLevel::Exact), true)]
    #[case(scope("/foo/", ScopeLevel::Descendants), scope("/foo/", ScopeLevel::Children), true)]
    #[case(scope("/foo/", ScopeLevel::Descendants), scope("/foo/", ScopeLevel::Descendants), true)]
    #[case(scope("/foo/", ScopeLevel::Descendants), scope("/foo/a/", ScopeLevel::Descendants), true)]
    #[case(scope("/foo/", ScopeLevel::Descendants), scope("/bar/", ScopeLevel::Children), false)]
    fn covers_relation(#[case] a: PathScope, #[case] b: PathScope, #[case] want: bool) {
        assert_eq!(a.covers(&b), want, "{a} covers {b}");
    }

    #[test]
    fn display_round_trips_expression() {
        for expr in ["/foo/v1", "/foo/*", "/foo/**/*"] {
            assert_eq!(PathScope::parse(expr).unwrap().to_string(), expr);
        }
    }

    #[test]
    fn breadth_ordering() {
        assert!(ScopeLevel::Descendants > ScopeLevel::Children);
        assert!(ScopeLevel::Children > ScopeLevel::Exact);
    }
}
