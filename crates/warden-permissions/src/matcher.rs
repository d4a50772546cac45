//! Grant matcher — evaluates held grants against a required permission.

use crate::types::{Grant, Permission, SEPARATOR, WILDCARD};

/// Check whether a held `pattern` covers the `required` permission.
///
/// Rules, first hit wins:
/// 1. `*` matches everything.
/// 2. An identical string matches.
/// 3. `prefix.*` matches `prefix` and anything starting with `prefix.`.
/// 4. Nothing else matches.
///
/// Wildcards are only honored in the trailing position, so `*.delete`
/// matches nothing but the literal string `*.delete`.
pub fn matches(pattern: &str, required: &str) -> bool {
    if pattern == WILDCARD || pattern == required {
        return true;
    }

    match pattern.strip_suffix(".*") {
        Some(prefix) => match required.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with(SEPARATOR),
            None => false,
        },
        None => false,
    }
}

/// True if any held pattern covers `required`. An empty set authorizes nothing.
pub fn authorize<I, S>(held: I, required: &str) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    held.into_iter().any(|pattern| matches(pattern.as_ref(), required))
}

/// Result of evaluating grants: the winning grant + a human-readable description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub grant: Grant,
    pub description: String,
}

/// Evaluates validated grants against validated permissions.
pub struct GrantMatcher;

impl GrantMatcher {
    /// Find the first grant that covers `required`.
    ///
    /// Any matching grant is sufficient; there is no precedence between them.
    pub fn evaluate(grants: &[Grant], required: &Permission) -> Option<MatchResult> {
        let grant = grants.iter().find(|g| g.matches(required))?;
        Some(MatchResult {
            grant: grant.clone(),
            description: Self::describe(grant, required),
        })
    }

    fn describe(grant: &Grant, required: &Permission) -> String {
        format!("grant: {grant} -> {required}")
    }
}
