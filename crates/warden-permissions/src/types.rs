//! Core types for the permission grammar.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use warden_types::PermissionError;

/// The wildcard segment.
pub const WILDCARD: &str = "*";

/// Separator between permission segments.
pub const SEPARATOR: char = '.';

/// A validated, wildcard-free permission string (e.g. `admin.users.delete`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Permission(String);

impl Permission {
    /// Parse a required permission. Rejects empty input, empty segments and any `*`.
    pub fn parse(value: &str) -> Result<Self, PermissionError> {
        check_segments(value)?;
        if value.contains('*') {
            return Err(PermissionError::WildcardInRequired {
                value: value.to_string(),
            });
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate the dot-separated segments in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR)
    }

    /// True if `self` equals `prefix` or lies beneath it on a segment boundary.
    pub fn is_within(&self, prefix: &Permission) -> bool {
        match self.0.strip_prefix(prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with(SEPARATOR),
            None => false,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Permission {
    type Err = PermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Permission {
    type Error = PermissionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Permission> for String {
    fn from(permission: Permission) -> Self {
        permission.0
    }
}

/// A held grant pattern.
///
/// Only trailing wildcards are representable: `*` on its own, or `prefix.*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Grant {
    /// `*` — grants everything.
    All,
    /// `prefix.*` — grants the prefix and every permission beneath it.
    Subtree(Permission),
    /// Grants exactly one permission.
    Exact(Permission),
}

impl Grant {
    /// Parse a grant pattern, rejecting wildcards anywhere but the last segment.
    pub fn parse(value: &str) -> Result<Self, PermissionError> {
        if value == WILDCARD {
            return Ok(Grant::All);
        }
        check_segments(value)?;

        let segments: Vec<&str> = value.split(SEPARATOR).collect();
        let Some((last, head)) = segments.split_last() else {
            return Err(PermissionError::Empty);
        };

        for segment in head {
            if *segment == WILDCARD {
                return Err(PermissionError::MisplacedWildcard {
                    value: value.to_string(),
                });
            }
            if segment.contains('*') {
                return Err(PermissionError::EmbeddedWildcard {
                    value: value.to_string(),
                });
            }
        }

        if *last == WILDCARD {
            // `value != "*"` and has no empty segments, so `head` is non-empty.
            Ok(Grant::Subtree(Permission(head.join("."))))
        } else if last.contains('*') {
            Err(PermissionError::EmbeddedWildcard {
                value: value.to_string(),
            })
        } else {
            Ok(Grant::Exact(Permission(value.to_string())))
        }
    }

    /// Check whether this grant covers `required`.
    pub fn matches(&self, required: &Permission) -> bool {
        match self {
            Grant::All => true,
            Grant::Subtree(prefix) => required.is_within(prefix),
            Grant::Exact(permission) => permission == required,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        !matches!(self, Grant::Exact(_))
    }
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grant::All => f.write_str(WILDCARD),
            Grant::Subtree(prefix) => write!(f, "{prefix}{SEPARATOR}{WILDCARD}"),
            Grant::Exact(permission) => write!(f, "{permission}"),
        }
    }
}

impl FromStr for Grant {
    type Err = PermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Grant {
    type Error = PermissionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Grant> for String {
    fn from(grant: Grant) -> Self {
        grant.to_string()
    }
}

/// The result of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationDecision {
    /// Allowed; carries the first grant that covered the permission.
    Allow { matched_by: Grant },
    /// Denied.
    Deny { reason: String },
}

impl AuthorizationDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AuthorizationDecision::Allow { .. })
    }
}

fn check_segments(value: &str) -> Result<(), PermissionError> {
    if value.is_empty() {
        return Err(PermissionError::Empty);
    }
    if value.split(SEPARATOR).any(str::is_empty) {
        return Err(PermissionError::EmptySegment {
            value: value.to_string(),
        });
    }
    Ok(())
}
