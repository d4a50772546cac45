//! Authorization context — the main entry point for permission checks.

use crate::catalog::RoleCatalog;
use crate::matcher::GrantMatcher;
use crate::record::{ANONYMOUS_SUBJECT, PrincipalRecord};
use crate::types::*;
use std::collections::BTreeSet;
use warden_types::{PermissionError, WardenError};

/// An immutable snapshot of one principal's roles and grants.
///
/// Built once per request or session and passed explicitly to whatever needs
/// an authorization decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationContext {
    subject: String,
    roles: BTreeSet<String>,
    grants: Vec<Grant>,
}

impl AuthorizationContext {
    /// Create a context from already-validated grants. Duplicate grants are dropped.
    pub fn new<R, S>(
        subject: impl Into<String>,
        roles: R,
        grants: impl IntoIterator<Item = Grant>,
    ) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<Grant> = Vec::new();
        for grant in grants {
            if !unique.contains(&grant) {
                unique.push(grant);
            }
        }
        Self {
            subject: subject.into(),
            roles: roles.into_iter().map(Into::into).collect(),
            grants: unique,
        }
    }

    /// A context with no roles and no grants. Every check is denied.
    pub fn anonymous() -> Self {
        Self::new(ANONYMOUS_SUBJECT, Vec::<String>::new(), Vec::new())
    }

    /// Validate a raw record. Fails on the first malformed grant.
    pub fn from_record(record: &PrincipalRecord) -> Result<Self, PermissionError> {
        Self::from_record_with_catalog(record, &RoleCatalog::new())
    }

    /// Validate a raw record and add the grants of its roles from `catalog`.
    pub fn from_record_with_catalog(
        record: &PrincipalRecord,
        catalog: &RoleCatalog,
    ) -> Result<Self, PermissionError> {
        let mut grants = record
            .raw_grants()
            .map(Grant::parse)
            .collect::<Result<Vec<_>, _>>()?;
        grants.extend(catalog.resolve(record.role_names()));
        Ok(Self::new(record.subject(), record.role_names(), grants))
    }

    /// Validate a raw record, dropping malformed grants instead of failing.
    pub fn from_record_lossy(record: &PrincipalRecord) -> Self {
        let grants = record
            .raw_grants()
            .filter_map(|raw| match Grant::parse(raw) {
                Ok(grant) => Some(grant),
                Err(e) => {
                    tracing::warn!(
                        subject = record.subject(),
                        grant = raw,
                        "Dropping grant: {e}"
                    );
                    None
                }
            })
            .collect::<Vec<_>>();
        Self::new(record.subject(), record.role_names(), grants)
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(String::as_str)
    }

    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// True if any held grant covers `required`. A malformed `required` is denied.
    pub fn has_permission(&self, required: &str) -> bool {
        self.check(required).is_allowed()
    }

    /// Decide whether `required` is allowed, reporting the grant that allowed it.
    pub fn check(&self, required: &str) -> AuthorizationDecision {
        let permission = match Permission::parse(required) {
            Ok(permission) => permission,
            Err(e) => {
                tracing::debug!(
                    subject = %self.subject,
                    required,
                    "Rejecting malformed permission: {e}"
                );
                return AuthorizationDecision::Deny {
                    reason: e.to_string(),
                };
            }
        };
        self.decide(&permission)
    }

    /// Guard form of `check`: `Ok` when allowed, `WardenError::Denied` otherwise.
    pub fn require(&self, required: &str) -> Result<(), WardenError> {
        let permission = Permission::parse(required)?;
        match self.decide(&permission) {
            AuthorizationDecision::Allow { .. } => Ok(()),
            AuthorizationDecision::Deny { .. } => Err(WardenError::Denied {
                subject: self.subject.clone(),
                required: permission.into(),
            }),
        }
    }

    fn decide(&self, required: &Permission) -> AuthorizationDecision {
        match GrantMatcher::evaluate(&self.grants, required) {
            Some(result) => {
                tracing::debug!(subject = %self.subject, "Allowed by {}", result.description);
                AuthorizationDecision::Allow {
                    matched_by: result.grant,
                }
            }
            None => {
                tracing::debug!(subject = %self.subject, %required, "Denied: no covering grant");
                AuthorizationDecision::Deny {
                    reason: format!("no grant held by '{}' covers '{required}'", self.subject),
                }
            }
        }
    }
}
