//! Role catalog — maps role names to the grants they confer.

use crate::types::Grant;
use std::collections::BTreeMap;
use warden_types::PermissionError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleCatalog {
    roles: BTreeMap<String, Vec<Grant>>,
}

impl RoleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from raw `(role, patterns)` pairs, validating every pattern.
    pub fn from_definitions<I, N, P, S>(definitions: I) -> Result<Self, PermissionError>
    where
        I: IntoIterator<Item = (N, P)>,
        N: Into<String>,
        P: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = Self::new();
        for (name, patterns) in definitions {
            let grants = patterns
                .into_iter()
                .map(|p| Grant::parse(p.as_ref()))
                .collect::<Result<Vec<_>, _>>()?;
            catalog.insert(name, grants);
        }
        Ok(catalog)
    }

    /// Add or replace a role. Returns the grants it previously had.
    pub fn insert(&mut self, name: impl Into<String>, grants: Vec<Grant>) -> Option<Vec<Grant>> {
        self.roles.insert(name.into(), grants)
    }

    pub fn get(&self, name: &str) -> Option<&[Grant]> {
        self.roles.get(name).map(Vec::as_slice)
    }

    /// Union of the grants of every known role in `roles`, in first-seen order.
    pub fn resolve<'a, I>(&self, roles: I) -> Vec<Grant>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut grants: Vec<Grant> = Vec::new();
        for role in roles {
            let Some(role_grants) = self.roles.get(role) else {
                tracing::debug!(role, "role not in catalog, contributes no grants");
                continue;
            };
            for grant in role_grants {
                if !grants.contains(grant) {
                    grants.push(grant.clone());
                }
            }
        }
        grants
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Grant])> {
        self.roles
            .iter()
            .map(|(name, grants)| (name.as_str(), grants.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> RoleCatalog {
        RoleCatalog::from_definitions([
            ("admin", vec!["admin.*", "user.*"]),
            ("viewer", vec!["user.view"]),
            ("editor", vec!["user.view", "user.edit"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_resolve_unions_known_roles() {
        let grants = catalog().resolve(["viewer", "editor"]);
        let rendered: Vec<String> = grants.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["user.view", "user.edit"]);
    }

    #[test]
    fn test_resolve_skips_unknown_roles() {
        let grants = catalog().resolve(["ghost", "viewer"]);
        assert_eq!(grants, vec![Grant::parse("user.view").unwrap()]);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let result = RoleCatalog::from_definitions([("bad", vec!["*.delete"])]);
        assert!(matches!(
            result,
            Err(PermissionError::MisplacedWildcard { .. })
        ));
    }

    #[test]
    fn test_insert_replaces() {
        let mut c = catalog();
        let previous = c.insert("viewer", vec![Grant::All]);
        assert_eq!(previous, Some(vec![Grant::parse("user.view").unwrap()]));
        assert_eq!(c.get("viewer"), Some(&[Grant::All][..]));
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn test_iter_is_sorted_by_name() {
        let c = catalog();
        let names: Vec<&str> = c.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["admin", "editor", "viewer"]);
    }
}
