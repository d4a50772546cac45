//! Principal records as returned by upstream identity services.
//!
//! These are loosely shaped: roles may be bare names or objects carrying their
//! own permissions, and field names arrive in either snake_case or camelCase.
//! Nothing here is validated; `AuthorizationContext` does that at construction.

use serde::{Deserialize, Deserializer, Serialize};

/// Subject used when a record carries no identifier.
pub const ANONYMOUS_SUBJECT: &str = "anonymous";

/// A user or service principal and the raw grants attached to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalRecord {
    #[serde(
        default,
        alias = "userId",
        alias = "user_id",
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default)]
    pub roles: Vec<RoleEntry>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// A role as it appears on a principal record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleEntry {
    /// Just the role name; grants come from a `RoleCatalog`.
    Name(String),
    /// A role object with its grants inlined.
    Detailed {
        #[serde(alias = "roleName", alias = "role_name")]
        name: String,
        #[serde(default)]
        permissions: Vec<String>,
    },
}

impl RoleEntry {
    pub fn name(&self) -> &str {
        match self {
            RoleEntry::Name(name) => name,
            RoleEntry::Detailed { name, .. } => name,
        }
    }

    /// Grants carried inline by this entry, if any.
    pub fn permissions(&self) -> &[String] {
        match self {
            RoleEntry::Name(_) => &[],
            RoleEntry::Detailed { permissions, .. } => permissions.as_slice(),
        }
    }
}

/// Accept an id as a JSON string or number; numbers are kept in their JSON spelling.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    }))
}

impl PrincipalRecord {
    /// Parse a record from an upstream JSON payload.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn subject(&self) -> &str {
        self.id.as_deref().unwrap_or(ANONYMOUS_SUBJECT)
    }

    pub fn role_names(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(RoleEntry::name)
    }

    /// Direct grants followed by grants inlined in role objects.
    pub fn raw_grants(&self) -> impl Iterator<Item = &str> {
        self.permissions
            .iter()
            .chain(self.roles.iter().flat_map(|r| r.permissions().iter()))
            .map(String::as_str)
    }
}
