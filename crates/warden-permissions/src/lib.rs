//! Permission matching and authorization context for Warden.
//!
//! Permissions are dot-segmented strings (`admin.users.delete`).
//! Grants are exact (`user.view`), subtree (`admin.*`), or global (`*`).

pub mod catalog;
pub mod context;
pub mod matcher;
pub mod record;
pub mod types;

pub use catalog::RoleCatalog;
pub use context::AuthorizationContext;
pub use matcher::{GrantMatcher, MatchResult, authorize, matches};
pub use record::{PrincipalRecord, RoleEntry};
pub use types::*;
