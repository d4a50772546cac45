//! Subcommand implementations. Each writes its report to `out`.

use anyhow::{Context, Result, bail};
use std::io::Write;
use std::path::Path;
use warden_permissions::{
    AuthorizationContext, AuthorizationDecision, Grant, PrincipalRecord, RoleCatalog, matches,
};

/// Process exit status for usage, config, and I/O errors.
pub const ERROR_EXIT_CODE: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Allowed,
    Denied,
    Listed,
}

impl Outcome {
    /// 0 on allow or a successful listing, 1 on deny.
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Allowed | Outcome::Listed => 0,
            Outcome::Denied => 1,
        }
    }
}

pub fn check(out: &mut impl Write, pattern: &str, required: &str) -> Result<Outcome> {
    if matches(pattern, required) {
        writeln!(out, "allow")?;
        Ok(Outcome::Allowed)
    } else {
        writeln!(out, "deny")?;
        Ok(Outcome::Denied)
    }
}

pub fn authorize(
    out: &mut impl Write,
    catalog: &RoleCatalog,
    subject: &str,
    grants: &[String],
    roles: &[String],
    required: &str,
) -> Result<Outcome> {
    let mut held = grants
        .iter()
        .map(|g| {
            g.parse::<Grant>()
                .with_context(|| format!("Invalid --grant '{g}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    for role in roles {
        if catalog.get(role).is_none() {
            bail!("Unknown role '{role}' (see `warden roles`)");
        }
    }
    held.extend(catalog.resolve(roles.iter().map(String::as_str)));

    let ctx = AuthorizationContext::new(subject, roles, held);
    report(out, &ctx.check(required))
}

pub fn inspect(
    out: &mut impl Write,
    catalog: &RoleCatalog,
    path: &Path,
    required: &str,
) -> Result<Outcome> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let record = PrincipalRecord::from_json(&json)
        .with_context(|| format!("Failed to parse principal record {}", path.display()))?;
    let ctx = AuthorizationContext::from_record_with_catalog(&record, catalog)
        .context("Principal record carries an invalid grant")?;
    report(out, &ctx.check(required))
}

pub fn list_roles(out: &mut impl Write, catalog: &RoleCatalog) -> Result<Outcome> {
    if catalog.is_empty() {
        writeln!(out, "No roles configured.")?;
    }
    for (name, grants) in catalog.iter() {
        let rendered: Vec<String> = grants.iter().map(ToString::to_string).collect();
        writeln!(out, "{name}: {}", rendered.join(", "))?;
    }
    Ok(Outcome::Listed)
}

fn report(out: &mut impl Write, decision: &AuthorizationDecision) -> Result<Outcome> {
    match decision {
        AuthorizationDecision::Allow { matched_by } => {
            writeln!(out, "allow (grant: {matched_by})")?;
            Ok(Outcome::Allowed)
        }
        AuthorizationDecision::Deny { reason } => {
            writeln!(out, "deny: {reason}")?;
            Ok(Outcome::Denied)
        }
    }
}
