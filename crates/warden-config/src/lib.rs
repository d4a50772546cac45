//! Multi-tier TOML configuration for Warden.
//!
//! Reads configuration from multiple sources with precedence:
//! CLI flags > env vars > project file > global file > defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use warden_permissions::{Grant, RoleCatalog};
use warden_types::ConfigError;

/// The default log filter when nothing else sets one.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Name of the per-project config file, looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = ".warden.toml";

/// Resolved configuration for a Warden process.
#[derive(Debug, Clone)]
pub struct WardenConfig {
    pub log_level: String,
    pub config_dir: PathBuf,
    pub roles: RoleCatalog,
    /// Problems with config files that were skipped rather than failing the load.
    ///
    /// Collected instead of logged so the caller can report them once its
    /// subscriber is installed.
    pub warnings: Vec<String>,
}

/// Settings that can be read from a TOML config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub roles: Vec<RoleDefinition>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: Option<String>,
}

/// A `[[roles]]` entry: a role name and the grant patterns it confers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// CLI overrides that take highest precedence.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub log_level: Option<String>,
    pub config_dir: Option<PathBuf>,
    pub project_dir: Option<PathBuf>,
}

impl SettingsFile {
    /// Read and parse a settings file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

impl WardenConfig {
    /// Load configuration from all sources, applying precedence rules.
    ///
    /// Precedence (highest to lowest):
    /// 1. CLI flags
    /// 2. Environment variables (`WARDEN_LOG_LEVEL`)
    /// 3. Project config (`./.warden.toml`)
    /// 4. Global config (`~/.warden/config.toml`)
    /// 5. Defaults
    ///
    /// Roles defined in the project file replace same-named global roles.
    /// Unparsable files are skipped and reported in `warnings`.
    pub fn load(overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut warnings = Vec::new();
        let config_dir = overrides.config_dir.unwrap_or_else(config_dir);
        let global = load_settings_file(&config_dir.join("config.toml"), &mut warnings);

        let project = overrides
            .project_dir
            .or_else(|| std::env::current_dir().ok())
            .map(|dir| load_settings_file(&dir.join(PROJECT_CONFIG_FILE), &mut warnings))
            .unwrap_or_default();

        let mut config = Self::resolve(
            config_dir,
            overrides.log_level,
            std::env::var("WARDEN_LOG_LEVEL").ok(),
            global,
            project,
        )?;
        config.warnings = warnings;
        Ok(config)
    }

    fn resolve(
        config_dir: PathBuf,
        cli_level: Option<String>,
        env_level: Option<String>,
        global: SettingsFile,
        project: SettingsFile,
    ) -> Result<Self, ConfigError> {
        let log_level = cli_level
            .or(env_level)
            .or(project.logging.level)
            .or(global.logging.level)
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        let mut roles = RoleCatalog::new();
        for definition in global.roles.into_iter().chain(project.roles) {
            let grants = parse_role_grants(&definition)?;
            if roles.insert(definition.name.clone(), grants).is_some() {
                tracing::debug!(role = %definition.name, "Role redefined; later definition wins");
            }
        }

        Ok(WardenConfig {
            log_level,
            config_dir,
            roles,
            warnings: Vec::new(),
        })
    }
}

fn parse_role_grants(definition: &RoleDefinition) -> Result<Vec<Grant>, ConfigError> {
    definition
        .permissions
        .iter()
        .map(|raw| {
            Grant::parse(raw).map_err(|e| ConfigError::InvalidValue {
                key: format!("roles.{}.permissions", definition.name),
                message: e.to_string(),
            })
        })
        .collect()
}

/// Get the Warden config directory path (~/.warden/).
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("WARDEN_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".warden")
}

/// Load a settings file, returning defaults when it is missing or unparsable.
/// Anything other than a missing file is recorded in `warnings`.
fn load_settings_file(path: &Path, warnings: &mut Vec<String>) -> SettingsFile {
    match SettingsFile::from_path(path) {
        Ok(settings) => settings,
        Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            SettingsFile::default()
        }
        Err(e) => {
            warnings.push(e.to_string());
            SettingsFile::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings(toml_str: &str) -> SettingsFile {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn test_default_settings() {
        let settings = SettingsFile::default();
        assert!(settings.logging.level.is_none());
        assert!(settings.roles.is_empty());
    }

    #[test]
    fn test_settings_toml_parse() {
        let settings = settings(
            r#"
[logging]
level = "info"

[[roles]]
name = "admin"
permissions = ["admin.*", "user.*"]

[[roles]]
name = "guest"
"#,
        );
        assert_eq!(settings.logging.level.as_deref(), Some("info"));
        assert_eq!(settings.roles.len(), 2);
        assert_eq!(settings.roles[0].name, "admin");
        assert_eq!(settings.roles[0].permissions, ["admin.*", "user.*"]);
        assert!(settings.roles[1].permissions.is_empty());
    }

    #[test]
    fn test_log_level_precedence() {
        let global = settings("[logging]\nlevel = \"error\"");
        let project = settings("[logging]\nlevel = \"info\"");

        let resolve = |cli: Option<&str>, env: Option<&str>| {
            WardenConfig::resolve(
                PathBuf::from("/tmp"),
                cli.map(String::from),
                env.map(String::from),
                global.clone(),
                project.clone(),
            )
            .unwrap()
            .log_level
        };

        assert_eq!(resolve(Some("trace"), Some("debug")), "trace");
        assert_eq!(resolve(None, Some("debug")), "debug");
        assert_eq!(resolve(None, None), "info");

        let bare = WardenConfig::resolve(
            PathBuf::from("/tmp"),
            None,
            None,
            SettingsFile::default(),
            SettingsFile::default(),
        )
        .unwrap();
        assert_eq!(bare.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_project_roles_override_global() {
        let global = settings(
            r#"
[[roles]]
name = "viewer"
permissions = ["user.view"]

[[roles]]
name = "admin"
permissions = ["admin.*"]
"#,
        );
        let project = settings(
            r#"
[[roles]]
name = "viewer"
permissions = ["user.view", "tenant.view"]
"#,
        );
        let config =
            WardenConfig::resolve(PathBuf::from("/tmp"), None, None, global, project).unwrap();

        assert_eq!(config.roles.len(), 2);
        let viewer: Vec<String> = config
            .roles
            .get("viewer")
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(viewer, ["user.view", "tenant.view"]);
    }

    #[test]
    fn test_invalid_role_grant_is_config_error() {
        let global = settings(
            r#"
[[roles]]
name = "broken"
permissions = ["*.delete"]
"#,
        );
        let err = WardenConfig::resolve(
            PathBuf::from("/tmp"),
            None,
            None,
            global,
            SettingsFile::default(),
        )
        .unwrap_err();
        match err {
            ConfigError::InvalidValue { key, .. } => assert_eq!(key, "roles.broken.permissions"),
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_load_reads_both_tiers() {
        let global_dir = TempDir::new().unwrap();
        let project_dir = TempDir::new().unwrap();
        std::fs::write(
            global_dir.path().join("config.toml"),
            "[[roles]]\nname = \"auditor\"\npermissions = [\"audit.*\"]\n",
        )
        .unwrap();
        std::fs::write(
            project_dir.path().join(PROJECT_CONFIG_FILE),
            "[[roles]]\nname = \"operator\"\npermissions = [\"tenant.*\"]\n",
        )
        .unwrap();

        let config = WardenConfig::load(CliOverrides {
            log_level: Some("debug".into()),
            config_dir: Some(global_dir.path().to_path_buf()),
            project_dir: Some(project_dir.path().to_path_buf()),
        })
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.config_dir, global_dir.path());
        assert!(config.roles.get("auditor").is_some());
        assert!(config.roles.get("operator").is_some());
    }

    #[test]
    fn test_unparsable_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "this is not = = toml").unwrap();

        let config = WardenConfig::load(CliOverrides {
            log_level: Some("warn".into()),
            config_dir: Some(dir.path().to_path_buf()),
            project_dir: Some(dir.path().to_path_buf()),
        })
        .unwrap();
        assert!(config.roles.is_empty());
        assert_eq!(config.warnings.len(), 1);
        assert!(
            config.warnings[0].starts_with("Config file parse error at"),
            "unexpected warning: {}",
            config.warnings[0]
        );
    }

    #[test]
    fn test_missing_files_produce_no_warnings() {
        let dir = TempDir::new().unwrap();
        let config = WardenConfig::load(CliOverrides {
            log_level: Some("warn".into()),
            config_dir: Some(dir.path().to_path_buf()),
            project_dir: Some(dir.path().to_path_buf()),
        })
        .unwrap();
        assert!(config.warnings.is_empty());
    }

    #[test]
    fn test_duplicate_role_in_one_tier_later_wins() {
        let global = settings(
            r#"
[[roles]]
name = "viewer"
permissions = ["user.view"]

[[roles]]
name = "viewer"
permissions = ["tenant.view"]
"#,
        );
        let config = WardenConfig::resolve(
            PathBuf::from("/tmp"),
            None,
            None,
            global,
            SettingsFile::default(),
        )
        .unwrap();
        assert_eq!(config.roles.len(), 1);
        assert_eq!(
            config.roles.get("viewer"),
            Some(&[Grant::parse("tenant.view").unwrap()][..])
        );
    }

    #[test]
    fn test_from_path_reports_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[[roles]]\npermissions = 3\n").unwrap();
        assert!(matches!(
            SettingsFile::from_path(&path),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            SettingsFile::from_path(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
