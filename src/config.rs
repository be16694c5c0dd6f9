//! Application configuration (`rcmkit.toml`)
//!
//! ```toml
//! [application]
//! name = "RCM Analysis Tool"
//! version = "1.0"
//!
//! [organization]
//! authority_name = "Murrumbidgee Irrigation"
//! department = "Asset Management"
//! contact_email = "assets@example.org"
//!
//! [risk]
//! moderate_min = 6
//! high_min = 8
//!
//! [session]
//! document = "rcm-session.json"
//! database = "rcmkit.db"
//! report_dir = "reports"
//!
//! [admin]
//! users = ["alice"]
//! ```
//!
//! Every section and key is optional. A missing file yields defaults; a
//! file that exists but does not parse or validate is an error.

use crate::engine::RiskThresholds;
use crate::error::{RcmError, Result};
use crate::persist::ApplicationInfo;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "rcmkit.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub application: ApplicationSection,
    pub organization: OrganizationSection,
    pub risk: RiskSection,
    pub session: SessionSection,
    pub admin: AdminSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApplicationSection {
    pub name: String,
    pub version: String,
}

impl Default for ApplicationSection {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OrganizationSection {
    pub authority_name: String,
    pub department: String,
    pub contact_email: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RiskSection {
    pub moderate_min: u8,
    pub high_min: u8,
}

impl Default for RiskSection {
    fn default() -> Self {
        let t = RiskThresholds::default();
        Self {
            moderate_min: t.moderate_min,
            high_min: t.high_min,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Working document, also the autosave target.
    pub document: PathBuf,
    pub database: PathBuf,
    pub report_dir: PathBuf,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            document: PathBuf::from("rcm-session.json"),
            database: PathBuf::from("rcmkit.db"),
            report_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AdminSection {
    pub users: Vec<String>,
}

impl AppConfig {
    /// Parse and validate configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)
            .map_err(|e| RcmError::Config(format!("failed to parse {}: {}", DEFAULT_CONFIG_FILE, e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let config = Self::parse(&contents)?;
                debug!(path = %path.display(), "loaded config");
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(RcmError::Config(format!(
                "failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        RiskThresholds::new(self.risk.moderate_min, self.risk.high_min)
            .map_err(|e| RcmError::Config(format!("[risk] {}", e)))?;
        if self.application.name.trim().is_empty() {
            return Err(RcmError::Config("[application] name must not be empty".to_string()));
        }
        Ok(())
    }

    /// Fallback thresholds used when the catalogue has none administered.
    pub fn default_thresholds(&self) -> RiskThresholds {
        RiskThresholds {
            moderate_min: self.risk.moderate_min,
            high_min: self.risk.high_min,
        }
    }

    pub fn is_admin(&self, user: &str) -> bool {
        self.admin.users.iter().any(|u| u == user)
    }

    pub fn application_info(&self) -> ApplicationInfo {
        ApplicationInfo {
            name: self.application.name.clone(),
            version: self.application.version.clone(),
            authority: self.organization.authority_name.clone(),
            department: self.organization.department.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.default_thresholds(), RiskThresholds::default());
        assert_eq!(config.session.document, PathBuf::from("rcm-session.json"));
    }

    #[test]
    fn test_partial_config() {
        let config = AppConfig::parse(
            r#"
            [organization]
            authority_name = "Water Authority"

            [risk]
            high_min = 9

            [admin]
            users = ["alice", "bob"]
            "#,
        )
        .unwrap();
        assert_eq!(config.organization.authority_name, "Water Authority");
        assert_eq!(config.default_thresholds(), RiskThresholds { moderate_min: 6, high_min: 9 });
        assert!(config.is_admin("bob"));
        assert!(!config.is_admin("carol"));
        assert_eq!(config.application_info().authority, "Water Authority");
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let err = AppConfig::parse("[risk]\nmoderate_min = 8\nhigh_min = 6\n").unwrap_err();
        assert!(matches!(err, RcmError::Config(_)));
        assert!(AppConfig::parse("[risk]\nhigh_min = 11\n").is_err());
    }

    #[test]
    fn test_malformed_toml_rejected() {
        assert!(matches!(AppConfig::parse("[risk"), Err(RcmError::Config(_))));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
