//! Configuration management for the CLI
//!
//! Values come from `~/.config/kcap/config.json` and `KCAP_*` environment
//! variables, overridden by command-line flags, and are resolved once into
//! an immutable [`Settings`] passed to every command.

use anyhow::{bail, Context, Result};
use kcap_lib::DEFAULT_WASTE_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// Values read from the config file and environment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Path to kubeconfig file
    pub kubeconfig: Option<String>,
    /// Default namespace
    pub namespace: Option<String>,
    /// Default output format
    pub format: Option<OutputFormat>,
    /// Default waste threshold percentage
    pub threshold: Option<f64>,
}

impl Config {
    /// Load configuration from the default file and environment
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `path` (if it exists) and environment
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Json)
                    .required(false),
            )
            .add_source(config::Environment::with_prefix("KCAP").try_parsing(true))
            .build()
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        config
            .try_deserialize()
            .context("Failed to parse config file")
    }

    /// Get the configuration file path
    fn config_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("kcap").join("config.json"))
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub kubeconfig: Option<String>,
    pub namespace: Option<String>,
    pub format: Option<OutputFormat>,
    pub threshold: Option<f64>,
}

/// Resolved settings for one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Kubeconfig to load; `None` infers in-cluster configuration
    pub kubeconfig: Option<PathBuf>,
    /// Namespace filter; `None` means all namespaces
    pub namespace: Option<String>,
    pub format: OutputFormat,
    /// Pod waste percentage at which recommendations fire
    pub threshold: f64,
}

impl Settings {
    /// Merge command-line overrides over file/environment configuration
    pub fn resolve(overrides: Overrides, config: Config) -> Result<Self> {
        let threshold = overrides
            .threshold
            .or(config.threshold)
            .unwrap_or(DEFAULT_WASTE_THRESHOLD);
        if !threshold.is_finite() || threshold < 0.0 {
            bail!("Invalid threshold {}: must be a non-negative percentage", threshold);
        }

        let kubeconfig = overrides.kubeconfig.or(config.kubeconfig);

        Ok(Self {
            kubeconfig: kubeconfig_path(kubeconfig.as_deref()),
            namespace: overrides
                .namespace
                .or(config.namespace)
                .filter(|ns| !ns.is_empty()),
            format: overrides.format.or(config.format).unwrap_or_default(),
            threshold,
        })
    }
}

/// Get kubeconfig path
///
/// Checks the explicit path, then `KUBECONFIG`, then `~/.kube/config` if it
/// exists.
pub fn kubeconfig_path(override_path: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = override_path.filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }

    if let Some(path) = std::env::var_os("KUBECONFIG")
        .and_then(|value| std::env::split_paths(&value).find(|p| !p.as_os_str().is_empty()))
    {
        return Some(path);
    }

    let default_path = dirs_next::home_dir()?.join(".kube").join("config");
    default_path.exists().then_some(default_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_from_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.threshold, None);
        assert_eq!(config.format, None);
    }

    #[test]
    fn test_load_from_json_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"namespace": "payments", "format": "json", "threshold": 65.5}}"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.namespace.as_deref(), Some("payments"));
        assert_eq!(config.format, Some(OutputFormat::Json));
        assert_eq!(config.threshold, Some(65.5));
    }

    #[test]
    fn test_resolve_defaults() {
        let settings = Settings::resolve(Overrides::default(), Config::default()).unwrap();
        assert_eq!(settings.threshold, DEFAULT_WASTE_THRESHOLD);
        assert_eq!(settings.format, OutputFormat::Table);
        assert_eq!(settings.namespace, None);
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config {
            kubeconfig: Some("/etc/kcap/kubeconfig".to_string()),
            namespace: Some("payments".to_string()),
            format: Some(OutputFormat::Json),
            threshold: Some(60.0),
        };
        let overrides = Overrides {
            kubeconfig: Some("/tmp/other".to_string()),
            namespace: Some("checkout".to_string()),
            format: Some(OutputFormat::Table),
            threshold: Some(90.0),
        };

        let settings = Settings::resolve(overrides, config).unwrap();
        assert_eq!(settings.kubeconfig, Some(PathBuf::from("/tmp/other")));
        assert_eq!(settings.namespace.as_deref(), Some("checkout"));
        assert_eq!(settings.format, OutputFormat::Table);
        assert_eq!(settings.threshold, 90.0);
    }

    #[test]
    fn test_config_fills_missing_flags() {
        let config = Config {
            kubeconfig: Some("/etc/kcap/kubeconfig".to_string()),
            threshold: Some(60.0),
            ..Default::default()
        };

        let settings = Settings::resolve(Overrides::default(), config).unwrap();
        assert_eq!(settings.kubeconfig, Some(PathBuf::from("/etc/kcap/kubeconfig")));
        assert_eq!(settings.threshold, 60.0);
    }

    #[test]
    fn test_empty_namespace_means_all() {
        let overrides = Overrides {
            namespace: Some(String::new()),
            ..Default::default()
        };
        let settings = Settings::resolve(overrides, Config::default()).unwrap();
        assert_eq!(settings.namespace, None);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        for threshold in [-1.0, f64::NAN, f64::INFINITY] {
            let overrides = Overrides {
                threshold: Some(threshold),
                ..Default::default()
            };
            assert!(Settings::resolve(overrides, Config::default()).is_err());
        }
    }

    #[test]
    fn test_explicit_kubeconfig_path() {
        assert_eq!(
            kubeconfig_path(Some("/tmp/kubeconfig")),
            Some(PathBuf::from("/tmp/kubeconfig"))
        );
    }
}
