//! Configuration loader using figment.
//!
//! Layered configuration, later sources overriding earlier ones:
//!
//! 1. Built-in defaults ([`RootConfig::default`])
//! 2. Profile-specific config file (`trellis.{profile}.toml` / `.yaml`)
//! 3. Main config file (`trellis.toml` / `trellis.yaml`)
//! 4. Environment variables (`TRELLIS_*`, `__` as separator)
//! 5. Programmatic overrides via [`ConfigLoader::merge`]
//!
//! # Feature flags
//!
//! - `toml-config`: enables TOML configuration files
//! - `yaml-config`: enables YAML configuration files
//!
//! # Environment variable mapping
//!
//! - `TRELLIS_SERVER__PORT=9000` → `server.port = 9000`
//! - `TRELLIS_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//!
//! # Example
//!
//! ```rust,ignore
//! let config = ConfigLoader::new()
//!     .with_current_dir()
//!     .profile("production")
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "toml-config", feature = "yaml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::RootConfig;

/// Configuration profile for environment-specific settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    /// Development profile (default).
    #[default]
    Development,
    /// Production profile.
    Production,
    /// Custom profile name.
    Custom(String),
}

impl Profile {
    /// Returns the profile name as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Creates a profile from `TRELLIS_PROFILE` or defaults to Development.
    pub fn from_env() -> Self {
        std::env::var("TRELLIS_PROFILE")
            .map(|p| Self::from_name(&p))
            .unwrap_or_default()
    }

    fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration loader with figment-based multi-source support.
pub struct ConfigLoader {
    /// Programmatic overrides, merged last.
    figment: Figment,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    /// Specific config file to load (overrides search).
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a new configuration loader with defaults.
    pub fn new() -> Self {
        Self {
            figment: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    /// Sets the configuration profile.
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Profile::from_name(&profile.into());
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Adds the current directory to the search paths.
    pub fn with_current_dir(self) -> Self {
        if let Ok(cwd) = std::env::current_dir() {
            self.search_path(cwd)
        } else {
            self
        }
    }

    /// Adds the user config directory (`<config_dir>/trellis`) to the
    /// search paths.
    pub fn with_user_config_dir(self) -> Self {
        if let Some(config_dir) = dirs::config_dir() {
            self.search_path(config_dir.join("trellis"))
        } else {
            self
        }
    }

    /// Sets a specific configuration file to load instead of searching.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enables loading environment variables (default: true).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: RootConfig) -> Self {
        self.figment = self.figment.merge(Serialized::defaults(config));
        self
    }

    /// Loads and returns the configuration.
    pub fn load(self) -> ConfigResult<RootConfig> {
        let profile = self.profile.clone();
        let figment = self.build_figment()?;

        let config: RootConfig = figment
            .extract()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        debug!(
            profile = %profile,
            service = %config.application.service_name,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Builds the figment instance with all sources.
    fn build_figment(mut self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(RootConfig::default()));

        if let Some(path) = &self.config_file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
            info!(path = %path.display(), "Loading configuration file");
            figment = Self::merge_config_file(figment, path)?;
        } else {
            figment = self.search_config_files(figment);
        }

        if self.load_env {
            figment = figment.merge(
                Env::prefixed("TRELLIS_")
                    .split("__")
                    .map(|key| key.as_str().replace("__", ".").into()),
            );
        }

        // Programmatic overrides win over everything else.
        let user_figment = std::mem::take(&mut self.figment);
        figment = figment.merge(user_figment);

        Ok(figment)
    }

    /// Merges a single config file, dispatching on file extension.
    ///
    /// Only extensions enabled via feature flags are accepted.
    fn merge_config_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            #[cfg(feature = "toml-config")]
            "toml" => Ok(figment.merge(Toml::file(path))),
            #[cfg(feature = "yaml-config")]
            "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
            _ => Err(ConfigError::Parse(format!(
                "unsupported or disabled configuration file format: .{ext}"
            ))),
        }
    }

    /// Base file names searched per format, given the enabled features.
    fn base_names() -> Vec<&'static str> {
        let mut names = Vec::new();
        #[cfg(feature = "toml-config")]
        names.extend(["trellis.toml", "config.toml"]);
        #[cfg(feature = "yaml-config")]
        names.extend(["trellis.yaml", "trellis.yml", "config.yaml", "config.yml"]);
        names
    }

    /// Resolves the effective list of search paths.
    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd);
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("trellis"));
        }
        paths
    }

    /// Searches for and loads configuration files from the search paths.
    ///
    /// For each candidate a profile-specific variant is merged first
    /// (e.g. `trellis.production.toml`), then the base file; the search stops
    /// at the first base file found.
    fn search_config_files(&self, mut figment: Figment) -> Figment {
        for search_path in self.resolve_search_paths() {
            for base_name in Self::base_names() {
                let Some((stem, ext)) = base_name.rsplit_once('.') else {
                    continue;
                };

                let profile_path =
                    search_path.join(format!("{}.{}.{}", stem, self.profile.as_str(), ext));
                if profile_path.exists() {
                    debug!(path = %profile_path.display(), "Loading profile-specific config");
                    // merge_config_file only rejects disabled extensions,
                    // which base_names never produces.
                    if let Ok(merged) = Self::merge_config_file(figment.clone(), &profile_path) {
                        figment = merged;
                    }
                }

                let base_path = search_path.join(base_name);
                if base_path.exists() {
                    info!(path = %base_path.display(), "Loading configuration file");
                    if let Ok(merged) = Self::merge_config_file(figment.clone(), &base_path) {
                        figment = merged;
                    }
                    return figment;
                }
            }
        }

        warn!("No configuration file found, using defaults");
        figment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = ConfigLoader::new()
            .without_env()
            .search_path("/nonexistent")
            .load()
            .unwrap();

        assert_eq!(config.logging.level.as_str(), "info");
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = ConfigLoader::new()
            .without_env()
            .file("/nonexistent/trellis.toml")
            .load()
            .unwrap_err();

        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_programmatic_merge_wins() {
        let mut overrides = RootConfig::default();
        overrides.server.port = 9999;

        let config = ConfigLoader::new()
            .without_env()
            .search_path("/nonexistent")
            .merge(overrides)
            .load()
            .unwrap();

        assert_eq!(config.server.port, 9999);
    }

    #[test]
    fn test_profile_parsing() {
        assert_eq!(Profile::from_name("prod"), Profile::Production);
        assert_eq!(Profile::from_name("dev"), Profile::Development);
        assert_eq!(
            Profile::from_name("staging"),
            Profile::Custom("staging".to_string())
        );
    }
}
