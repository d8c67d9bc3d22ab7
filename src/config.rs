use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::paths::PathOptions;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub graph: GraphConfig,
    #[serde(default)]
    pub mirror: MirrorConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub consolidation: ConsolidationConfig,
}

/// Primary graph store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    pub db_path: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Secondary (mirror) graph store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MirrorConfig {
    #[serde(default = "default_mirror_enabled")]
    pub enabled: bool,
    #[serde(default = "default_mirror_db_path")]
    pub db_path: PathBuf,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            enabled: default_mirror_enabled(),
            db_path: default_mirror_db_path(),
        }
    }
}

/// Defaults for introduction path queries
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_max_hops")]
    pub max_hops: usize,
    #[serde(default = "default_max_paths")]
    pub max_paths: usize,
    #[serde(default = "default_min_strength")]
    pub min_strength: f64,
    #[serde(default = "default_true")]
    pub prefer_linkedin: bool,
    #[serde(default = "default_true")]
    pub prefer_internal: bool,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            max_hops: default_max_hops(),
            max_paths: default_max_paths(),
            min_strength: default_min_strength(),
            prefer_linkedin: true,
            prefer_internal: true,
        }
    }
}

impl PathsConfig {
    /// Options for `find_intro_paths` built from the configured defaults.
    pub fn intro_options(&self) -> PathOptions {
        PathOptions {
            max_hops: self.max_hops,
            max_paths: self.max_paths,
            min_strength: self.min_strength,
            prefer_linkedin: self.prefer_linkedin,
            prefer_internal: self.prefer_internal,
        }
    }
}

/// Consolidation batch configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ConsolidationConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub extra_role_labels: Vec<String>,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            extra_role_labels: Vec::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_mirror_enabled() -> bool {
    true
}

fn default_mirror_db_path() -> PathBuf {
    PathBuf::from("intrograph-mirror.db")
}

fn default_max_hops() -> usize {
    4
}

fn default_max_paths() -> usize {
    10
}

fn default_min_strength() -> f64 {
    0.3
}

fn default_true() -> bool {
    true
}

fn default_page_size() -> usize {
    500
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in INTROGRAPH_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        let config_path = std::env::var("INTROGRAPH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        Self::from_toml_str(&config_str)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str).context("Failed to parse config.toml")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.graph.db_path.as_os_str().is_empty() {
            anyhow::bail!("graph.db_path must not be empty");
        }

        self.paths
            .intro_options()
            .validate()
            .map_err(|e| anyhow::anyhow!("[paths] {}", e))?;

        if self.consolidation.page_size == 0 {
            anyhow::bail!("consolidation.page_size must be greater than 0");
        }

        if self.mirror.enabled && self.mirror.db_path == self.graph.db_path {
            anyhow::bail!(
                "mirror.db_path must differ from graph.db_path ({})",
                self.graph.db_path.display()
            );
        }

        Ok(())
    }

    /// Get primary database path
    pub fn db_path(&self) -> &Path {
        &self.graph.db_path
    }

    /// Get mirror database path, if the mirror is enabled
    pub fn mirror_db_path(&self) -> Option<&Path> {
        self.mirror.enabled.then_some(self.mirror.db_path.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serialize config tests that mutate process-wide env so they don't race.
    static CONFIG_TEST_LOCK: Mutex<()> = Mutex::new(());

    const FULL_CONFIG: &str = r#"
[graph]
db_path = "./graph.db"
log_level = "debug"

[mirror]
enabled = true
db_path = "./mirror.db"

[paths]
max_hops = 3
max_paths = 7
min_strength = 0.4
prefer_linkedin = false

[consolidation]
page_size = 50
extra_role_labels = ["Head of Growth"]
"#;

    fn with_config_env(config_path: &std::path::Path, f: impl FnOnce()) {
        let original = std::env::var("INTROGRAPH_CONFIG").ok();
        std::env::set_var("INTROGRAPH_CONFIG", config_path.to_str().unwrap());
        f();
        std::env::remove_var("INTROGRAPH_CONFIG");
        if let Some(val) = original {
            std::env::set_var("INTROGRAPH_CONFIG", val);
        }
    }

    #[test]
    fn test_config_load_success() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, FULL_CONFIG).unwrap();
        with_config_env(&config_path, || {
            let config = Config::load();
            assert!(config.is_ok(), "Config::load() failed: {:?}", config.err());
            let config = config.unwrap();
            assert_eq!(config.graph.log_level, "debug");
            assert_eq!(config.paths.max_hops, 3);
            assert_eq!(config.paths.max_paths, 7);
            assert!(!config.paths.prefer_linkedin);
            assert!(config.paths.prefer_internal);
            assert_eq!(config.consolidation.page_size, 50);
            assert_eq!(config.consolidation.extra_role_labels, vec!["Head of Growth"]);
            assert_eq!(config.mirror_db_path(), Some(Path::new("./mirror.db")));
        });
    }

    #[test]
    fn test_config_minimal_uses_defaults() {
        let config = Config::from_toml_str("[graph]\ndb_path = \"g.db\"\n").unwrap();
        assert_eq!(config.graph.log_level, "info");
        assert!(config.mirror.enabled);
        assert_eq!(config.mirror.db_path, PathBuf::from("intrograph-mirror.db"));
        let options = config.paths.intro_options();
        assert_eq!(options.max_hops, 4);
        assert_eq!(options.max_paths, 10);
        assert!((options.min_strength - 0.3).abs() < 1e-9);
        assert!(options.prefer_linkedin);
        assert!(options.prefer_internal);
        assert_eq!(config.consolidation.page_size, 500);
    }

    #[test]
    fn test_config_rejects_out_of_range_strength() {
        let toml = "[graph]\ndb_path = \"g.db\"\n[paths]\nmin_strength = 1.5\n";
        let err = Config::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("min_strength"));

        let toml = "[graph]\ndb_path = \"g.db\"\n[paths]\nmax_hops = 0\n";
        let err = Config::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("max_hops"));
    }

    #[test]
    fn test_config_rejects_zero_hops() {
        let toml = "[graph]\ndb_path = \"g.db\"\n[paths]\nmax_hops = 0\n";
        assert!(Config::from_toml_str(toml).is_err());
    }

    #[test]
    fn test_config_rejects_mirror_on_primary_path() {
        let toml = "[graph]\ndb_path = \"g.db\"\n[mirror]\ndb_path = \"g.db\"\n";
        let err = Config::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("mirror.db_path"));
    }

    #[test]
    fn test_config_disabled_mirror_has_no_path() {
        let toml = "[graph]\ndb_path = \"g.db\"\n[mirror]\nenabled = false\n";
        let config = Config::from_toml_str(toml).unwrap();
        assert!(config.mirror_db_path().is_none());
    }

    #[test]
    fn test_config_invalid_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let original = std::env::var("INTROGRAPH_CONFIG").ok();
        std::env::set_var("INTROGRAPH_CONFIG", "nonexistent.toml");
        let config = Config::load();
        assert!(config.is_err());
        std::env::remove_var("INTROGRAPH_CONFIG");
        if let Some(v) = original {
            std::env::set_var("INTROGRAPH_CONFIG", v);
        }
    }
}
