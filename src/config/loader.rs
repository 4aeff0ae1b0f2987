//! Reads the configuration tiers and folds them into one [`Config`].

use super::merge::deep_merge_all;
use super::types::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const CONFIG_FILE: &str = "config.yaml";

/// Where a setting came from, ordered so later tiers win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Built-in defaults (lowest priority)
    Defaults = 0,
    /// Project-level config ($CWD/task-manager/)
    Project = 1,
    /// User-level config (~/.task-manager/)
    User = 2,
    /// `TASK_MANAGER_*` variables
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Directories (or one explicit file) to read config from.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Explicit config file replacing the project and user tiers
    pub explicit_file: Option<PathBuf>,
    /// Holds the project `config.yaml`
    pub project_dir: Option<PathBuf>,
    /// Holds the per-user `config.yaml`
    pub user_dir: Option<PathBuf>,
}

impl ConfigPaths {
    /// Tier locations from `TASK_MANAGER_*` variables, falling back to
    /// `./task-manager` and `~/.task-manager`.
    pub fn discover() -> Self {
        // User dir: TASK_MANAGER_USER_DIR or ~/.task-manager
        let user_dir = std::env::var("TASK_MANAGER_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".task-manager")));

        // Project dir: TASK_MANAGER_PROJECT_DIR or $CWD/task-manager
        let project_dir = std::env::var("TASK_MANAGER_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("task-manager")));

        let explicit_file = std::env::var("TASK_MANAGER_CONFIG_PATH")
            .ok()
            .map(PathBuf::from);

        Self {
            explicit_file,
            project_dir,
            user_dir,
        }
    }

    /// Tier locations given directly (tests, embedding).
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            explicit_file: None,
            project_dir,
            user_dir,
        }
    }

    /// Use one config file instead of the project and user tiers.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(path.into());
        self
    }
}

/// Read a YAML tier file. Missing files are skipped; unreadable ones are
/// skipped with a warning.
fn read_tier(path: &Path, tier: ConfigTier) -> Option<Value> {
    if !path.exists() {
        return None;
    }
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(tier = %tier, path = %path.display(), "Cannot read config file: {}", e);
            return None;
        }
    };
    match serde_yaml::from_str::<Value>(&content) {
        Ok(value) => {
            debug!(tier = %tier, path = %path.display(), "Loaded config tier");
            Some(value)
        }
        Err(e) => {
            warn!(tier = %tier, path = %path.display(), "Ignoring malformed config file: {}", e);
            None
        }
    }
}

/// The merged configuration and where it was read from.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Locations that were searched
    pub paths: ConfigPaths,
    config: Config,
    /// Highest-priority config file that contributed (if any)
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Discover the tiers and load them against the process environment.
    pub fn load() -> Result<Self> {
        Self::load_with_env(ConfigPaths::discover(), |key| std::env::var(key).ok())
    }

    /// Load configuration with explicit paths and the process environment.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        Self::load_with_env(paths, |key| std::env::var(key).ok())
    }

    /// Load configuration with explicit paths and an environment lookup.
    pub fn load_with_env(paths: ConfigPaths, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut configs: Vec<Value> = Vec::new();
        let mut config_path = None;

        configs.push(serde_json::to_value(Config::default())?);

        if let Some(ref explicit) = paths.explicit_file {
            // An explicit file must exist and parse.
            let content = std::fs::read_to_string(explicit)
                .with_context(|| format!("reading config file {}", explicit.display()))?;
            let value: Value = serde_yaml::from_str(&content)
                .with_context(|| format!("parsing config file {}", explicit.display()))?;
            configs.push(value);
            config_path = Some(explicit.clone());
        } else {
            // project
            if let Some(ref project_dir) = paths.project_dir {
                let file = project_dir.join(CONFIG_FILE);
                if let Some(value) = read_tier(&file, ConfigTier::Project) {
                    configs.push(value);
                    config_path = Some(file);
                }
            }

            // user
            if let Some(ref user_dir) = paths.user_dir {
                let file = user_dir.join(CONFIG_FILE);
                if let Some(value) = read_tier(&file, ConfigTier::User) {
                    configs.push(value);
                    config_path = Some(file);
                }
            }
        }

        let merged = deep_merge_all(configs);
        let mut config: Config = serde_json::from_value(merged)?;

        Self::apply_env_overrides(&mut config, env);

        Ok(Self {
            paths,
            config,
            config_path,
        })
    }

    /// Single-field overrides from `TASK_MANAGER_*`; bad values are skipped with a warning.
    fn apply_env_overrides(config: &mut Config, env: impl Fn(&str) -> Option<String>) {
        if let Some(db_path) = env("TASK_MANAGER_DB_PATH") {
            config.server.db_path = PathBuf::from(db_path);
        }

        if let Some(host) = env("TASK_MANAGER_HOST") {
            config.server.host = host;
        }

        if let Some(port) = env("TASK_MANAGER_PORT") {
            match port.parse() {
                Ok(port) => config.server.port = port,
                Err(_) => warn!(
                    tier = %ConfigTier::Environment,
                    "Ignoring invalid TASK_MANAGER_PORT: {}", port
                ),
            }
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    /// The highest-priority file that contributed, if any.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}
