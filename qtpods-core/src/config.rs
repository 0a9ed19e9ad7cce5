//! User configuration (`config.yaml`)
//!
//! Holds the catalog sources to search, how to invoke git, and how long a
//! catalog fetch may take. A missing file means defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default timeout for a single catalog fetch
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Branch checked out when updating a pod
pub const DEFAULT_PRIMARY_BRANCH: &str = "master";

const CONFIG_FILE: &str = "config.yaml";

/// How git is invoked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitSettings {
    /// Program name or absolute path of the git binary
    pub program: String,
    /// Branch to check out before pulling during an update
    pub primary_branch: String,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
            primary_branch: DEFAULT_PRIMARY_BRANCH.to_string(),
        }
    }
}

/// Contents of the configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PodsConfig {
    /// URLs of pod list documents
    pub sources: Vec<String>,
    pub git: GitSettings,
    /// Upper bound for one catalog fetch
    pub fetch_timeout_secs: u64,
    /// Never touch the network when listing available pods
    pub offline: bool,
}

impl Default for PodsConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            git: GitSettings::default(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            offline: false,
        }
    }
}

impl PodsConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Add a catalog source URL
    pub fn add_source(&mut self, url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            anyhow::bail!("Source URL must start with http:// or https://");
        }

        if self.sources.iter().any(|s| s == url) {
            anyhow::bail!("Source '{}' is already configured", url);
        }

        self.sources.push(url.to_string());
        Ok(())
    }

    /// Remove a catalog source URL
    pub fn remove_source(&mut self, url: &str) -> Result<()> {
        let initial_len = self.sources.len();
        self.sources.retain(|s| s != url);

        if self.sources.len() == initial_len {
            anyhow::bail!("Source '{}' not found", url);
        }

        Ok(())
    }
}

/// A configuration bound to the file it was loaded from
#[derive(Debug, Clone)]
pub struct ConfigStore {
    config: PodsConfig,
    path: PathBuf,
}

impl ConfigStore {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let path = Self::default_config_path()?;
        Self::load_from_path(path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: PathBuf) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_yaml_ng::from_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?
        } else {
            PodsConfig::default()
        };

        Ok(Self { config, path })
    }

    /// Save the current configuration
    pub fn save(&self) -> Result<()> {
        let content =
            serde_yaml_ng::to_string(&self.config).context("Failed to serialize config")?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write config: {}", self.path.display()))?;

        Ok(())
    }

    pub fn config(&self) -> &PodsConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut PodsConfig {
        &mut self.config
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn default_config_path() -> Result<PathBuf> {
        let config_dir = directories::ProjectDirs::from("", "", "qtpods")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .or_else(|| dirs::config_dir().map(|d| d.join("qtpods")))
            .context("Could not determine config directory")?;

        Ok(config_dir.join(CONFIG_FILE))
    }
}
