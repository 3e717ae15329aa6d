//! Configuration and on-disk layout for a Hindsight desk

use anyhow::{anyhow, Context, Result};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::retrieval::DEFAULT_TOP_K;

pub const CONFIG_FILE: &str = "hindsight.yaml";
pub const OPEN_TICKETS_FILE: &str = "open.json";
pub const HISTORY_FILE: &str = "history.json";
pub const RESOLVED_LOG_FILE: &str = "resolved.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
  /// Similar tickets retrieved per suggestion
  #[serde(default = "default_top_k")]
  pub top_k: usize,
  /// Agent recorded on resolutions that don't name one
  #[serde(default)]
  pub agent_name: Option<String>,
  /// Rebuild the similarity index after each resolution
  #[serde(default)]
  pub reindex_on_resolve: bool,
  /// Include the resolved log alongside history in the corpus
  #[serde(default = "default_true")]
  pub corpus_includes_resolved_log: bool,
}

fn default_top_k() -> usize {
  DEFAULT_TOP_K
}

fn default_true() -> bool {
  true
}

impl Default for Config {
  fn default() -> Self {
    Self {
      top_k: default_top_k(),
      agent_name: None,
      reindex_on_resolve: false,
      corpus_includes_resolved_log: default_true(),
    }
  }
}

impl Config {
  pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
    let path = path.as_ref();
    let content =
      fs::read_to_string(path).with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&content)
      .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    Ok(config)
  }

  /// Load `hindsight.yaml` from the data directory, or defaults when absent
  pub fn load(data_dir: &Path) -> Result<Self> {
    let path = data_dir.join(CONFIG_FILE);
    if path.exists() {
      Self::load_from_file(path)
    } else {
      Ok(Self::default())
    }
  }

  pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
    let path = path.as_ref();
    let content = serde_yaml::to_string(self)?;
    fs::write(path, content).with_context(|| format!("Failed to write config: {}", path.display()))?;
    Ok(())
  }
}

/// Data directory (~/.hindsight), overridable with HINDSIGHT_HOME
pub fn get_data_dir() -> Result<PathBuf> {
  if let Ok(custom_root) = std::env::var("HINDSIGHT_HOME") {
    return Ok(PathBuf::from(custom_root));
  }

  let home = home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
  Ok(home.join(".hindsight"))
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn test_missing_file_gives_defaults() {
    let temp = TempDir::new().unwrap();
    let config = Config::load(temp.path()).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.top_k, 3);
    assert!(config.corpus_includes_resolved_log);
  }

  #[test]
  fn test_partial_file_fills_defaults() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(CONFIG_FILE), "top_k: 5\nagent_name: Robin\n").unwrap();

    let config = Config::load(temp.path()).unwrap();
    assert_eq!(config.top_k, 5);
    assert_eq!(config.agent_name.as_deref(), Some("Robin"));
    assert!(!config.reindex_on_resolve);
  }

  #[test]
  fn test_save_round_trip() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(CONFIG_FILE);
    let config = Config { top_k: 7, reindex_on_resolve: true, ..Config::default() };

    config.save_to_file(&path).unwrap();
    assert_eq!(Config::load_from_file(&path).unwrap(), config);
  }

  #[test]
  fn test_invalid_yaml_is_reported() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(CONFIG_FILE), "top_k: [oops").unwrap();
    assert!(Config::load(temp.path()).is_err());
  }
}
