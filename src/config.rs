use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Students requested per page
  pub page_size: usize,
  /// Simulated network latency of the data source, in milliseconds
  pub latency_ms: u64,
  /// Seed for course enrollment; random per run if not set
  pub seed: Option<u64>,
  /// Rows from the bottom of the list at which the next page is requested
  pub end_threshold: usize,
  pub cache: CacheConfig,
  /// Directory for log files (defaults to the data directory)
  pub log_dir: Option<PathBuf>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      page_size: 10,
      latency_ms: 1000,
      seed: None,
      end_threshold: 2,
      cache: CacheConfig::default(),
      log_dir: None,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// Persist fetched students between runs
  pub enabled: bool,
  /// Database file (defaults to $XDG_DATA_HOME/roster/cache.db)
  pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      path: None,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./roster.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/roster/config.yaml
  ///
  /// Without any file the defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Self::default(),
    };
    config.validate()?;
    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("roster.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("roster").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    // An empty file deserializes as null
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(contents).map_err(|e| eyre!("{}", e))
  }

  pub fn validate(&self) -> Result<()> {
    if self.page_size == 0 {
      return Err(eyre!("page_size must be at least 1"));
    }
    Ok(())
  }

  pub fn latency(&self) -> Duration {
    Duration::from_millis(self.latency_ms)
  }

  /// Directory log files are written to.
  pub fn log_dir(&self) -> Result<PathBuf> {
    if let Some(dir) = &self.log_dir {
      return Ok(dir.clone());
    }
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("roster").join("logs"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.page_size, 10);
    assert_eq!(config.latency(), Duration::from_secs(1));
    assert!(config.cache.enabled);
    assert!(config.seed.is_none());
  }

  #[test]
  fn test_partial_file_keeps_defaults() {
    let config = Config::parse("page_size: 25\ncache:\n  enabled: false\n").unwrap();
    assert_eq!(config.page_size, 25);
    assert_eq!(config.latency_ms, 1000);
    assert!(!config.cache.enabled);
    assert!(config.cache.path.is_none());
  }

  #[test]
  fn test_empty_file_is_default() {
    let config = Config::parse("  \n").unwrap();
    assert_eq!(config.page_size, 10);
  }

  #[test]
  fn test_zero_page_size_rejected() {
    let config = Config::parse("page_size: 0").unwrap();
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_explicit_missing_path_is_error() {
    let err = Config::load(Some(Path::new("/nonexistent/roster.yaml"))).unwrap_err();
    assert!(err.to_string().contains("not found"));
  }

  #[test]
  fn test_load_from_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.yaml");
    std::fs::write(&path, "latency_ms: 0\nseed: 9\nend_threshold: 4\n").unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.latency(), Duration::ZERO);
    assert_eq!(config.seed, Some(9));
    assert_eq!(config.end_threshold, 4);
  }
}
