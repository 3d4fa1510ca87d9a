use std::path::Path;

use serde_json::Value;

use crate::error::ConfigError;

/// A single config file, parsed but not yet schema-validated.
#[derive(Debug, Clone)]
pub struct RawConfig {
  pub default_name: String,
  pub value: Value,
}

/// Loads every YAML file in `folder` into a [`RawConfig`], mirroring
/// `AppController._load_configurations`'s directory scan.
pub fn load_configs(folder: &Path) -> Result<Vec<RawConfig>, ConfigError> {
  let entries = std::fs::read_dir(folder).map_err(|e| ConfigError::Io {
    folder: folder.display().to_string(),
    message: e.to_string(),
  })?;

  let mut configs = Vec::new();
  for entry in entries {
    let entry = entry.map_err(|e| ConfigError::Io {
      folder: folder.display().to_string(),
      message: e.to_string(),
    })?;
    let path = entry.path();
    if !path.is_file() {
      continue;
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::Parse {
      file: path.display().to_string(),
      message: e.to_string(),
    })?;

    let value: Value = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
      file: path.display().to_string(),
      message: e.to_string(),
    })?;

    let default_name = path
      .file_stem()
      .and_then(|s| s.to_str())
      .unwrap_or("unnamed")
      .to_string();

    configs.push(RawConfig {
      default_name,
      value,
    });
  }

  Ok(configs)
}
