use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("field '{path}' is required")]
  Missing { path: String },

  #[error("field '{path}' has the wrong type: {message}")]
  WrongType { path: String, message: String },

  #[error("field '{path}' must be one of {allowed:?}, got '{actual}'")]
  NotInEnum {
    path: String,
    allowed: Vec<String>,
    actual: String,
  },

  #[error("field '{path}' must have at least {min} element(s)")]
  TooShort { path: String, min: usize },

  #[error("failed to read config folder '{folder}': {message}")]
  Io { folder: String, message: String },

  #[error("failed to parse config file '{file}': {message}")]
  Parse { file: String, message: String },
}
