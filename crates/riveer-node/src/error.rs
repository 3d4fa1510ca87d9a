use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
  #[error("node '{name}' failed to connect: {message}")]
  Connect { name: String, message: String },

  #[error("node '{name}' function failed: {message}")]
  Function { name: String, message: String },

  #[error("node '{name}' failed to shut down cleanly: {message}")]
  Shutdown { name: String, message: String },

  #[error("node '{name}' panicked during function execution")]
  Panicked { name: String },
}
