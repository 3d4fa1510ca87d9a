use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
  #[error("node of name '{0}' already exists")]
  DuplicateNode(String),

  #[error("node of name '{0}' is unknown")]
  NodeNotFound(String),
}
