use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
  #[error("node of type `{0}` is invalid")]
  InvalidPipeType(String),

  #[error("node of name `{0}` is unknown")]
  UnknownNodeType(String),

  #[error("extension with same id already exists for pipe `{pipe}`: `{type_id}`")]
  DuplicateFactory { pipe: String, type_id: String },

  #[error("node construction for `{type_id}` failed: {message}")]
  Construction { type_id: String, message: String },
}
