use serde_json::Value;

use crate::error::ConfigError;
use crate::schema::{Field, FieldKind, Schema};

/// The `configuration` header every config file must carry, validated
/// before the node-specific schema runs.
#[derive(Debug, Clone)]
pub struct Header {
  pub pipe: String,
  pub node_type: String,
  pub name: String,
}

/// Builds the header schema, defaulting `name` to the config file's
/// stem — mirrors `AppController.get_header_schema`.
pub fn header_schema(default_name: &str) -> Schema {
  Schema::new(vec![
    Field::new(
      "pipe",
      FieldKind::Enum(vec!["spring".into(), "flow".into(), "delta".into()]),
    ),
    Field::new("type", FieldKind::String).lowercase(),
    Field::new("name", FieldKind::String)
      .lowercase()
      .optional(Value::String(default_name.to_string())),
  ])
}

/// Validates the `configuration` object of a raw config file.
pub fn validate_header(raw: &Value, default_name: &str) -> Result<Header, ConfigError> {
  let configuration = raw
    .get("configuration")
    .ok_or_else(|| ConfigError::Missing {
      path: "configuration".to_string(),
    })?;

  let validated = header_schema(default_name).validate(configuration, "configuration")?;

  Ok(Header {
    pipe: validated["pipe"].as_str().unwrap_or_default().to_string(),
    node_type: validated["type"].as_str().unwrap_or_default().to_string(),
    name: validated["name"].as_str().unwrap_or_default().to_string(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn defaults_name_to_provided_stem() {
    let raw = json!({"configuration": {"pipe": "spring", "type": "postgresql"}});
    let header = validate_header(&raw, "orders-db").unwrap();
    assert_eq!(header.name, "orders-db");
  }

  #[test]
  fn rejects_unknown_pipe_kind() {
    let raw = json!({"configuration": {"pipe": "sink", "type": "x"}});
    assert!(validate_header(&raw, "x").is_err());
  }
}
