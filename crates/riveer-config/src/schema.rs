use serde_json::{Map, Value};

use crate::coerce::{expand_env, to_lowercase};
use crate::error::ConfigError;

/// The shape a single field's value is coerced into and validated
/// against, mirroring the set of target types the original's
/// `voluptuous` schemas (and `fuschia_runtime::input::SchemaType`) coerce
/// resolved strings into.
#[derive(Debug, Clone)]
pub enum FieldKind {
  String,
  Integer,
  Number,
  Boolean,
  Enum(Vec<String>),
  List(Box<FieldKind>),
  Object(Schema),
  /// A mapping with arbitrary keys, each value validated against the
  /// same inner kind (e.g. the HTTP delta's free-form `headers` map).
  Map(Box<FieldKind>),
  Any,
}

/// A single field of a config object.
#[derive(Debug, Clone)]
pub struct Field {
  pub key: &'static str,
  pub kind: FieldKind,
  pub required: bool,
  pub default: Option<Value>,
  /// Lowercase the coerced string value (`LowerVal` in the original).
  pub lowercase: bool,
  /// Expand `$VAR`/`${VAR}` references before coercion (`EnvStr`).
  pub env_expand: bool,
  /// Minimum element count for `List` fields (`Length(min=...)`).
  pub min_len: Option<usize>,
}

impl Field {
  pub const fn new(key: &'static str, kind: FieldKind) -> Self {
    Field {
      key,
      kind,
      required: true,
      default: None,
      lowercase: false,
      env_expand: false,
      min_len: None,
    }
  }

  pub const fn optional(mut self, default: Value) -> Self {
    self.required = false;
    self.default = Some(default);
    self
  }

  pub const fn lowercase(mut self) -> Self {
    self.lowercase = true;
    self
  }

  pub const fn env(mut self) -> Self {
    self.env_expand = true;
    self
  }

  pub const fn min_len(mut self, min: usize) -> Self {
    self.min_len = Some(min);
    self
  }
}

/// An object schema: an ordered set of fields.
#[derive(Debug, Clone, Default)]
pub struct Schema(pub Vec<Field>);

impl Schema {
  pub fn new(fields: Vec<Field>) -> Self {
    Schema(fields)
  }

  /// Validates and coerces a raw JSON object against this schema,
  /// returning a new object with every field normalized.
  pub fn validate(&self, value: &Value, path: &str) -> Result<Value, ConfigError> {
    let obj = value.as_object().ok_or_else(|| ConfigError::WrongType {
      path: path.to_string(),
      message: "expected an object".to_string(),
    })?;

    let mut out = Map::new();
    for field in &self.0 {
      let field_path = format!("{path}.{}", field.key);
      match obj.get(field.key) {
        Some(v) => {
          out.insert(
            field.key.to_string(),
            coerce_field(field, v, &field_path)?,
          );
        }
        None => {
          if field.required {
            return Err(ConfigError::Missing { path: field_path });
          }
          out.insert(
            field.key.to_string(),
            field.default.clone().unwrap_or(Value::Null),
          );
        }
      }
    }

    Ok(Value::Object(out))
  }
}

fn coerce_field(field: &Field, value: &Value, path: &str) -> Result<Value, ConfigError> {
  let coerced = coerce_kind(&field.kind, value, path)?;

  let coerced = if field.env_expand {
    match coerced {
      Value::String(s) => Value::String(expand_env(&s)),
      other => other,
    }
  } else {
    coerced
  };

  let coerced = if field.lowercase {
    match coerced {
      Value::String(s) => Value::String(to_lowercase(&s)),
      other => other,
    }
  } else {
    coerced
  };

  if let (FieldKind::List(_), Some(min)) = (&field.kind, field.min_len) {
    let len = coerced.as_array().map(|a| a.len()).unwrap_or(0);
    if len < min {
      return Err(ConfigError::TooShort {
        path: path.to_string(),
        min,
      });
    }
  }

  Ok(coerced)
}

fn coerce_kind(kind: &FieldKind, value: &Value, path: &str) -> Result<Value, ConfigError> {
  match kind {
    FieldKind::Any => Ok(value.clone()),
    FieldKind::String => Ok(Value::String(stringify(value))),
    FieldKind::Integer => coerce_integer(value, path),
    FieldKind::Number => coerce_number(value, path),
    FieldKind::Boolean => coerce_boolean(value, path),
    FieldKind::Enum(allowed) => {
      let s = stringify(value).to_lowercase();
      if allowed.iter().any(|a| a == &s) {
        Ok(Value::String(s))
      } else {
        Err(ConfigError::NotInEnum {
          path: path.to_string(),
          allowed: allowed.clone(),
          actual: s,
        })
      }
    }
    FieldKind::List(inner) => {
      let arr = value.as_array().ok_or_else(|| ConfigError::WrongType {
        path: path.to_string(),
        message: "expected an array".to_string(),
      })?;
      let mut out = Vec::with_capacity(arr.len());
      for (i, item) in arr.iter().enumerate() {
        out.push(coerce_kind(inner, item, &format!("{path}[{i}]"))?);
      }
      Ok(Value::Array(out))
    }
    FieldKind::Object(schema) => schema.validate(value, path),
    FieldKind::Map(inner) => {
      let obj = value.as_object().ok_or_else(|| ConfigError::WrongType {
        path: path.to_string(),
        message: "expected a mapping".to_string(),
      })?;
      let mut out = Map::new();
      for (key, item) in obj {
        out.insert(key.clone(), coerce_kind(inner, item, &format!("{path}.{key}"))?);
      }
      Ok(Value::Object(out))
    }
  }
}

fn stringify(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    Value::Number(n) => n.to_string(),
    Value::Bool(b) => b.to_string(),
    other => other.to_string(),
  }
}

fn coerce_integer(value: &Value, path: &str) -> Result<Value, ConfigError> {
  match value {
    Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
    Value::String(s) => s
      .trim()
      .parse::<i64>()
      .map(|n| Value::Number(n.into()))
      .map_err(|e| ConfigError::WrongType {
        path: path.to_string(),
        message: format!("'{s}' is not an integer: {e}"),
      }),
    other => Err(ConfigError::WrongType {
      path: path.to_string(),
      message: format!("expected an integer, got {other}"),
    }),
  }
}

fn coerce_number(value: &Value, path: &str) -> Result<Value, ConfigError> {
  match value {
    Value::Number(_) => Ok(value.clone()),
    Value::String(s) => s
      .trim()
      .parse::<f64>()
      .ok()
      .and_then(serde_json::Number::from_f64)
      .map(Value::Number)
      .ok_or_else(|| ConfigError::WrongType {
        path: path.to_string(),
        message: format!("'{s}' is not a number"),
      }),
    other => Err(ConfigError::WrongType {
      path: path.to_string(),
      message: format!("expected a number, got {other}"),
    }),
  }
}

fn coerce_boolean(value: &Value, path: &str) -> Result<Value, ConfigError> {
  match value {
    Value::Bool(b) => Ok(Value::Bool(*b)),
    Value::String(s) => match s.to_lowercase().as_str() {
      "true" | "1" | "yes" => Ok(Value::Bool(true)),
      "false" | "0" | "no" => Ok(Value::Bool(false)),
      other => Err(ConfigError::WrongType {
        path: path.to_string(),
        message: format!("'{other}' is not a boolean"),
      }),
    },
    other => Err(ConfigError::WrongType {
      path: path.to_string(),
      message: format!("expected a boolean, got {other}"),
    }),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn missing_required_field_reports_dotted_path() {
    let schema = Schema::new(vec![Field::new("dbname", FieldKind::String)]);
    let err = schema.validate(&json!({}), "connection").unwrap_err();
    assert_eq!(err.to_string(), "field 'connection.dbname' is required");
  }

  #[test]
  fn optional_field_uses_default_when_absent() {
    let schema = Schema::new(vec![
      Field::new("timeout", FieldKind::Integer).optional(json!(60)),
    ]);
    let out = schema.validate(&json!({}), "tasks[0]").unwrap();
    assert_eq!(out["timeout"], json!(60));
  }

  #[test]
  fn coerces_numeric_string_to_integer() {
    let schema = Schema::new(vec![Field::new("port", FieldKind::Integer)]);
    let out = schema.validate(&json!({"port": "5432"}), "connection").unwrap();
    assert_eq!(out["port"], json!(5432));
  }

  #[test]
  fn rejects_enum_value_outside_allowed_set() {
    let schema = Schema::new(vec![Field::new(
      "pipe",
      FieldKind::Enum(vec!["spring".into(), "flow".into(), "delta".into()]),
    )]);
    let err = schema
      .validate(&json!({"pipe": "sink"}), "configuration")
      .unwrap_err();
    assert!(matches!(err, ConfigError::NotInEnum { .. }));
  }

  #[test]
  fn enum_values_are_lowercased_before_comparison() {
    let schema = Schema::new(vec![Field::new(
      "pipe",
      FieldKind::Enum(vec!["spring".into()]),
    )]);
    let out = schema
      .validate(&json!({"pipe": "SPRING"}), "configuration")
      .unwrap();
    assert_eq!(out["pipe"], json!("spring"));
  }

  #[test]
  fn list_below_min_length_is_rejected() {
    let schema = Schema::new(vec![
      Field::new("outputs", FieldKind::List(Box::new(FieldKind::String))).min_len(1),
    ]);
    let err = schema
      .validate(&json!({"outputs": []}), "processing")
      .unwrap_err();
    assert!(matches!(err, ConfigError::TooShort { .. }));
  }

  #[test]
  fn env_expand_substitutes_environment_variables() {
    // SAFETY: test runs single-threaded within the schema test module.
    unsafe {
      std::env::set_var("RIVEER_TEST_DBNAME", "orders");
    }
    let schema = Schema::new(vec![Field::new("dbname", FieldKind::String).env()]);
    let out = schema
      .validate(&json!({"dbname": "$RIVEER_TEST_DBNAME"}), "connection")
      .unwrap();
    assert_eq!(out["dbname"], json!("orders"));
  }

  #[test]
  fn map_field_validates_each_value_against_the_inner_kind() {
    let schema = Schema::new(vec![
      Field::new("headers", FieldKind::Map(Box::new(FieldKind::String)))
        .optional(json!({})),
    ]);
    let out = schema
      .validate(&json!({"headers": {"X-Api-Key": "abc", "X-Request-Id": 7}}), "connection")
      .unwrap();
    assert_eq!(out["headers"]["X-Api-Key"], json!("abc"));
    assert_eq!(out["headers"]["X-Request-Id"], json!("7"));
  }

  #[test]
  fn map_field_rejects_non_object_value() {
    let schema = Schema::new(vec![Field::new(
      "headers",
      FieldKind::Map(Box::new(FieldKind::String)),
    )]);
    let err = schema.validate(&json!({"headers": [1, 2]}), "connection").unwrap_err();
    assert!(matches!(err, ConfigError::WrongType { .. }));
  }

  #[test]
  fn nested_object_schema_validates_recursively() {
    let schema = Schema::new(vec![Field::new(
      "connection",
      FieldKind::Object(Schema::new(vec![Field::new("host", FieldKind::String)])),
    )]);
    let err = schema
      .validate(&json!({"connection": {}}), "")
      .unwrap_err();
    assert_eq!(err.to_string(), "field '.connection.host' is required");
  }
}
