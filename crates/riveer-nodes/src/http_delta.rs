use std::sync::Arc;

use reqwest::blocking::Client;
use riveer_config::{Field, FieldKind, Schema};
use riveer_node::{BaseNode, DeltaNode, GraphNode, NodeError, NodeKind, Payload};
use riveer_registry::RegistryError;
use serde_json::Value;

/// Sends the payload it receives as a JSON body to a configured HTTP
/// endpoint, optionally with basic auth and a fixed set of extra
/// headers.
///
/// Grounded on `original_source/.../extensions/deltas/http.py`
/// (`BasicHTTP`) and `fuschia-host-http`'s use of
/// `reqwest`. Uses `reqwest::blocking::Client` rather than the async
/// client for the same reason the array batcher uses `std::thread`:
/// this node's function is a synchronous call dispatched onto a
/// blocking worker thread by the broker, not an async task.
pub struct HttpDelta {
  name: String,
  endpoint: String,
  method: reqwest::Method,
  headers: Vec<(String, String)>,
  allowed_responses: Vec<u16>,
  timeout_seconds: u64,
  basic_auth: Option<(String, String)>,
  client: Client,
}

fn config_schema() -> Schema {
  Schema::new(vec![
    Field::new(
      "connection",
      FieldKind::Object(Schema::new(vec![
        Field::new("endpoint", FieldKind::String).env(),
        Field::new(
          "auth",
          FieldKind::Object(Schema::new(vec![
            Field::new("username", FieldKind::String).env(),
            Field::new("password", FieldKind::String).env(),
          ])),
        )
        .optional(Value::Null),
        Field::new(
          "method",
          FieldKind::Enum(vec!["get".into(), "post".into(), "put".into(), "delete".into()]),
        )
        .lowercase()
        .optional(Value::String("post".into())),
        Field::new("allowed_responses", FieldKind::List(Box::new(FieldKind::Integer)))
          .optional(Value::Array(vec![Value::from(200)])),
        Field::new("headers", FieldKind::Map(Box::new(FieldKind::String)))
          .optional(Value::Object(Default::default())),
      ])),
    ),
    Field::new(
      "processing",
      FieldKind::Object(Schema::new(vec![
        Field::new("timeout", FieldKind::Integer).optional(Value::from(60)),
      ])),
    ),
  ])
}

impl HttpDelta {
  pub fn from_configuration(config: &Value) -> Result<Self, RegistryError> {
    let validated = config_schema()
      .validate(config, "http")
      .map_err(|e| RegistryError::Construction {
        type_id: "http".to_string(),
        message: e.to_string(),
      })?;

    let name = config
      .get("configuration")
      .and_then(|c| c.get("name"))
      .and_then(|n| n.as_str())
      .unwrap_or("http")
      .to_string();

    let conn = &validated["connection"];
    let endpoint = conn["endpoint"].as_str().unwrap_or_default().to_string();
    let method = match conn["method"].as_str().unwrap_or("post") {
      "get" => reqwest::Method::GET,
      "put" => reqwest::Method::PUT,
      "delete" => reqwest::Method::DELETE,
      _ => reqwest::Method::POST,
    };
    let allowed_responses = conn["allowed_responses"]
      .as_array()
      .cloned()
      .unwrap_or_default()
      .into_iter()
      .filter_map(|v| v.as_i64())
      .map(|v| v as u16)
      .collect();
    let basic_auth = conn.get("auth").and_then(|a| a.as_object()).map(|a| {
      (
        a.get("username").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
        a.get("password").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
      )
    });
    let headers = conn
      .get("headers")
      .and_then(|h| h.as_object())
      .map(|h| {
        h.iter()
          .map(|(k, v)| (k.clone(), v.as_str().unwrap_or_default().to_string()))
          .collect()
      })
      .unwrap_or_default();

    let timeout_seconds = validated["processing"]["timeout"].as_u64().unwrap_or(60);

    Ok(HttpDelta {
      name,
      endpoint,
      method,
      headers,
      allowed_responses,
      timeout_seconds,
      basic_auth,
      client: Client::new(),
    })
  }

  pub fn build_node(config: &Value) -> Result<GraphNode, RegistryError> {
    Ok(GraphNode::Delta(Arc::new(Self::from_configuration(
      config,
    )?)))
  }
}

impl BaseNode for HttpDelta {
  fn name(&self) -> &str {
    &self.name
  }

  fn kind(&self) -> NodeKind {
    NodeKind::Delta
  }

  fn function(&self, data: Payload, _args: &[Value]) -> Result<Option<Payload>, NodeError> {
    let body: Value = data.into();

    let mut request = self
      .client
      .request(self.method.clone(), &self.endpoint)
      .json(&body)
      .timeout(std::time::Duration::from_secs(self.timeout_seconds));

    for (key, value) in &self.headers {
      request = request.header(key, value);
    }
    if let Some((user, pass)) = &self.basic_auth {
      request = request.basic_auth(user, Some(pass));
    }

    let response = request.send().map_err(|e| NodeError::Function {
      name: self.name.clone(),
      message: e.to_string(),
    })?;

    let status = response.status().as_u16();
    if !self.allowed_responses.contains(&status) {
      return Err(NodeError::Function {
        name: self.name.clone(),
        message: format!("HTTP request failed with status code {status}"),
      });
    }

    Ok(None)
  }
}

impl DeltaNode for HttpDelta {}
