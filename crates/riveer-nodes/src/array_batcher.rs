use std::sync::{Arc, Mutex};
use std::time::Duration;

use riveer_config::{Field, FieldKind, Schema};
use riveer_node::{BaseNode, FlowNode, GraphNode, NodeError, NodeKind, Payload};
use riveer_registry::RegistryError;
use serde_json::{Map, Value};

/// Coalesces every record it receives within a time window into a
/// single downstream send. The first caller in a window sleeps out the
/// window and flushes the buffer; callers that arrive while a flush is
/// already in flight just deposit their records and return `None`.
///
/// Grounded directly on
/// `original_source/.../extensions/flows/simple_array_batcher.py`. The
/// sleep here is a real `std::thread::sleep` under a `std::sync::Mutex`
/// on purpose: this node's suspension must be genuine OS-thread
/// blocking, not a cooperative `tokio::time::sleep` yield, so the
/// broker's `spawn_blocking` dispatch actually ties up a worker thread
/// for the whole window the way the concurrency model expects.
pub struct ArrayBatcher {
  name: String,
  outputs: Vec<String>,
  timeframe_seconds: u64,
  state: Mutex<BatcherState>,
}

struct BatcherState {
  buffer: Vec<Map<String, Value>>,
  is_batching: bool,
}

fn config_schema() -> Schema {
  Schema::new(vec![Field::new(
    "processing",
    FieldKind::Object(Schema::new(vec![
      Field::new("outputs", FieldKind::List(Box::new(FieldKind::String))).min_len(1),
      Field::new("timeframe", FieldKind::Integer).optional(Value::from(5)),
    ])),
  )])
}

impl ArrayBatcher {
  pub fn from_configuration(config: &Value) -> Result<Self, RegistryError> {
    let validated = config_schema()
      .validate(config, "array_batcher")
      .map_err(|e| RegistryError::Construction {
        type_id: "array_batcher".to_string(),
        message: e.to_string(),
      })?;

    let name = config
      .get("configuration")
      .and_then(|c| c.get("name"))
      .and_then(|n| n.as_str())
      .unwrap_or("array_batcher")
      .to_string();

    let processing = &validated["processing"];
    let outputs = processing["outputs"]
      .as_array()
      .cloned()
      .unwrap_or_default()
      .into_iter()
      .filter_map(|v| v.as_str().map(str::to_string))
      .collect();
    let timeframe_seconds = processing["timeframe"].as_u64().unwrap_or(5);

    Ok(ArrayBatcher {
      name,
      outputs,
      timeframe_seconds,
      state: Mutex::new(BatcherState {
        buffer: Vec::new(),
        is_batching: false,
      }),
    })
  }

  pub fn build_node(config: &Value) -> Result<GraphNode, RegistryError> {
    Ok(GraphNode::Flow(Arc::new(Self::from_configuration(
      config,
    )?)))
  }
}

impl BaseNode for ArrayBatcher {
  fn name(&self) -> &str {
    &self.name
  }

  fn kind(&self) -> NodeKind {
    NodeKind::Flow
  }

  fn function(&self, data: Payload, _args: &[Value]) -> Result<Option<Payload>, NodeError> {
    let mut incoming = data.into_records();

    {
      let mut state = self.state.lock().expect("batcher lock poisoned");
      state.buffer.append(&mut incoming);

      if state.is_batching {
        return Ok(None);
      }
      state.is_batching = true;
    }

    std::thread::sleep(Duration::from_secs(self.timeframe_seconds));

    let finished = {
      let mut state = self.state.lock().expect("batcher lock poisoned");
      let finished = std::mem::take(&mut state.buffer);
      state.is_batching = false;
      finished
    };

    Ok(Some(Payload::Sequence(finished)))
  }
}

impl FlowNode for ArrayBatcher {
  fn output_ids(&self) -> Vec<String> {
    self.outputs.clone()
  }
}
