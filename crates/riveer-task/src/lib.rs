//! Wraps a node's `function` call with logging and panic containment.

use std::panic::{self, AssertUnwindSafe};

use riveer_node::{GraphNode, NodeError, Payload};
use serde_json::Value;
use tracing::{error, info, instrument};

/// Runs `node.function(data, args)`, logging start/success/failure and
/// catching any panic raised by the node implementation so a single
/// bad node can't take down the broker worker running it.
///
/// Grounded on `_task_wrapper` in the original (log, call, catch any
/// exception, never propagate) and on `TaskExecutor::execute`
/// (start/outcome `tracing` spans). A task
/// failure here is non-fatal by design: it's logged and swallowed, not
/// returned as an error, since no downstream node should run when its
/// input never materialized and no caller is waiting synchronously on
/// the result.
#[instrument(skip(node, data, args), fields(node = %node.name()))]
pub fn run_task(node: &GraphNode, data: Payload, args: &[Value]) -> Option<Payload> {
  info!("running task");

  let outcome = panic::catch_unwind(AssertUnwindSafe(|| node.function(data, args)));

  match outcome {
    Ok(Ok(result)) => {
      info!("task completed");
      result
    }
    Ok(Err(e)) => {
      log_failure(node, &e);
      None
    }
    Err(_) => {
      let panicked = NodeError::Panicked {
        name: node.name().to_string(),
      };
      log_failure(node, &panicked);
      None
    }
  }
}

fn log_failure(node: &GraphNode, err: &NodeError) {
  error!(node = %node.name(), error = %err, "task failed to execute");
}

#[cfg(test)]
mod tests {
  use super::*;
  use riveer_node::{BaseNode, DeltaNode, NodeKind};
  use serde_json::{Map, json};
  use std::sync::Arc;

  struct Ok1;
  impl BaseNode for Ok1 {
    fn name(&self) -> &str {
      "ok1"
    }
    fn kind(&self) -> NodeKind {
      NodeKind::Delta
    }
    fn function(&self, data: Payload, _args: &[Value]) -> Result<Option<Payload>, NodeError> {
      Ok(Some(data))
    }
  }
  impl DeltaNode for Ok1 {}

  struct Panics;
  impl BaseNode for Panics {
    fn name(&self) -> &str {
      "panics"
    }
    fn kind(&self) -> NodeKind {
      NodeKind::Delta
    }
    fn function(&self, _data: Payload, _args: &[Value]) -> Result<Option<Payload>, NodeError> {
      panic!("boom");
    }
  }
  impl DeltaNode for Panics {}

  struct Fails;
  impl BaseNode for Fails {
    fn name(&self) -> &str {
      "fails"
    }
    fn kind(&self) -> NodeKind {
      NodeKind::Delta
    }
    fn function(&self, _data: Payload, _args: &[Value]) -> Result<Option<Payload>, NodeError> {
      Err(NodeError::Function {
        name: "fails".into(),
        message: "nope".into(),
      })
    }
  }
  impl DeltaNode for Fails {}

  #[test]
  fn successful_task_returns_result() {
    let node = GraphNode::Delta(Arc::new(Ok1));
    let data = Payload::Record(Map::new());
    let result = run_task(&node, data.clone(), &[]);
    assert_eq!(result, Some(data));
  }

  #[test]
  fn panicking_node_is_contained_and_returns_none() {
    let node = GraphNode::Delta(Arc::new(Panics));
    let result = run_task(&node, Payload::Record(Map::new()), &[json!(1)]);
    assert_eq!(result, None);
  }

  #[test]
  fn failing_node_is_contained_and_returns_none() {
    let node = GraphNode::Delta(Arc::new(Fails));
    let result = run_task(&node, Payload::Record(Map::new()), &[]);
    assert_eq!(result, None);
  }
}
