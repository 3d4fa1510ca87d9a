use cron::Schedule;
use riveer_graph::Graph;
use riveer_node::NodeKind;
use serde_json::Value;
use tracing::warn;

use crate::error::CronError;
use crate::schedule::parse_schedule;

/// A cron-scheduled call into a Spring's `function`, validated against
/// the graph at construction time so a misconfigured pipeline is caught
/// at startup rather than the first time the schedule fires.
///
/// Grounded on `original_source/src/core/cron.py::CronTask`.
#[derive(Debug, Clone)]
pub struct CronTask {
  pub name: String,
  pub schedule: Schedule,
  pub args: Vec<Value>,
  pub output_ids: Vec<String>,
}

impl CronTask {
  pub fn new(
    graph: &Graph,
    source_name: &str,
    task_name: &str,
    task_schedule: &str,
    args: Vec<Value>,
    output_ids: Vec<String>,
  ) -> Result<Self, CronError> {
    let name = format!("spring-{source_name}-{task_name}-schedule");
    let schedule = parse_schedule(task_schedule)?;

    for output_id in &output_ids {
      check_pipeline(graph, output_id, &[format!("{source_name}/{task_name}")])?;
    }

    Ok(CronTask {
      name,
      schedule,
      args,
      output_ids,
    })
  }
}

/// Walks the downstream graph from `node_id`, failing if any node in
/// the path is missing, is a Spring (which can't accept pipeline
/// input), or loops back onto a node already in `stack`.
///
/// Mirrors `CronTask.check_pipeline` almost line for line.
fn check_pipeline(graph: &Graph, node_id: &str, stack: &[String]) -> Result<(), CronError> {
  if stack.iter().any(|s| s == node_id) {
    let mut path = stack.to_vec();
    path.push(node_id.to_string());
    return Err(CronError::Cycle { path });
  }

  let node = graph.get(node_id).ok_or_else(|| {
    let mut path = stack.to_vec();
    path.push(node_id.to_string());
    CronError::MissingNode {
      node: node_id.to_string(),
      path,
    }
  })?;

  if node.kind() == NodeKind::Spring {
    let mut path = stack.to_vec();
    path.push(node_id.to_string());
    return Err(CronError::NotReader {
      node: node_id.to_string(),
      path,
    });
  }

  let outputs = node.output_ids().unwrap_or_default();
  if outputs.is_empty() {
    warn!(node = %node_id, "node can write but has no output nodes defined");
  }

  let mut next_stack = stack.to_vec();
  next_stack.push(node_id.to_string());
  for output_id in &outputs {
    check_pipeline(graph, output_id, &next_stack)?;
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use riveer_node::{BaseNode, DeltaNode, FlowNode, GraphNode, NodeError, Payload};
  use serde_json::json;
  use std::sync::Arc;

  struct StubDelta(&'static str);
  impl BaseNode for StubDelta {
    fn name(&self) -> &str {
      self.0
    }
    fn kind(&self) -> NodeKind {
      NodeKind::Delta
    }
    fn function(&self, _d: Payload, _a: &[Value]) -> Result<Option<Payload>, NodeError> {
      Ok(None)
    }
  }
  impl DeltaNode for StubDelta {}

  struct StubFlow {
    name: &'static str,
    outputs: Vec<String>,
  }
  impl BaseNode for StubFlow {
    fn name(&self) -> &str {
      self.name
    }
    fn kind(&self) -> NodeKind {
      NodeKind::Flow
    }
    fn function(&self, _d: Payload, _a: &[Value]) -> Result<Option<Payload>, NodeError> {
      Ok(None)
    }
  }
  impl FlowNode for StubFlow {
    fn output_ids(&self) -> Vec<String> {
      self.outputs.clone()
    }
  }

  struct StubSpring(&'static str);
  impl BaseNode for StubSpring {
    fn name(&self) -> &str {
      self.0
    }
    fn kind(&self) -> NodeKind {
      NodeKind::Spring
    }
    fn function(&self, _d: Payload, _a: &[Value]) -> Result<Option<Payload>, NodeError> {
      Ok(None)
    }
  }
  impl riveer_node::SpringNode for StubSpring {
    fn periodic_tasks(&self) -> Vec<riveer_node::PeriodicTaskSpec> {
      Vec::new()
    }
  }

  #[test]
  fn valid_single_hop_pipeline_succeeds() {
    let graph = Graph::new();
    graph
      .register("d".into(), GraphNode::Delta(Arc::new(StubDelta("d"))))
      .unwrap();

    let task = CronTask::new(&graph, "s", "query", "*/5 * * * *", vec![json!("select 1")], vec!["d".into()]).unwrap();
    assert_eq!(task.output_ids, vec!["d".to_string()]);
  }

  #[test]
  fn missing_downstream_node_is_rejected() {
    let graph = Graph::new();
    let err = CronTask::new(&graph, "s", "query", "* * * * *", vec![], vec!["ghost".into()]).unwrap_err();
    assert!(matches!(err, CronError::MissingNode { .. }));
  }

  #[test]
  fn cycle_back_to_spring_own_task_is_rejected() {
    let graph = Graph::new();
    graph
      .register(
        "a".into(),
        GraphNode::Flow(Arc::new(StubFlow {
          name: "a",
          outputs: vec!["b".into()],
        })),
      )
      .unwrap();
    graph
      .register(
        "b".into(),
        GraphNode::Flow(Arc::new(StubFlow {
          name: "b",
          outputs: vec!["a".into()],
        })),
      )
      .unwrap();

    let err = CronTask::new(&graph, "s", "t", "* * * * *", vec![], vec!["a".into()]).unwrap_err();
    assert!(matches!(err, CronError::Cycle { .. }));
  }

  #[test]
  fn downstream_spring_is_rejected_as_not_a_reader() {
    let graph = Graph::new();
    graph
      .register("sp".into(), GraphNode::Spring(Arc::new(StubSpring("sp"))))
      .unwrap();

    let err = CronTask::new(&graph, "s", "t", "* * * * *", vec![], vec!["sp".into()]).unwrap_err();
    assert!(matches!(err, CronError::NotReader { .. }));
  }
}
