use std::collections::HashMap;
use std::sync::RwLock;

use riveer_node::{GraphNode, NodeKind};
use tracing::debug;

use crate::error::GraphError;

/// Holds every registered node by name and lets callers look nodes up
/// or enumerate them by kind.
///
/// Unlike `fuschia_workflow::Graph`, which builds a fixed
/// adjacency list once from a locked workflow's node set, this graph is
/// process-wide and grows incrementally as config files are loaded —
/// there's no single workflow run, only a permanent set of nodes.
#[derive(Default)]
pub struct Graph {
  nodes: RwLock<HashMap<String, GraphNode>>,
}

impl Graph {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers a new node under `name`. Mirrors `NodeGraph.register_node`.
  pub fn register(&self, name: String, node: GraphNode) -> Result<(), GraphError> {
    let mut nodes = self.nodes.write().expect("graph lock poisoned");
    if nodes.contains_key(&name) {
      return Err(GraphError::DuplicateNode(name));
    }
    debug!(node = %name, kind = node.kind().as_str(), "registered node");
    nodes.insert(name, node);
    Ok(())
  }

  pub fn get(&self, name: &str) -> Option<GraphNode> {
    self.nodes.read().expect("graph lock poisoned").get(name).cloned()
  }

  /// Returns the downstream node ids a reader node should send its
  /// result to. `None` if the node doesn't exist or is a Spring (which
  /// never accepts pipeline inputs).
  pub fn output_ids(&self, name: &str) -> Option<Vec<String>> {
    self.get(name).and_then(|n| n.output_ids())
  }

  /// Iterates over every node of any of the given kinds, in
  /// registration order being not guaranteed (hash map backed).
  pub fn nodes_of_kind(&self, kinds: &[NodeKind]) -> Vec<(String, GraphNode)> {
    self
      .nodes
      .read()
      .expect("graph lock poisoned")
      .iter()
      .filter(|(_, n)| kinds.is_empty() || kinds.contains(&n.kind()))
      .map(|(name, n)| (name.clone(), n.clone()))
      .collect()
  }

  pub fn len(&self) -> usize {
    self.nodes.read().expect("graph lock poisoned").len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use riveer_node::{BaseNode, DeltaNode, NodeError, Payload};
  use serde_json::Value;
  use std::sync::Arc;

  struct StubDelta;
  impl BaseNode for StubDelta {
    fn name(&self) -> &str {
      "d"
    }
    fn kind(&self) -> NodeKind {
      NodeKind::Delta
    }
    fn function(&self, _data: Payload, _args: &[Value]) -> Result<Option<Payload>, NodeError> {
      Ok(None)
    }
  }
  impl DeltaNode for StubDelta {}

  #[test]
  fn registering_duplicate_name_fails() {
    let graph = Graph::new();
    graph
      .register("d".into(), GraphNode::Delta(Arc::new(StubDelta)))
      .unwrap();

    let err = graph
      .register("d".into(), GraphNode::Delta(Arc::new(StubDelta)))
      .unwrap_err();
    assert_eq!(err.to_string(), "node of name 'd' already exists");
  }

  #[test]
  fn lookup_of_missing_node_returns_none() {
    let graph = Graph::new();
    assert!(graph.get("missing").is_none());
  }

  #[test]
  fn output_ids_of_delta_is_empty() {
    let graph = Graph::new();
    graph
      .register("d".into(), GraphNode::Delta(Arc::new(StubDelta)))
      .unwrap();
    assert_eq!(graph.output_ids("d"), Some(Vec::new()));
  }
}
