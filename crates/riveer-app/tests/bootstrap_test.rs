use std::fs;
use std::sync::Arc;

use riveer_app::AppController;
use riveer_node::{
  BaseNode, DeltaNode, GraphNode, NodeError, NodeKind, Payload, PeriodicTaskSpec, SpringNode,
};
use riveer_registry::{Registry, RegistryError};
use serde_json::Value;

struct StubSpring {
  name: String,
  outputs: Vec<String>,
}
impl BaseNode for StubSpring {
  fn name(&self) -> &str {
    &self.name
  }
  fn kind(&self) -> NodeKind {
    NodeKind::Spring
  }
  fn function(&self, _d: Payload, _a: &[Value]) -> Result<Option<Payload>, NodeError> {
    Ok(None)
  }
}
impl SpringNode for StubSpring {
  fn periodic_tasks(&self) -> Vec<PeriodicTaskSpec> {
    vec![PeriodicTaskSpec {
      name: "poll".to_string(),
      cron: "* * * * *".to_string(),
      args: vec![],
      outputs: self.outputs.clone(),
    }]
  }
}

struct StubDelta {
  name: String,
}
impl BaseNode for StubDelta {
  fn name(&self) -> &str {
    &self.name
  }
  fn kind(&self) -> NodeKind {
    NodeKind::Delta
  }
  fn function(&self, _d: Payload, _a: &[Value]) -> Result<Option<Payload>, NodeError> {
    Ok(None)
  }
}
impl DeltaNode for StubDelta {}

fn test_registry() -> Registry {
  let registry = Registry::new();
  registry
    .register_spring("stub", |config: &Value| -> Result<GraphNode, RegistryError> {
      let name = config["configuration"]["name"].as_str().unwrap_or("spring").to_string();
      let outputs = config["outputs"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();
      Ok(GraphNode::Spring(Arc::new(StubSpring { name, outputs })))
    })
    .unwrap();
  registry
    .register_delta("stub", |config: &Value| -> Result<GraphNode, RegistryError> {
      let name = config["configuration"]["name"].as_str().unwrap_or("delta").to_string();
      Ok(GraphNode::Delta(Arc::new(StubDelta { name })))
    })
    .unwrap();
  registry
}

#[test]
fn bootstraps_single_spring_to_delta_pipeline() {
  let dir = tempfile::tempdir().unwrap();
  fs::write(
    dir.path().join("sink.yaml"),
    "configuration:\n  pipe: delta\n  type: stub\n  name: sink\n",
  )
  .unwrap();
  fs::write(
    dir.path().join("source.yaml"),
    "configuration:\n  pipe: spring\n  type: stub\n  name: source\noutputs:\n  - sink\n",
  )
  .unwrap();

  let registry = test_registry();
  let app = AppController::bootstrap(dir.path(), &registry).unwrap();

  assert_eq!(app.graph.len(), 2);
}

#[test]
fn rejects_cron_task_targeting_missing_downstream_node() {
  let dir = tempfile::tempdir().unwrap();
  fs::write(
    dir.path().join("source.yaml"),
    "configuration:\n  pipe: spring\n  type: stub\n  name: source\noutputs:\n  - ghost\n",
  )
  .unwrap();

  let registry = test_registry();
  let err = AppController::bootstrap(dir.path(), &registry).unwrap_err();

  assert!(err.to_string().contains("does not exist"));
}

#[test]
fn rejects_duplicate_node_names_across_config_files() {
  let dir = tempfile::tempdir().unwrap();
  fs::write(
    dir.path().join("a.yaml"),
    "configuration:\n  pipe: delta\n  type: stub\n  name: dup\n",
  )
  .unwrap();
  fs::write(
    dir.path().join("b.yaml"),
    "configuration:\n  pipe: delta\n  type: stub\n  name: dup\n",
  )
  .unwrap();

  let registry = test_registry();
  let err = AppController::bootstrap(dir.path(), &registry).unwrap_err();

  assert!(err.to_string().contains("already exists"));
}
