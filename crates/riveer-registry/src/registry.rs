use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use riveer_node::GraphNode;
use serde_json::Value;

use crate::error::RegistryError;

type Factory = Arc<dyn Fn(&Value) -> Result<GraphNode, RegistryError> + Send + Sync>;

/// Maps `(pipe, type_id)` pairs to node constructors.
///
/// Rust has no runtime class reflection, so there's no equivalent to
/// the original's `pkgutil.walk_packages` extension discovery — every
/// node type this process can build is registered explicitly, by the
/// app, at startup. Grounded on `fuschia_component_registry`'s
/// registry trait, generalized from "look up an installed wasm
/// package" to "call a constructor closure for a native node type".
#[derive(Default)]
pub struct Registry {
  springs: RwLock<HashMap<String, Factory>>,
  flows: RwLock<HashMap<String, Factory>>,
  deltas: RwLock<HashMap<String, Factory>>,
}

impl Registry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register_spring(
    &self,
    type_id: &str,
    factory: impl Fn(&Value) -> Result<GraphNode, RegistryError> + Send + Sync + 'static,
  ) -> Result<(), RegistryError> {
    Self::insert(&self.springs, "spring", type_id, Arc::new(factory))
  }

  pub fn register_flow(
    &self,
    type_id: &str,
    factory: impl Fn(&Value) -> Result<GraphNode, RegistryError> + Send + Sync + 'static,
  ) -> Result<(), RegistryError> {
    Self::insert(&self.flows, "flow", type_id, Arc::new(factory))
  }

  pub fn register_delta(
    &self,
    type_id: &str,
    factory: impl Fn(&Value) -> Result<GraphNode, RegistryError> + Send + Sync + 'static,
  ) -> Result<(), RegistryError> {
    Self::insert(&self.deltas, "delta", type_id, Arc::new(factory))
  }

  fn insert(
    map: &RwLock<HashMap<String, Factory>>,
    pipe: &str,
    type_id: &str,
    factory: Factory,
  ) -> Result<(), RegistryError> {
    let mut map = map.write().expect("registry lock poisoned");
    if map.contains_key(type_id) {
      return Err(RegistryError::DuplicateFactory {
        pipe: pipe.to_string(),
        type_id: type_id.to_string(),
      });
    }
    map.insert(type_id.to_string(), factory);
    Ok(())
  }

  /// Builds a node from its pipe kind, type id, and raw config.
  /// Mirrors `Modules.get_node_cls` + `cls.from_configuration`.
  pub fn build(&self, pipe: &str, type_id: &str, config: &Value) -> Result<GraphNode, RegistryError> {
    let map = match pipe {
      "spring" => &self.springs,
      "flow" => &self.flows,
      "delta" => &self.deltas,
      other => return Err(RegistryError::InvalidPipeType(other.to_string())),
    };

    let factory = map
      .read()
      .expect("registry lock poisoned")
      .get(type_id)
      .cloned()
      .ok_or_else(|| RegistryError::UnknownNodeType(type_id.to_string()))?;

    factory(config)
  }
}
