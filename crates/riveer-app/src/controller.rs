use std::path::{Path, PathBuf};
use std::sync::Arc;

use riveer_broker::LocalBroker;
use riveer_config::{load_configs, validate_header};
use riveer_cron::CronTask;
use riveer_graph::Graph;
use riveer_node::NodeKind;
use riveer_registry::Registry;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::error::AppError;

pub const DEFAULT_CONFIG_FOLDER: &str = "./configs";

/// The central controller of the app: loads configuration, builds the
/// node graph, schedules cron tasks, connects every Spring and Delta,
/// and owns the cancellation token the broker and signal handler share.
///
/// Grounded on `original_source/src/core/app.py::AppController`, with
/// the ordering (`load` -> `configure` -> connect) preserved exactly:
/// configuration, then node construction and cron validation, then
/// connection establishment last, so a bad pipeline is caught before
/// anything with side effects (a DB pool, an HTTP session) is opened.
pub struct AppController {
  pub graph: Arc<Graph>,
  pub broker: LocalBroker,
  cancel: CancellationToken,
}

impl AppController {
  /// Builds the app: reads every config file in `folder`, constructs
  /// and registers each node, validates and schedules cron tasks, and
  /// connects every Spring/Delta. Returns before the broker's run loop
  /// starts — call [`AppController::run`] to block.
  pub fn bootstrap(folder: &Path, registry: &Registry) -> Result<Self, AppError> {
    let graph = Arc::new(Graph::new());
    let cancel = CancellationToken::new();
    let broker = LocalBroker::new(Arc::clone(&graph), cancel.clone());

    info!(folder = %folder.display(), "loading configurations");
    load_configurations(folder, registry, &graph)?;

    info!("creating and validating cron tasks");
    create_node_tasks(&graph, &broker)?;

    info!("establishing node connections");
    establish_connections(&graph)?;

    Ok(AppController {
      graph,
      broker,
      cancel,
    })
  }

  pub fn config_folder_from_env() -> PathBuf {
    std::env::var("RIVEER_CONFIG")
      .map(PathBuf::from)
      .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FOLDER))
  }

  /// Runs until cancelled (e.g. by ctrl-c), then shuts down every
  /// Spring and Delta node.
  pub async fn run(&self) {
    tokio::select! {
      _ = tokio::signal::ctrl_c() => {
        info!("received shutdown signal");
      }
      _ = self.cancel.cancelled() => {}
    }

    self.cancel.cancel();
    self.shutdown();
  }

  pub fn cancellation_token(&self) -> CancellationToken {
    self.cancel.clone()
  }

  fn shutdown(&self) {
    for (name, node) in self.graph.nodes_of_kind(&[NodeKind::Spring, NodeKind::Delta]) {
      if let Err(e) = node.shutdown() {
        error!(node = %name, error = %e, "node shutdown failed");
      }
    }
  }
}

fn load_configurations(folder: &Path, registry: &Registry, graph: &Graph) -> Result<(), AppError> {
  for raw in load_configs(folder)? {
    let header = validate_header(&raw.value, &raw.default_name)?;
    let node = registry.build(&header.pipe, &header.node_type, &raw.value)?;
    graph.register(header.name, node)?;
  }
  Ok(())
}

fn create_node_tasks(graph: &Graph, broker: &LocalBroker) -> Result<(), AppError> {
  for (name, node) in graph.nodes_of_kind(&[NodeKind::Spring]) {
    let riveer_node::GraphNode::Spring(spring) = &node else {
      continue;
    };

    for spec in spring.periodic_tasks() {
      let task = CronTask::new(
        graph,
        &name,
        &spec.name,
        &spec.cron,
        spec.args,
        spec.outputs,
      )
      .map_err(|e| {
        error!(node = %name, task = %spec.name, error = %e, "failed to create cron task");
        e
      })?;

      broker.schedule(name.clone(), task);
    }
  }
  Ok(())
}

fn establish_connections(graph: &Graph) -> Result<(), AppError> {
  for (name, node) in graph.nodes_of_kind(&[NodeKind::Spring, NodeKind::Delta]) {
    node.connect().map_err(|source| {
      error!(node = %name, error = %source, "node failed to connect");
      AppError::Connect {
        node: name.clone(),
        source,
      }
    })?;
  }
  Ok(())
}
