use std::sync::Arc;

use riveer_cron::CronTask;
use riveer_graph::Graph;
use riveer_node::Payload;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{error, instrument, warn};

struct Inner {
  graph: Arc<Graph>,
  cancel: CancellationToken,
}

/// An in-process, single-binary stand-in for the real distributed
/// broker the system is designed against (spec explicitly keeps the
/// broker's own queueing/retry/serialization internals out of scope).
/// Enough to exercise the graph, cron, and task-wrapper machinery end
/// to end without a running Celery- or RabbitMQ-equivalent.
///
/// Dispatch runs every node call through `tokio::task::spawn_blocking`
/// so a node's synchronous I/O maps to genuine OS-thread blocking
/// rather than holding up the async scheduler, per the concurrency
/// model: node `function` implementations are never required to yield
/// cooperatively.
#[derive(Clone)]
pub struct LocalBroker {
  inner: Arc<Inner>,
}

impl LocalBroker {
  pub fn new(graph: Arc<Graph>, cancel: CancellationToken) -> Self {
    LocalBroker {
      inner: Arc::new(Inner { graph, cancel }),
    }
  }

  pub fn graph(&self) -> &Arc<Graph> {
    &self.inner.graph
  }

  /// Sends `payload` to every named reader, independently. Mirrors
  /// `NodeGraph.send_result`: each reader gets the same payload, not a
  /// split or transformed share of it.
  #[instrument(skip(self, payload), fields(readers = readers.len()))]
  pub fn send_result(&self, payload: Payload, readers: &[String]) {
    for reader in readers {
      self.enqueue(reader, payload.clone(), Vec::new());
    }
  }

  /// Spawns a single call into `node_name`'s function, fanning its
  /// result out to that node's declared output ids once it completes.
  pub fn enqueue(&self, node_name: &str, payload: Payload, args: Vec<Value>) {
    self.dispatch(node_name, payload, args, None);
  }

  /// Like [`Self::enqueue`], but routes a successful result to
  /// `outputs` instead of the node's own `output_ids()`. Springs never
  /// have declared output ids of their own (they don't read pipeline
  /// input), so a cron-fired call into one must carry the task's own
  /// `output_ids` explicitly rather than relying on the generic
  /// per-node lookup, which is always `None` for a Spring.
  fn dispatch(
    &self,
    node_name: &str,
    payload: Payload,
    args: Vec<Value>,
    outputs_override: Option<Vec<String>>,
  ) {
    let Some(node) = self.inner.graph.get(node_name) else {
      error!(node = %node_name, "cannot dispatch: unknown node");
      return;
    };

    let broker = self.clone();
    let cancel = self.inner.cancel.clone();

    tokio::spawn(async move {
      if cancel.is_cancelled() {
        return;
      }

      let run_node = node.clone();
      let outcome =
        tokio::task::spawn_blocking(move || riveer_task::run_task(&run_node, payload, &args))
          .await;

      match outcome {
        Ok(Some(result)) => {
          if let Some(outputs) = outputs_override.or_else(|| node.output_ids()) {
            broker.send_result(result, &outputs);
          }
        }
        Ok(None) => {}
        Err(e) => error!(error = %e, node = %node.name(), "task worker thread panicked"),
      }
    });
  }

  /// Registers a cron-scheduled call into a Spring node's function,
  /// recomputing the next occurrence after each fire.
  pub fn schedule(&self, source_name: String, task: CronTask) {
    let broker = self.clone();
    let cancel = self.inner.cancel.clone();

    tokio::spawn(async move {
      loop {
        let Some(sleep_for) = next_occurrence_in(&task.schedule) else {
          warn!(task = %task.name, "cron schedule has no future occurrences, stopping");
          break;
        };

        tokio::select! {
          _ = cancel.cancelled() => break,
          _ = tokio::time::sleep(sleep_for) => {
            broker.dispatch(
              &source_name,
              Payload::Record(Default::default()),
              task.args.clone(),
              Some(task.output_ids.clone()),
            );
          }
        }
      }
    });
  }
}

fn next_occurrence_in(schedule: &cron::Schedule) -> Option<std::time::Duration> {
  let now = chrono::Utc::now();
  let next = schedule.upcoming(chrono::Utc).next()?;
  (next - now).to_std().ok()
}
