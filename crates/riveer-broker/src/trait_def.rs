use riveer_cron::CronTask;
use riveer_node::Payload;
use serde_json::Value;

use crate::broker::LocalBroker;

/// The boundary the app controller and cron tasks dispatch through.
/// The real distributed broker's queueing, retries, and wire format
/// are out of scope for this crate; `LocalBroker` is the only
/// implementation shipped here.
pub trait Broker: Send + Sync {
  fn enqueue(&self, node_name: &str, payload: Payload, args: Vec<Value>);

  fn send_result(&self, payload: Payload, readers: &[String]);

  fn schedule(&self, source_name: String, task: CronTask);
}

impl Broker for LocalBroker {
  fn enqueue(&self, node_name: &str, payload: Payload, args: Vec<Value>) {
    LocalBroker::enqueue(self, node_name, payload, args)
  }

  fn send_result(&self, payload: Payload, readers: &[String]) {
    LocalBroker::send_result(self, payload, readers)
  }

  fn schedule(&self, source_name: String, task: CronTask) {
    LocalBroker::schedule(self, source_name, task)
  }
}
