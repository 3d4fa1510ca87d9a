use std::sync::Arc;

use serde_json::Value;

use crate::error::NodeError;
use crate::payload::Payload;

/// Which of the three pipeline roles a node plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
  Spring,
  Flow,
  Delta,
}

impl NodeKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      NodeKind::Spring => "spring",
      NodeKind::Flow => "flow",
      NodeKind::Delta => "delta",
    }
  }
}

/// A cron-scheduled call into a `SpringNode`'s function, along with the
/// downstream node ids its result should be sent to.
#[derive(Debug, Clone)]
pub struct PeriodicTaskSpec {
  pub name: String,
  pub cron: String,
  pub args: Vec<Value>,
  pub outputs: Vec<String>,
}

/// Shared behavior every node, regardless of role, must provide.
///
/// `function` is a synchronous, blocking call by design: node
/// implementations are expected to perform real I/O (database queries,
/// HTTP requests) and must not be required to cooperate with an async
/// scheduler to make progress. Dispatch onto a blocking-friendly
/// executor is the broker's job, not the node's.
pub trait BaseNode: Send + Sync {
  fn name(&self) -> &str;

  fn kind(&self) -> NodeKind;

  /// Connects to / checks the connection to the underlying source or sink.
  fn connect(&self) -> Result<(), NodeError> {
    Ok(())
  }

  /// Cleans up any held resources on shutdown.
  fn shutdown(&self) -> Result<(), NodeError> {
    Ok(())
  }

  /// Runs this node's logic against the given input. Returning `None`
  /// means no result should be sent downstream (e.g. a batcher still
  /// filling its buffer).
  fn function(&self, data: Payload, args: &[Value]) -> Result<Option<Payload>, NodeError>;
}

/// A node that acts as an input to the system; it schedules its own
/// work rather than reacting to upstream data.
pub trait SpringNode: BaseNode {
  fn periodic_tasks(&self) -> Vec<PeriodicTaskSpec>;
}

/// A node that transforms data flowing through the pipeline.
pub trait FlowNode: BaseNode {
  fn output_ids(&self) -> Vec<String>;
}

/// A node that acts as an output of the system. Deltas never forward
/// data further, so `output_ids` always reports empty.
pub trait DeltaNode: BaseNode {
  fn output_ids(&self) -> Vec<String> {
    Vec::new()
  }
}

/// The registered, runnable form of a node, tagged by role.
#[derive(Clone)]
pub enum GraphNode {
  Spring(Arc<dyn SpringNode>),
  Flow(Arc<dyn FlowNode>),
  Delta(Arc<dyn DeltaNode>),
}

impl GraphNode {
  pub fn name(&self) -> &str {
    match self {
      GraphNode::Spring(n) => n.name(),
      GraphNode::Flow(n) => n.name(),
      GraphNode::Delta(n) => n.name(),
    }
  }

  pub fn kind(&self) -> NodeKind {
    match self {
      GraphNode::Spring(n) => n.kind(),
      GraphNode::Flow(n) => n.kind(),
      GraphNode::Delta(n) => n.kind(),
    }
  }

  /// Output ids for nodes that can read upstream data (Flow, Delta).
  /// Springs never accept pipeline inputs, so this is `None` for them.
  pub fn output_ids(&self) -> Option<Vec<String>> {
    match self {
      GraphNode::Spring(_) => None,
      GraphNode::Flow(n) => Some(n.output_ids()),
      GraphNode::Delta(n) => Some(n.output_ids()),
    }
  }

  pub fn connect(&self) -> Result<(), NodeError> {
    match self {
      GraphNode::Spring(n) => n.connect(),
      GraphNode::Flow(n) => n.connect(),
      GraphNode::Delta(n) => n.connect(),
    }
  }

  pub fn shutdown(&self) -> Result<(), NodeError> {
    match self {
      GraphNode::Spring(n) => n.shutdown(),
      GraphNode::Flow(n) => n.shutdown(),
      GraphNode::Delta(n) => n.shutdown(),
    }
  }

  pub fn function(&self, data: Payload, args: &[Value]) -> Result<Option<Payload>, NodeError> {
    match self {
      GraphNode::Spring(n) => n.function(data, args),
      GraphNode::Flow(n) => n.function(data, args),
      GraphNode::Delta(n) => n.function(data, args),
    }
  }
}
