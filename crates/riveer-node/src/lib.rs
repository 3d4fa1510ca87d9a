//! Node abstraction and payload type shared by every pipeline node.

mod error;
mod node;
mod payload;

pub use error::NodeError;
pub use node::{BaseNode, DeltaNode, FlowNode, GraphNode, NodeKind, PeriodicTaskSpec, SpringNode};
pub use payload::Payload;
