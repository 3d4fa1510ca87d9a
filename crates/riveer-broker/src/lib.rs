//! In-process reference broker.

mod broker;
mod trait_def;

pub use broker::LocalBroker;
pub use trait_def::Broker;
