use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error(transparent)]
  Config(#[from] riveer_config::ConfigError),

  #[error(transparent)]
  Registry(#[from] riveer_registry::RegistryError),

  #[error(transparent)]
  Graph(#[from] riveer_graph::GraphError),

  #[error(transparent)]
  Cron(#[from] riveer_cron::CronError),

  #[error("node '{node}' failed to connect: {source}")]
  Connect {
    node: String,
    #[source]
    source: riveer_node::NodeError,
  },
}
