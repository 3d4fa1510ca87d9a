use thiserror::Error;

#[derive(Debug, Error)]
pub enum CronError {
  #[error("invalid cron expression '{expression}': {message}")]
  InvalidSchedule { expression: String, message: String },

  #[error("invalid pipeline configuration: detected closed loop at [ {} ]", path.join(" -> "))]
  Cycle { path: Vec<String> },

  #[error("invalid pipeline configuration: node '{node}' does not exist [ {} ]", path.join(" -> "))]
  MissingNode { node: String, path: Vec<String> },

  #[error(
    "invalid pipeline configuration: node '{node}' is a spring and cannot accept pipeline inputs [ {} ]",
    path.join(" -> ")
  )]
  NotReader { node: String, path: Vec<String> },
}
