//! Cron schedule parsing and pipeline reachability validation.

mod cron_task;
mod error;
mod schedule;

pub use cron_task::CronTask;
pub use error::CronError;
pub use schedule::parse_schedule;
