//! App controller: boots a node graph from config files and runs it.

mod controller;
mod error;

pub use controller::{AppController, DEFAULT_CONFIG_FOLDER};
pub use error::AppError;
