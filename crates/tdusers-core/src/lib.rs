//! Active-user scanner and workflow client for the Treasure Data REST API.

pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod scanner;
pub mod transport;
pub mod window;
pub mod workflow;

