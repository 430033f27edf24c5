//! CLI command handlers. Each command group is in its own file.

mod completions;
mod users;
mod workflow;

pub use completions::run_completions;
pub use users::run_users;
pub use workflow::{run_check, run_list, run_sessions, run_workflow, RunOptions};
