//! Command Handlers 实现

mod job_command_handlers;
mod synthesis_handlers;

pub use job_command_handlers::*;
pub use synthesis_handlers::*;
