//! Query Handlers 实现

mod estimate_handlers;
mod job_query_handlers;

pub use estimate_handlers::*;
pub use job_query_handlers::*;
