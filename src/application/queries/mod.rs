//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：耗时估算、任务状态、任务音频

mod estimate_queries;
mod job_queries;

pub mod handlers;

pub use estimate_queries::*;
pub use job_queries::*;
