//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：合成、试听、后台任务的提交与取消

mod job_commands;
mod synthesis_commands;

pub mod handlers;

pub use job_commands::*;
pub use synthesis_commands::*;
