//! Worker Layer - 后台任务
//!
//! SynthesisWorker 执行排队的长音频任务，janitor 清理过期任务

mod synthesis_worker;

pub use synthesis_worker::{run_job_janitor, SynthesisWorker, SynthesisWorkerConfig};
