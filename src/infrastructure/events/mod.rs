//! Events - 合成事件分发

mod publisher;

pub use publisher::{EventPublisher, JobEvent, JobProgressSink, TracingProgressSink};
