//! 测试用引擎和事件收集器

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{
    ProgressSinkPort, SpeechAudio, SpeechEnginePort, SpeechError, SpeechRequest, SynthesisEvent,
};
use crate::domain::audio::PcmFormat;
use crate::domain::synthesis::EngineKind;

/// 按脚本依次返回结果的引擎，脚本用完后回落到 `fallback`
pub struct ScriptedEngine {
    kind: EngineKind,
    script: Mutex<VecDeque<Result<SpeechAudio, SpeechError>>>,
    fallback: Option<usize>,
    latency: Duration,
    pub requests: Mutex<Vec<SpeechRequest>>,
}

impl ScriptedEngine {
    pub fn new(kind: EngineKind, script: Vec<Result<SpeechAudio, SpeechError>>) -> Arc<Self> {
        Arc::new(Self {
            kind,
            script: Mutex::new(script.into()),
            fallback: None,
            latency: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
        })
    }

    /// 每次调用都返回 `bytes` 字节的静音
    pub fn constant(kind: EngineKind, bytes: usize, latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            kind,
            script: Mutex::new(VecDeque::new()),
            fallback: Some(bytes),
            latency,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl SpeechEnginePort for ScriptedEngine {
    fn kind(&self) -> EngineKind {
        self.kind
    }

    async fn synthesize(&self, request: SpeechRequest) -> Result<SpeechAudio, SpeechError> {
        self.requests.lock().unwrap().push(request);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        match (next, self.fallback) {
            (Some(result), _) => result,
            (None, Some(bytes)) => pcm(bytes),
            (None, None) => Err(SpeechError::NetworkError("script exhausted".into())),
        }
    }
}

pub fn pcm(bytes: usize) -> Result<SpeechAudio, SpeechError> {
    Ok(SpeechAudio {
        pcm: vec![0u8; bytes],
        format: PcmFormat::default(),
    })
}

/// 记录所有事件
#[derive(Default)]
pub struct CollectingSink {
    pub events: Mutex<Vec<SynthesisEvent>>,
}

impl CollectingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn snapshot(&self) -> Vec<SynthesisEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&SynthesisEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }
}

impl ProgressSinkPort for CollectingSink {
    fn publish(&self, event: SynthesisEvent) {
        self.events.lock().unwrap().push(event);
    }
}
