//! 已启用引擎表
//!
//! 启动时按配置注册；未注册的引擎在请求时报告配置错误。

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::error::SynthesisError;
use crate::application::ports::SpeechEnginePort;
use crate::domain::synthesis::{EngineKind, EngineProfile};

use super::EngineAdapter;

#[derive(Default)]
pub struct EngineRegistry {
    adapters: HashMap<EngineKind, Arc<EngineAdapter>>,
    profiles: HashMap<EngineKind, EngineProfile>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册引擎，同类型的旧引擎被替换
    pub fn with_engine(mut self, engine: Arc<dyn SpeechEnginePort>, profile: EngineProfile) -> Self {
        let kind = profile.kind;
        self.profiles.insert(kind, profile.clone());
        self.adapters
            .insert(kind, Arc::new(EngineAdapter::new(engine, profile)));
        self
    }

    /// 只登记能力配置（引擎未启用时仍可做估算）
    pub fn with_profile(mut self, profile: EngineProfile) -> Self {
        self.profiles.entry(profile.kind).or_insert(profile);
        self
    }

    pub fn adapter(&self, kind: EngineKind) -> Result<Arc<EngineAdapter>, SynthesisError> {
        self.adapters
            .get(&kind)
            .cloned()
            .ok_or_else(|| SynthesisError::Configuration {
                engine: kind,
                reason: "no credentials configured".to_string(),
            })
    }

    /// 引擎能力配置，未登记时使用内置默认值
    pub fn profile(&self, kind: EngineKind) -> EngineProfile {
        self.profiles
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| EngineProfile::for_kind(kind))
    }

    pub fn is_available(&self, kind: EngineKind) -> bool {
        self.adapters.contains_key(&kind)
    }

    pub fn available(&self) -> Vec<EngineKind> {
        let mut kinds: Vec<EngineKind> = self.adapters.keys().copied().collect();
        kinds.sort_by_key(|k| k.as_str());
        kinds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_engine_is_configuration_error() {
        let registry = EngineRegistry::new().with_profile(EngineProfile::premium());
        let err = registry.adapter(EngineKind::Premium).err();
        assert!(matches!(
            err,
            Some(SynthesisError::Configuration {
                engine: EngineKind::Premium,
                ..
            })
        ));
        assert!(registry.available().is_empty());
    }

    #[test]
    fn test_profile_falls_back_to_builtin() {
        let mut custom = EngineProfile::fast();
        custom.chunk_size = 1000;
        let registry = EngineRegistry::new().with_profile(custom);
        assert_eq!(registry.profile(EngineKind::Fast).chunk_size, 1000);
        assert_eq!(registry.profile(EngineKind::Premium).chunk_size, 3000);
    }
}
