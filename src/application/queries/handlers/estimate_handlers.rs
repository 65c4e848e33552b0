//! Estimate Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::queries::estimate_queries::*;
use crate::application::services::LongAudioPipeline;

/// EstimateDuration Handler
pub struct EstimateDurationHandler {
    pipeline: Arc<LongAudioPipeline>,
}

impl EstimateDurationHandler {
    pub fn new(pipeline: Arc<LongAudioPipeline>) -> Self {
        Self { pipeline }
    }

    pub fn handle(&self, query: EstimateDurationQuery) -> Result<EstimateDurationResponse, ApplicationError> {
        let character_count = match (query.text.as_deref(), query.character_count) {
            (Some(text), _) => text.chars().count(),
            (None, Some(count)) => count,
            (None, None) => {
                return Err(ApplicationError::validation(
                    "Either text or character_count is required",
                ))
            }
        };

        Ok(EstimateDurationResponse {
            estimate: self.pipeline.estimate(character_count, query.engine),
            engine_available: self.pipeline.engines().is_available(query.engine),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::EngineRegistry;
    use crate::domain::synthesis::EngineKind;
    use std::time::Duration;

    fn handler() -> EstimateDurationHandler {
        let pipeline = LongAudioPipeline::new(Arc::new(EngineRegistry::new()), Duration::from_secs(60));
        EstimateDurationHandler::new(Arc::new(pipeline))
    }

    #[test]
    fn test_estimate_from_text() {
        let response = handler()
            .handle(EstimateDurationQuery {
                text: Some("a".repeat(10_000)),
                character_count: None,
                engine: EngineKind::Premium,
            })
            .unwrap();
        assert_eq!(response.estimate.chunk_count, 4);
        assert_eq!(response.estimate.total_secs(), 107);
        assert!(!response.engine_available);
    }

    #[test]
    fn test_estimate_requires_input() {
        let result = handler().handle(EstimateDurationQuery {
            text: None,
            character_count: None,
            engine: EngineKind::Fast,
        });
        assert!(result.is_err());
    }
}
