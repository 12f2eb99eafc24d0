use crate::models::analysis::AnalysisRequest;
use crate::models::config::AppConfig;
use crate::services::analyzer::{FlameAnalyzer, FlameSession};
use crate::services::ocr::HttpOcrClient;
use std::sync::Arc;
use tracing::{info, warn};

/// Screenshot in, flame session out: OCR server plus analyzer
#[derive(Clone)]
pub struct FlameService {
    ocr: HttpOcrClient,
    analyzer: Arc<FlameAnalyzer>,
}

impl FlameService {
    pub fn new(config: &AppConfig) -> Result<Self, String> {
        config.flame.validate()?;
        let ocr = HttpOcrClient::new(&config.ocr)?;

        Ok(Self {
            ocr,
            analyzer: Arc::new(FlameAnalyzer::new(config.flame.clone())),
        })
    }

    pub fn analyzer(&self) -> &FlameAnalyzer {
        &self.analyzer
    }

    pub async fn health_check(&self) -> Result<(), String> {
        self.ocr.health_check().await
    }

    /// Run OCR on an encoded screenshot and analyze the recognized text
    pub async fn analyze_image(
        &self,
        image: &[u8],
        request: &AnalysisRequest,
    ) -> Result<FlameSession, String> {
        let text = self.ocr.recognize_text(image).await.map_err(|e| {
            warn!(error = %e, "OCR failed");
            format!("Failed to read item text: {}", e)
        })?;

        if text.trim().is_empty() {
            info!("OCR returned no text");
        }
        Ok(self.analyzer.analyze(&text, request))
    }

    /// Analyze text that was already recognized elsewhere
    pub fn analyze_text(&self, text: &str, request: &AnalysisRequest) -> FlameSession {
        self.analyzer.analyze(text, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::stat::StatKind;

    fn unreachable_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.ocr.base_url = "http://127.0.0.1:9".to_string();
        config.ocr.timeout_secs = 1;
        config
    }

    #[test]
    fn test_new_rejects_invalid_tables() {
        let mut config = AppConfig::default();
        config.flame.tiers.boss_damage.clear();

        assert!(FlameService::new(&config).is_err());
    }

    #[test]
    fn test_analyze_text() {
        let service = FlameService::new(&AppConfig::default()).unwrap();
        let session = service.analyze_text(
            "REQ LEV: 160\nLUK: +40 (22 + 18)",
            &AnalysisRequest::new(StatKind::Luk, StatKind::Dex, false),
        );

        assert!(session.is_complete());
        assert_eq!(session.result().flames.main_stat, 18);
        assert_eq!(session.result().score, 18);
    }

    #[test]
    fn test_analyze_image_reports_ocr_failure() {
        let service = FlameService::new(&unreachable_config()).unwrap();
        let request = AnalysisRequest::new(StatKind::Str, StatKind::Dex, false);

        let err = tokio_test::block_on(service.analyze_image(&[0x89, 0x50, 0x4e, 0x47], &request))
            .unwrap_err();
        assert!(err.starts_with("Failed to read item text"), "unexpected error: {}", err);
    }
}
