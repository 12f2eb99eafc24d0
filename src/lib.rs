//! Flame tier and score analysis for OCR-extracted equipment tooltips.
//!
//! Raw tooltip text goes through the line extractor, the extracted readings
//! are resolved against the tier tables, and the caller receives a
//! [`FlameSession`] that either holds a complete result or asks for the
//! weapon set / a manual stat value before finishing.

pub mod models;
pub mod services;
pub mod utils;

pub use models::{
    AnalysisRequest, AnalysisResult, AnalysisState, AppConfig, FlameConfig, ItemCategory,
    StatCategory, StatKind, Tier, TierLabel, WeaponSet,
};
pub use services::{ConfigManager, FlameAnalyzer, FlameService, FlameSession};
pub use utils::init_logging;

/// One-shot analysis with the built-in tables
pub fn analyze(text: &str, request: &AnalysisRequest) -> FlameSession {
    FlameAnalyzer::default().analyze(text, request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_summary() {
        let text = "\
REQ LEV: 150
LUK: +90 (40 + 36 + 14)
DEX: +60 (40 + 20)
Attack Power: +4 (0 + 4)
All Stats: +5%";

        let session = analyze(text, &AnalysisRequest::new(StatKind::Luk, StatKind::Dex, true));

        assert!(session.is_complete());
        assert_eq!(
            session.result().summary(),
            "Main Stat: 36 | Sub Stat: 20 | ATK: 4 | All Stat%: 5 | Boss Damage: 0%\n\
             T4 (LUK), T2 (DEX), T2 (ATK), T5 (All Stat%)\n\
             Flame Score: 99 (LUK)"
        );
    }
}
