pub mod analysis;
pub mod config;
pub mod facts;
pub mod stat;

pub use analysis::{
    AnalysisRequest, AnalysisResult, AnalysisState, FlameValues, ManualStatRequest, Tier,
    TierLabel,
};
pub use config::{AppConfig, FlameConfig, LoggingConfig, OcrServerConfig};
pub use facts::{ExtractedFacts, FlameReading, LineKind, RawStatLine};
pub use stat::{ItemCategory, StatCategory, StatKind, WeaponSet};
