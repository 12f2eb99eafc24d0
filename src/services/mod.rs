pub mod analyzer;
pub mod config;
pub mod extractor;
pub mod flame_service;
pub mod ocr;
pub mod resolver;
pub mod tier_table;

pub use analyzer::{FlameAnalyzer, FlameSession};
pub use config::ConfigManager;
pub use extractor::LineExtractor;
pub use flame_service::FlameService;
pub use resolver::{ManualOverrides, TierResolver};
