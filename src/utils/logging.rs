use crate::models::config::LoggingConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Install the global fmt subscriber
///
/// `RUST_LOG` wins over the configured level when set. Fails instead of
/// panicking when a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), String> {
    let filter = build_filter(config)?;

    let layer = if config.json {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer().with_target(true).boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| format!("Failed to initialize logging: {}", e))
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, String> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    parse_level(&config.level)
}

fn parse_level(level: &str) -> Result<EnvFilter, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" | "off" => {
            EnvFilter::try_new(format!("flame_score_lib={}", level.trim().to_ascii_lowercase()))
                .map_err(|e| format!("Invalid log level '{}': {}", level, e))
        }
        _ => Err(format!(
            "Invalid log level '{}' (expected trace, debug, info, warn, error or off)",
            level
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_accepts_known_levels() {
        for level in ["trace", "debug", "info", "warn", "error", "off", " INFO "] {
            assert!(parse_level(level).is_ok(), "{} should be accepted", level);
        }
    }

    #[test]
    fn test_parse_level_rejects_unknown() {
        let err = parse_level("verbose").unwrap_err();
        assert!(err.contains("verbose"), "unexpected error: {}", err);
    }

    #[test]
    fn test_init_logging_twice_fails() {
        let config = LoggingConfig::default();
        let _ = init_logging(&config);

        let err = init_logging(&config).unwrap_err();
        assert!(err.starts_with("Failed to initialize logging"), "unexpected error: {}", err);
    }
}
