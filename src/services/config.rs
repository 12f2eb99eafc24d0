use crate::models::config::AppConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const APP_DIR: &str = "flame-score";
const CONFIG_FILE: &str = "config.json";

/// Persists `AppConfig` as pretty JSON in the platform config directory
pub struct ConfigManager {
    config_dir: PathBuf,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Manager for `<config dir>/flame-score/config.json`
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new() -> Result<Self, String> {
        let config_dir = dirs::config_dir()
            .ok_or("Failed to determine config directory")?
            .join(APP_DIR);

        fs::create_dir_all(&config_dir)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;

        Ok(Self::with_dir(config_dir))
    }

    /// Manager rooted at an explicit directory; nothing is created until `save`
    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        let config_path = config_dir.join(CONFIG_FILE);
        Self {
            config_dir,
            config_path,
        }
    }

    /// Validate, then write to disk
    pub fn save(&self, config: &AppConfig) -> Result<(), String> {
        config.flame.validate()?;

        fs::create_dir_all(&self.config_dir)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;

        let json = serde_json::to_string_pretty(config)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(&self.config_path, json)
            .map_err(|e| format!("Failed to write config file: {}", e))?;

        info!(path = %self.config_path.display(), "config saved");
        Ok(())
    }

    /// Load from disk, falling back to defaults when no file exists
    ///
    /// Sections missing from the file take their defaults. Tier tables that
    /// fail validation are rejected.
    pub fn load(&self) -> Result<AppConfig, String> {
        if !self.config_exists() {
            debug!(path = %self.config_path.display(), "no config file, using defaults");
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        config
            .flame
            .validate()
            .map_err(|e| format!("Invalid config file {}: {}", self.config_path.display(), e))?;

        Ok(config)
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file_path(&self) -> &PathBuf {
        &self.config_path
    }

    pub fn config_exists(&self) -> bool {
        self.config_path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Manager in a unique temporary directory
    fn create_test_manager() -> ConfigManager {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static COUNTER: AtomicUsize = AtomicUsize::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let temp_dir = std::env::temp_dir().join(format!(
            "flame-score-test-{}-{}",
            std::process::id(),
            id
        ));
        let _ = fs::remove_dir_all(&temp_dir);

        ConfigManager::with_dir(temp_dir)
    }

    fn cleanup_test_files(manager: &ConfigManager) {
        let _ = fs::remove_dir_all(&manager.config_dir);
    }

    #[test]
    fn test_config_save() {
        let manager = create_test_manager();

        let result = manager.save(&AppConfig::default());
        assert!(result.is_ok(), "save() should succeed: {:?}", result);
        assert!(
            manager.config_path.exists(),
            "Config file should exist after save"
        );

        let file_content = fs::read_to_string(&manager.config_path).unwrap();
        let _parsed: AppConfig =
            serde_json::from_str(&file_content).expect("Saved config should be valid JSON");

        cleanup_test_files(&manager);
    }

    #[test]
    fn test_config_load_default_when_not_exists() {
        let manager = create_test_manager();
        assert!(!manager.config_exists());

        let config = manager
            .load()
            .expect("load() should return defaults when the file doesn't exist");
        assert_eq!(config, AppConfig::default());

        cleanup_test_files(&manager);
    }

    #[test]
    fn test_config_save_and_load() {
        let manager = create_test_manager();

        let mut config = AppConfig::default();
        config.ocr.base_url = "http://192.168.0.10:39835".to_string();
        config.logging.json = true;
        config.flame.scoring.score_weapon_attack = true;
        config.flame.max_manual_value = 500;

        manager.save(&config).expect("save should succeed");
        let loaded = manager.load().expect("load should succeed");

        assert_eq!(loaded, config);
        assert!(loaded.flame.scoring.score_weapon_attack);
        assert_eq!(loaded.flame.max_manual_value, 500);

        cleanup_test_files(&manager);
    }

    #[test]
    fn test_config_load_partial_file() {
        let manager = create_test_manager();
        fs::create_dir_all(&manager.config_dir).unwrap();
        fs::write(&manager.config_path, r#"{ "logging": { "level": "debug" } }"#).unwrap();

        let loaded = manager.load().expect("partial config should load");
        assert_eq!(loaded.logging.level, "debug");
        assert_eq!(loaded.flame, AppConfig::default().flame);

        cleanup_test_files(&manager);
    }

    #[test]
    fn test_config_load_rejects_invalid_tables() {
        let manager = create_test_manager();
        fs::create_dir_all(&manager.config_dir).unwrap();
        fs::write(
            &manager.config_path,
            r#"{ "flame": { "tiers": { "all_stat": [3, 2, 1] } } }"#,
        )
        .unwrap();

        let err = manager.load().unwrap_err();
        assert!(err.contains("all_stat"), "unexpected error: {}", err);

        cleanup_test_files(&manager);
    }

    #[test]
    fn test_config_load_malformed_json() {
        let manager = create_test_manager();
        fs::create_dir_all(&manager.config_dir).unwrap();
        fs::write(&manager.config_path, "{ not json").unwrap();

        let err = manager.load().unwrap_err();
        assert!(err.starts_with("Failed to parse config file"), "unexpected error: {}", err);

        cleanup_test_files(&manager);
    }

    #[test]
    fn test_config_save_rejects_invalid() {
        let manager = create_test_manager();
        let mut config = AppConfig::default();
        config.flame.scoring.sub_stat_divisor = 0;

        assert!(manager.save(&config).is_err());
        assert!(!manager.config_exists(), "invalid config must not be written");

        cleanup_test_files(&manager);
    }

    #[test]
    fn test_config_file_path() {
        let manager = create_test_manager();

        assert!(manager.config_file_path().ends_with("config.json"));
        assert!(manager.config_dir().to_str().unwrap().contains("flame-score"));
    }

    #[test]
    fn test_config_overwrite() {
        let manager = create_test_manager();

        let mut first = AppConfig::default();
        first.ocr.timeout_secs = 3;
        manager.save(&first).unwrap();

        let mut second = AppConfig::default();
        second.ocr.timeout_secs = 30;
        manager.save(&second).unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded.ocr.timeout_secs, 30);

        cleanup_test_files(&manager);
    }
}
