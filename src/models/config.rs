use crate::models::stat::{StatKind, WeaponSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keywords that map to one stat
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatKeywords {
    pub stat: StatKind,
    pub keywords: Vec<String>,
}

/// Literal names a weapon set is printed under
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetNames {
    pub set: WeaponSet,
    pub names: Vec<String>,
}

fn strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Keyword tables used by the line extractor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KeywordConfig {
    /// Class and weapon names per stat, in priority order
    pub main_stat: Vec<StatKeywords>,
    /// Weapon types that scale with magic attack
    pub caster_weapons: Vec<String>,
    /// Line prefixes that identify a stat line
    pub stat_line_aliases: Vec<StatKeywords>,
    pub weapon_sets: Vec<SetNames>,
}

impl KeywordConfig {
    /// Every class/weapon keyword across all stats
    pub fn weapon_keywords(&self) -> impl Iterator<Item = &str> {
        self.main_stat
            .iter()
            .flat_map(|entry| entry.keywords.iter().map(String::as_str))
    }
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            main_stat: vec![
                StatKeywords {
                    stat: StatKind::Str,
                    keywords: strings(&[
                        "Knight", "Warrior", "Axe", "Hammer", "Spear", "Sword", "Saber", "Ellaha",
                        "Pile God", "Desperado", "Hellslayer", "Bladecaster", "Katana", "Polearm",
                        "Siege", "Knuckle", "Cannon",
                    ]),
                },
                StatKeywords {
                    stat: StatKind::Int,
                    keywords: strings(&[
                        "Mage", "Magician", "Dunwitch", "Shining Rod", "Psy-limiter", "Gauntlet",
                        "Wand", "Staff", "Fan", "Summoner",
                    ]),
                },
                StatKeywords {
                    stat: StatKind::Dex,
                    keywords: strings(&[
                        "Archer", "Ranger", "Bow", "Crossbow", "Bowguns", "Whispershot", "Pistol",
                        "Soul Shooter",
                    ]),
                },
                StatKeywords {
                    stat: StatKind::Luk,
                    keywords: strings(&[
                        "Thief", "Assassin", "Dagger", "Guards", "Cane", "Chain", "Ritual",
                        "Chakram", "Blade Lord",
                    ]),
                },
            ],
            caster_weapons: strings(&[
                "Shining Rod", "Psy-limiter", "Gauntlet", "Wand", "Staff", "Fan", "Cane",
                "Summoner",
            ]),
            stat_line_aliases: vec![
                StatKeywords { stat: StatKind::Str, keywords: strings(&["STR"]) },
                StatKeywords { stat: StatKind::Dex, keywords: strings(&["DEX"]) },
                StatKeywords { stat: StatKind::Int, keywords: strings(&["INT"]) },
                StatKeywords { stat: StatKind::Luk, keywords: strings(&["LUK"]) },
                StatKeywords {
                    stat: StatKind::Hp,
                    keywords: strings(&["MaxHP", "Max HP", "HP"]),
                },
            ],
            weapon_sets: vec![
                SetNames { set: WeaponSet::Absolab, names: strings(&["AbsoLab"]) },
                SetNames { set: WeaponSet::Arcane, names: strings(&["Arcane Umbra", "Arcane"]) },
                SetNames { set: WeaponSet::Genesis, names: strings(&["Genesis"]) },
            ],
        }
    }
}

/// Stat thresholds for one required-level range (`max` of `None` is unbounded)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LevelBucket {
    pub min: u32,
    pub max: Option<u32>,
    pub thresholds: Vec<u32>,
}

impl LevelBucket {
    pub fn contains(&self, level: u32) -> bool {
        level >= self.min && self.max.map_or(true, |max| level <= max)
    }
}

/// Base attack value -> weapon flame thresholds
pub type WeaponTierMap = BTreeMap<u32, Vec<u32>>;

/// All threshold tables
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TierTableConfig {
    pub level_buckets: Vec<LevelBucket>,
    pub all_stat: Vec<u32>,
    pub boss_damage: Vec<u32>,
    /// Attack/magic attack on anything that isn't a classified weapon
    pub flat_attack: Vec<u32>,
    pub absolab: WeaponTierMap,
    pub arcane: WeaponTierMap,
    pub genesis: WeaponTierMap,
    pub stat_tier_offset: u32,
    pub weapon_tier_offset: u32,
}

impl TierTableConfig {
    pub fn weapon_table(&self, set: WeaponSet) -> &WeaponTierMap {
        match set {
            WeaponSet::Absolab => &self.absolab,
            WeaponSet::Arcane => &self.arcane,
            WeaponSet::Genesis => &self.genesis,
        }
    }
}

fn multiples(step: u32) -> Vec<u32> {
    (1..=7).map(|i| i * step).collect()
}

fn weapon_map(entries: &[(u32, [u32; 5])]) -> WeaponTierMap {
    entries
        .iter()
        .map(|(base, thresholds)| (*base, thresholds.to_vec()))
        .collect()
}

impl Default for TierTableConfig {
    fn default() -> Self {
        let mut level_buckets: Vec<LevelBucket> = (0..10)
            .map(|k| LevelBucket {
                min: k * 20,
                max: Some(k * 20 + 19),
                thresholds: multiples(k + 1),
            })
            .collect();
        level_buckets.push(LevelBucket { min: 200, max: Some(229), thresholds: multiples(11) });
        level_buckets.push(LevelBucket { min: 230, max: None, thresholds: multiples(12) });

        Self {
            level_buckets,
            all_stat: multiples(1),
            boss_damage: multiples(2),
            flat_attack: multiples(2),
            absolab: weapon_map(&[
                (103, [16, 23, 32, 42, 53]),
                (143, [22, 32, 44, 58, 74]),
                (150, [23, 33, 46, 60, 77]),
                (151, [23, 34, 46, 61, 78]),
                (154, [24, 34, 47, 62, 79]),
                (184, [28, 41, 56, 74, 95]),
                (192, [29, 43, 59, 77, 99]),
                (197, [30, 44, 60, 79, 101]),
                (205, [31, 46, 63, 82, 106]),
                (210, [32, 47, 64, 84, 108]),
                (241, [37, 54, 73, 97, 124]),
                (245, [37, 54, 75, 98, 126]),
            ]),
            arcane: weapon_map(&[
                (149, [27, 40, 55, 72, 92]),
                (206, [38, 55, 75, 99, 127]),
                (216, [39, 58, 79, 104, 133]),
                (218, [40, 58, 80, 105, 135]),
                (221, [40, 59, 81, 106, 136]),
                (264, [48, 70, 96, 127, 163]),
                (276, [50, 73, 101, 133, 170]),
                (283, [51, 75, 103, 136, 175]),
                (295, [54, 78, 108, 142, 182]),
                (302, [55, 80, 110, 145, 186]),
                (347, [63, 92, 126, 167, 214]),
                (353, [64, 94, 129, 170, 218]),
            ]),
            genesis: weapon_map(&[
                (172, [31, 46, 63, 83, 106]),
                (237, [43, 63, 87, 114, 146]),
                (249, [45, 66, 91, 120, 154]),
                (251, [46, 67, 92, 121, 155]),
                (255, [46, 68, 93, 123, 157]),
                (304, [55, 81, 111, 146, 187]),
                (318, [58, 84, 116, 153, 196]),
                (326, [59, 87, 119, 157, 201]),
                (337, [61, 89, 123, 162, 208]),
                (340, [62, 90, 124, 163, 210]),
                (342, [62, 91, 125, 164, 211]),
                (348, [63, 92, 127, 167, 214]),
                (400, [72, 106, 146, 192, 246]),
                (406, [74, 108, 148, 195, 250]),
            ]),
            stat_tier_offset: 1,
            weapon_tier_offset: 3,
        }
    }
}

/// Weights of the aggregate flame score
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    pub sub_stat_divisor: u32,
    pub attack_multiplier: u32,
    pub all_stat_multiplier: u32,
    /// Add weapon attack to the score even though it has its own tier
    pub score_weapon_attack: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            sub_stat_divisor: 12,
            attack_multiplier: 3,
            all_stat_multiplier: 10,
            score_weapon_attack: false,
        }
    }
}

/// Tables and weights driving extraction and tiering
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FlameConfig {
    pub keywords: KeywordConfig,
    pub tiers: TierTableConfig,
    pub scoring: ScoringConfig,
    /// Largest value accepted as manual input
    pub max_manual_value: u32,
}

impl Default for FlameConfig {
    fn default() -> Self {
        Self {
            keywords: KeywordConfig::default(),
            tiers: TierTableConfig::default(),
            scoring: ScoringConfig::default(),
            max_manual_value: 999,
        }
    }
}

fn check_ascending(name: &str, thresholds: &[u32]) -> Result<(), String> {
    if thresholds.is_empty() {
        return Err(format!("Tier table '{}' is empty", name));
    }
    if thresholds.windows(2).any(|pair| pair[0] > pair[1]) {
        return Err(format!(
            "Tier table '{}' is not ascending: {:?}",
            name, thresholds
        ));
    }
    Ok(())
}

impl FlameConfig {
    /// Reject tables the resolver cannot look up consistently
    pub fn validate(&self) -> Result<(), String> {
        let tiers = &self.tiers;

        if tiers.level_buckets.is_empty() {
            return Err("At least one level bucket is required".to_string());
        }
        for bucket in &tiers.level_buckets {
            check_ascending(&format!("level {}+", bucket.min), &bucket.thresholds)?;
            if bucket.max.map_or(false, |max| max < bucket.min) {
                return Err(format!(
                    "Level bucket starting at {} ends before it starts",
                    bucket.min
                ));
            }
        }

        check_ascending("all_stat", &tiers.all_stat)?;
        check_ascending("boss_damage", &tiers.boss_damage)?;
        check_ascending("flat_attack", &tiers.flat_attack)?;

        for set in WeaponSet::ALL {
            for (base, thresholds) in tiers.weapon_table(set) {
                check_ascending(&format!("{} {}", set, base), thresholds)?;
            }
        }

        if self.scoring.sub_stat_divisor == 0 {
            return Err("sub_stat_divisor must be greater than zero".to_string());
        }

        Ok(())
    }
}

/// OCR server connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OcrServerConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Text boxes scored below this are dropped
    pub min_confidence: f64,
}

impl Default for OcrServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:39835".to_string(),
            timeout_secs: 10,
            min_confidence: 0.5,
        }
    }
}

/// Logging output settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub ocr: OcrServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub flame: FlameConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();

        assert_eq!(config.ocr.base_url, "http://127.0.0.1:39835");
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
        assert_eq!(config.flame.max_manual_value, 999);
        assert_eq!(config.flame.scoring.sub_stat_divisor, 12);
        assert!(!config.flame.scoring.score_weapon_attack);
    }

    #[test]
    fn test_default_level_buckets() {
        let tiers = TierTableConfig::default();

        assert_eq!(tiers.level_buckets.len(), 12);
        assert_eq!(tiers.level_buckets[0].thresholds, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(tiers.level_buckets[8].min, 160);
        assert_eq!(tiers.level_buckets[8].thresholds, vec![9, 18, 27, 36, 45, 54, 63]);
        assert_eq!(tiers.level_buckets[10].max, Some(229));
        assert_eq!(tiers.level_buckets[11].max, None);
        assert!(tiers.level_buckets[11].contains(u32::MAX));
    }

    #[test]
    fn test_level_buckets_cover_every_level() {
        let tiers = TierTableConfig::default();
        for level in 0..=300 {
            let matching = tiers
                .level_buckets
                .iter()
                .filter(|bucket| bucket.contains(level))
                .count();
            assert_eq!(matching, 1, "level {} should fall in exactly one bucket", level);
        }
    }

    #[test]
    fn test_weapon_tables_do_not_share_base_values() {
        let tiers = TierTableConfig::default();
        for base in tiers.absolab.keys() {
            assert!(!tiers.arcane.contains_key(base), "{} in absolab and arcane", base);
            assert!(!tiers.genesis.contains_key(base), "{} in absolab and genesis", base);
        }
        for base in tiers.arcane.keys() {
            assert!(!tiers.genesis.contains_key(base), "{} in arcane and genesis", base);
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(FlameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_descending_table() {
        let mut config = FlameConfig::default();
        config.tiers.boss_damage = vec![2, 4, 3];

        let err = config.validate().unwrap_err();
        assert!(err.contains("boss_damage"), "unexpected error: {}", err);
    }

    #[test]
    fn test_validate_rejects_zero_divisor() {
        let mut config = FlameConfig::default();
        config.scoring.sub_stat_divisor = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_missing_buckets() {
        let mut config = FlameConfig::default();
        config.tiers.level_buckets.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_app_config_serialization() {
        let config = AppConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();

        let deserialized: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let json = r#"{ "ocr": { "base_url": "http://10.0.0.2:8000" } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.ocr.base_url, "http://10.0.0.2:8000");
        assert_eq!(config.ocr.timeout_secs, 10);
        assert_eq!(config.flame, FlameConfig::default());
    }

    #[test]
    fn test_weapon_keywords_union() {
        let keywords = KeywordConfig::default();
        let all: Vec<&str> = keywords.weapon_keywords().collect();

        assert!(all.contains(&"Katana"));
        assert!(all.contains(&"Shining Rod"));
        assert!(all.contains(&"Soul Shooter"));
        assert!(all.contains(&"Chakram"));
    }
}
