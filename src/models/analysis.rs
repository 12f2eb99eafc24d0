use crate::models::stat::{ItemCategory, StatCategory, StatKind, WeaponSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller-supplied settings for one analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Falls back to the stat implied by class/weapon keywords
    pub main_stat: Option<StatKind>,
    pub sub_stat: Option<StatKind>,
    /// Falls back to detection from the tooltip text
    pub is_starforced: Option<bool>,
}

impl AnalysisRequest {
    pub fn new(main_stat: StatKind, sub_stat: StatKind, is_starforced: bool) -> Self {
        Self {
            main_stat: Some(main_stat),
            sub_stat: Some(sub_stat),
            is_starforced: Some(is_starforced),
        }
    }
}

/// Discrete quality rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Rank(u32),
    /// The category applies but no table covers it (e.g. unlisted weapon base)
    Unavailable,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Rank(rank) => write!(f, "T{}", rank),
            Tier::Unavailable => f.write_str("-"),
        }
    }
}

/// Tier paired with the tag of the category it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierLabel {
    pub category: StatCategory,
    pub tag: String,
    pub tier: Tier,
}

impl fmt::Display for TierLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.tier, self.tag)
    }
}

/// A category the caller must fill in by hand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualStatRequest {
    pub category: StatCategory,
    pub key: String,
    pub label: String,
}

/// Isolated flame value per category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlameValues {
    pub main_stat: u32,
    pub sub_stat: u32,
    pub attack: u32,
    pub magic_attack: u32,
    pub all_stat_percent: u32,
    pub boss_damage_percent: u32,
}

impl FlameValues {
    pub fn get(&self, category: StatCategory) -> u32 {
        match category {
            StatCategory::MainStat => self.main_stat,
            StatCategory::SubStat => self.sub_stat,
            StatCategory::Attack => self.attack,
            StatCategory::MagicAttack => self.magic_attack,
            StatCategory::AllStatPercent => self.all_stat_percent,
            StatCategory::BossDamagePercent => self.boss_damage_percent,
        }
    }

    pub fn set(&mut self, category: StatCategory, value: u32) {
        match category {
            StatCategory::MainStat => self.main_stat = value,
            StatCategory::SubStat => self.sub_stat = value,
            StatCategory::Attack => self.attack = value,
            StatCategory::MagicAttack => self.magic_attack = value,
            StatCategory::AllStatPercent => self.all_stat_percent = value,
            StatCategory::BossDamagePercent => self.boss_damage_percent = value,
        }
    }
}

/// Final record of one analysis pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub required_level: u32,
    pub main_stat: Option<StatKind>,
    pub sub_stat: Option<StatKind>,
    pub is_starforced: bool,
    pub is_weapon: bool,
    pub uses_magic_attack: bool,
    pub item_category: ItemCategory,
    pub base_attack: Option<u32>,
    pub flames: FlameValues,
    /// One entry per category with a nonzero flame value
    pub tiers: Vec<TierLabel>,
    pub score: u32,
    /// Categories still waiting for a user-supplied value, in category order
    pub manual_input_required: Vec<ManualStatRequest>,
    /// The weapon set must be picked among [`WeaponSet::ALL`]
    pub weapon_set_required: bool,
}

impl AnalysisResult {
    pub fn is_complete(&self) -> bool {
        self.manual_input_required.is_empty() && !self.weapon_set_required
    }

    pub fn tier_for(&self, category: StatCategory) -> Option<Tier> {
        self.tiers
            .iter()
            .find(|label| label.category == category)
            .map(|label| label.tier)
    }

    /// Attack flame of the kind that matters for this item
    pub fn attack_flame(&self) -> u32 {
        if self.uses_magic_attack {
            self.flames.magic_attack
        } else {
            self.flames.attack
        }
    }

    /// Three-line human readable report: flame stats, tiers, score
    pub fn summary(&self) -> String {
        let stat_name = |stat: Option<StatKind>| {
            stat.map(|s| s.to_string())
                .unwrap_or_else(|| "?".to_string())
        };

        let attack = if self.uses_magic_attack {
            format!("MATT: {}", self.flames.magic_attack)
        } else {
            format!("ATK: {}", self.flames.attack)
        };

        let stat_line = format!(
            "Main Stat: {} | Sub Stat: {} | {} | All Stat%: {} | Boss Damage: {}%",
            self.flames.main_stat,
            self.flames.sub_stat,
            attack,
            self.flames.all_stat_percent,
            self.flames.boss_damage_percent
        );

        let tier_line = if self.tiers.is_empty() {
            "No flame detected".to_string()
        } else {
            self.tiers
                .iter()
                .map(|label| label.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };

        format!(
            "{}\n{}\nFlame Score: {} ({})",
            stat_line,
            tier_line,
            self.score,
            stat_name(self.main_stat)
        )
    }
}

/// Where a single analysis stands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisState {
    Complete(AnalysisResult),
    /// Waiting for one of the three named sets
    AwaitingWeaponSet { choices: Vec<WeaponSet> },
    AwaitingManualStat(ManualStatRequest),
}
