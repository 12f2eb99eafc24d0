use crate::models::stat::{ItemCategory, StatKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which stat a tooltip line talks about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Stat(StatKind),
    Attack,
    MagicAttack,
    AllStat,
    BossDamage,
}

impl LineKind {
    /// Percent lines never carry an enhancement component
    pub fn is_percent(&self) -> bool {
        matches!(self, LineKind::AllStat | LineKind::BossDamage)
    }
}

/// One OCR line matched to a category, with the numbers read from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStatLine {
    pub kind: LineKind,
    pub text: String,
    /// Displayed total, when the line shows one
    pub total: Option<u32>,
    /// Bonus breakdown: base, flame and (when starforced) enhancement
    pub components: Vec<u32>,
}

/// Flame portion isolated from a stat line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlameReading {
    /// No line for this stat, or a line without a bonus breakdown
    Absent,
    Resolved { flame: u32, base: Option<u32> },
    /// Components could not be reconciled; needs a manual value
    Unresolved,
}

impl FlameReading {
    pub fn flame(&self) -> u32 {
        match self {
            FlameReading::Resolved { flame, .. } => *flame,
            _ => 0,
        }
    }

    pub fn base(&self) -> Option<u32> {
        match self {
            FlameReading::Resolved { base, .. } => *base,
            _ => None,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, FlameReading::Unresolved)
    }
}

impl Default for FlameReading {
    fn default() -> Self {
        Self::Absent
    }
}

/// Everything the line extractor learned from one OCR text blob
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtractedFacts {
    pub required_level: u32,
    /// Stat implied by class or weapon keywords
    pub primary_stat: Option<StatKind>,
    /// Enhancement state used for extraction
    pub is_starforced: bool,
    /// Enhancement state as detected from the text alone
    pub starforce_detected: bool,
    pub is_weapon: bool,
    pub uses_magic_attack: bool,
    pub weapon_type: Option<String>,
    pub item_category: ItemCategory,
    /// Base attack (or magic attack for caster weapons)
    pub base_attack: Option<u32>,
    pub lines: Vec<RawStatLine>,
    pub stats: BTreeMap<StatKind, FlameReading>,
    pub attack: FlameReading,
    pub magic_attack: FlameReading,
    pub all_stat: FlameReading,
    pub boss_damage: FlameReading,
}

impl ExtractedFacts {
    pub fn reading(&self, kind: LineKind) -> FlameReading {
        match kind {
            LineKind::Stat(stat) => self.stats.get(&stat).copied().unwrap_or_default(),
            LineKind::Attack => self.attack,
            LineKind::MagicAttack => self.magic_attack,
            LineKind::AllStat => self.all_stat,
            LineKind::BossDamage => self.boss_damage,
        }
    }

    /// Attack line relevant for this item: magic for caster weapons
    pub fn weapon_attack_kind(&self) -> LineKind {
        if self.uses_magic_attack {
            LineKind::MagicAttack
        } else {
            LineKind::Attack
        }
    }
}
