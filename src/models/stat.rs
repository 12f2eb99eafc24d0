use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Character attribute an item can be balanced around
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatKind {
    Str,
    Dex,
    Int,
    Luk,
    Hp,
}

impl StatKind {
    pub const ALL: [StatKind; 5] = [
        StatKind::Str,
        StatKind::Dex,
        StatKind::Int,
        StatKind::Luk,
        StatKind::Hp,
    ];

    /// Name as printed on the tooltip
    pub fn as_str(&self) -> &'static str {
        match self {
            StatKind::Str => "STR",
            StatKind::Dex => "DEX",
            StatKind::Int => "INT",
            StatKind::Luk => "LUK",
            StatKind::Hp => "HP",
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        StatKind::ALL
            .into_iter()
            .find(|stat| stat.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown stat: '{}' (expected STR, DEX, INT, LUK or HP)", s))
    }
}

/// Flame categories that take part in tiering and scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatCategory {
    MainStat,
    SubStat,
    Attack,
    MagicAttack,
    AllStatPercent,
    BossDamagePercent,
}

impl StatCategory {
    /// Category order used when asking for manual values
    pub const ALL: [StatCategory; 6] = [
        StatCategory::MainStat,
        StatCategory::SubStat,
        StatCategory::Attack,
        StatCategory::MagicAttack,
        StatCategory::AllStatPercent,
        StatCategory::BossDamagePercent,
    ];

    /// Stable key handed to callers collecting manual input
    pub fn key(&self) -> &'static str {
        match self {
            StatCategory::MainStat => "main",
            StatCategory::SubStat => "sub",
            StatCategory::Attack => "attack",
            StatCategory::MagicAttack => "magic",
            StatCategory::AllStatPercent => "allStatPercent",
            StatCategory::BossDamagePercent => "boss",
        }
    }
}

/// Top-tier weapon equipment line with its own base-attack tier tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponSet {
    Absolab,
    Arcane,
    Genesis,
}

impl WeaponSet {
    pub const ALL: [WeaponSet; 3] = [WeaponSet::Absolab, WeaponSet::Arcane, WeaponSet::Genesis];

    pub fn display_name(&self) -> &'static str {
        match self {
            WeaponSet::Absolab => "AbsoLab",
            WeaponSet::Arcane => "Arcane",
            WeaponSet::Genesis => "Genesis",
        }
    }
}

impl fmt::Display for WeaponSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for WeaponSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        WeaponSet::ALL
            .into_iter()
            .find(|set| set.display_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                format!(
                    "Unknown weapon set: '{}' (expected AbsoLab, Arcane or Genesis)",
                    s
                )
            })
    }
}

/// Weapon set as resolved from the tooltip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Set(WeaponSet),
    Unknown,
}

impl ItemCategory {
    pub fn weapon_set(&self) -> Option<WeaponSet> {
        match self {
            ItemCategory::Set(set) => Some(*set),
            ItemCategory::Unknown => None,
        }
    }
}

impl Default for ItemCategory {
    fn default() -> Self {
        Self::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_kind_from_str_case_insensitive() {
        assert_eq!("str".parse::<StatKind>().unwrap(), StatKind::Str);
        assert_eq!(" Luk ".parse::<StatKind>().unwrap(), StatKind::Luk);
        assert_eq!("HP".parse::<StatKind>().unwrap(), StatKind::Hp);
        assert!("ATK".parse::<StatKind>().is_err());
    }

    #[test]
    fn test_stat_kind_serialization() {
        assert_eq!(serde_json::to_string(&StatKind::Int).unwrap(), "\"INT\"");
        let parsed: StatKind = serde_json::from_str("\"DEX\"").unwrap();
        assert_eq!(parsed, StatKind::Dex);
    }

    #[test]
    fn test_weapon_set_from_str() {
        assert_eq!("absolab".parse::<WeaponSet>().unwrap(), WeaponSet::Absolab);
        assert_eq!("ARCANE".parse::<WeaponSet>().unwrap(), WeaponSet::Arcane);
        assert_eq!("Genesis".parse::<WeaponSet>().unwrap(), WeaponSet::Genesis);
        assert!("Fafnir".parse::<WeaponSet>().is_err());
    }

    #[test]
    fn test_category_keys_are_unique() {
        let mut keys: Vec<&str> = StatCategory::ALL.iter().map(|c| c.key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), StatCategory::ALL.len());
    }
}
