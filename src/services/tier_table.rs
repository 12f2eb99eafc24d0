use crate::models::config::{LevelBucket, TierTableConfig};
use crate::models::stat::WeaponSet;

/// Ascending thresholds plus the tier number of the first threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierTable<'a> {
    pub thresholds: &'a [u32],
    pub offset: u32,
}

impl<'a> TierTable<'a> {
    pub fn new(thresholds: &'a [u32], offset: u32) -> Self {
        Self { thresholds, offset }
    }

    /// `offset + i` for the largest `i` with `value >= thresholds[i]`, 0 below the first
    pub fn tier(&self, value: u32) -> u32 {
        let satisfied = self.thresholds.partition_point(|&threshold| threshold <= value);
        if satisfied == 0 {
            0
        } else {
            self.offset + (satisfied as u32 - 1)
        }
    }
}

/// Level bucket for a required level; level 0 or an uncovered level uses the first bucket
pub fn level_bucket(config: &TierTableConfig, required_level: u32) -> Option<&LevelBucket> {
    if required_level > 0 {
        if let Some(bucket) = config
            .level_buckets
            .iter()
            .find(|bucket| bucket.contains(required_level))
        {
            return Some(bucket);
        }
    }
    config.level_buckets.first()
}

pub fn stat_table(config: &TierTableConfig, required_level: u32) -> TierTable<'_> {
    let thresholds = level_bucket(config, required_level)
        .map(|bucket| bucket.thresholds.as_slice())
        .unwrap_or(&[]);
    TierTable::new(thresholds, config.stat_tier_offset)
}

pub fn all_stat_table(config: &TierTableConfig) -> TierTable<'_> {
    TierTable::new(&config.all_stat, config.stat_tier_offset)
}

pub fn boss_table(config: &TierTableConfig) -> TierTable<'_> {
    TierTable::new(&config.boss_damage, config.stat_tier_offset)
}

pub fn flat_attack_table(config: &TierTableConfig) -> TierTable<'_> {
    TierTable::new(&config.flat_attack, config.stat_tier_offset)
}

/// Weapon table for an exact base attack value; no interpolation between bases
pub fn weapon_table(config: &TierTableConfig, set: WeaponSet, base_attack: u32) -> Option<TierTable<'_>> {
    config
        .weapon_table(set)
        .get(&base_attack)
        .map(|thresholds| TierTable::new(thresholds, config.weapon_tier_offset))
}

/// First set whose table lists this base attack value
pub fn set_for_base_attack(config: &TierTableConfig, base_attack: u32) -> Option<WeaponSet> {
    WeaponSet::ALL
        .into_iter()
        .find(|set| config.weapon_table(*set).contains_key(&base_attack))
}
