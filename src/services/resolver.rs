use crate::models::analysis::{
    AnalysisRequest, AnalysisResult, FlameValues, ManualStatRequest, Tier, TierLabel,
};
use crate::models::config::FlameConfig;
use crate::models::facts::{ExtractedFacts, FlameReading, LineKind};
use crate::models::stat::{ItemCategory, StatCategory, StatKind, WeaponSet};
use crate::services::tier_table::{
    all_stat_table, boss_table, flat_attack_table, stat_table, weapon_table,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Values supplied by the caller after the first pass
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ManualOverrides {
    pub values: BTreeMap<StatCategory, u32>,
    pub weapon_set: Option<WeaponSet>,
}

/// Stats, attack kind and weapon set the resolver works with for one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Selection {
    main_stat: Option<StatKind>,
    sub_stat: Option<StatKind>,
    attack: StatCategory,
    weapon_set: Option<WeaponSet>,
}

fn line_kind(category: StatCategory, selection: &Selection) -> Option<LineKind> {
    match category {
        StatCategory::MainStat => selection.main_stat.map(LineKind::Stat),
        StatCategory::SubStat => selection.sub_stat.map(LineKind::Stat),
        StatCategory::Attack => Some(LineKind::Attack),
        StatCategory::MagicAttack => Some(LineKind::MagicAttack),
        StatCategory::AllStatPercent => Some(LineKind::AllStat),
        StatCategory::BossDamagePercent => Some(LineKind::BossDamage),
    }
}

fn tag(category: StatCategory, selection: &Selection) -> String {
    match category {
        StatCategory::MainStat | StatCategory::SubStat => line_kind(category, selection)
            .and_then(|kind| match kind {
                LineKind::Stat(stat) => Some(stat.to_string()),
                _ => None,
            })
            .unwrap_or_default(),
        StatCategory::Attack => "ATK".to_string(),
        StatCategory::MagicAttack => "MATT".to_string(),
        StatCategory::AllStatPercent => "All Stat%".to_string(),
        StatCategory::BossDamagePercent => "Boss".to_string(),
    }
}

/// Human readable name used when asking for a manual value
fn manual_label(category: StatCategory, selection: &Selection) -> String {
    match category {
        StatCategory::MainStat => format!("Main Stat ({})", tag(category, selection)),
        StatCategory::SubStat => format!("Sub Stat ({})", tag(category, selection)),
        StatCategory::Attack => "Attack Power".to_string(),
        StatCategory::MagicAttack => "Magic Attack".to_string(),
        StatCategory::AllStatPercent => "All Stat%".to_string(),
        StatCategory::BossDamagePercent => "Boss Damage%".to_string(),
    }
}

/// Maps isolated flame values to tiers and the aggregate score
#[derive(Debug, Clone)]
pub struct TierResolver {
    config: Arc<FlameConfig>,
}

impl TierResolver {
    pub fn new(config: Arc<FlameConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FlameConfig {
        &self.config
    }

    /// Pure and deterministic: the same facts, request and overrides give the same result
    pub fn resolve(
        &self,
        facts: &ExtractedFacts,
        request: &AnalysisRequest,
        overrides: &ManualOverrides,
    ) -> AnalysisResult {
        let selection = self.select(facts, request, overrides);
        let relevant = self.relevant_categories(&selection);

        let mut flames = FlameValues::default();
        let mut manual_input_required = Vec::new();

        for category in StatCategory::ALL {
            let reading = line_kind(category, &selection)
                .map(|kind| facts.reading(kind))
                .unwrap_or(FlameReading::Absent);

            match overrides.values.get(&category) {
                Some(value) => flames.set(category, *value),
                None => {
                    flames.set(category, reading.flame());
                    if reading.is_unresolved() && relevant.contains(&category) {
                        manual_input_required.push(ManualStatRequest {
                            category,
                            key: category.key().to_string(),
                            label: manual_label(category, &selection),
                        });
                    }
                }
            }
        }

        let weapon_set_required = facts.is_weapon && selection.weapon_set.is_none();

        let tiers: Vec<TierLabel> = relevant
            .iter()
            .filter(|category| {
                !manual_input_required
                    .iter()
                    .any(|pending| pending.category == **category)
            })
            .filter(|category| flames.get(**category) > 0)
            .filter_map(|category| {
                self.tier_for(*category, flames.get(*category), facts, selection.weapon_set)
                    .map(|tier| TierLabel {
                        category: *category,
                        tag: tag(*category, &selection),
                        tier,
                    })
            })
            .collect();

        let score = self.score(&flames, selection.attack, facts.is_weapon);

        debug!(
            score,
            pending = manual_input_required.len(),
            weapon_set_required,
            "resolved flame tiers"
        );

        AnalysisResult {
            required_level: facts.required_level,
            main_stat: selection.main_stat,
            sub_stat: selection.sub_stat,
            is_starforced: facts.is_starforced,
            is_weapon: facts.is_weapon,
            uses_magic_attack: selection.attack == StatCategory::MagicAttack,
            item_category: selection
                .weapon_set
                .map(ItemCategory::Set)
                .unwrap_or(ItemCategory::Unknown),
            base_attack: facts.base_attack,
            flames,
            tiers,
            score,
            manual_input_required,
            weapon_set_required,
        }
    }

    /// Tier of one category's flame value
    ///
    /// `None` while a weapon's set is still unknown. Weapon attack uses the set's
    /// base-attack table; anything else that isn't a weapon uses the flat table.
    pub fn tier_for(
        &self,
        category: StatCategory,
        value: u32,
        facts: &ExtractedFacts,
        weapon_set: Option<WeaponSet>,
    ) -> Option<Tier> {
        let tiers = &self.config.tiers;
        let rank = match category {
            StatCategory::MainStat | StatCategory::SubStat => {
                stat_table(tiers, facts.required_level).tier(value)
            }
            StatCategory::AllStatPercent => all_stat_table(tiers).tier(value),
            StatCategory::BossDamagePercent => boss_table(tiers).tier(value),
            StatCategory::Attack | StatCategory::MagicAttack => {
                if !facts.is_weapon {
                    flat_attack_table(tiers).tier(value)
                } else {
                    let set = weapon_set?;
                    match facts
                        .base_attack
                        .and_then(|base| weapon_table(tiers, set, base))
                    {
                        Some(table) => table.tier(value),
                        None => return Some(Tier::Unavailable),
                    }
                }
            }
        };
        Some(Tier::Rank(rank))
    }

    /// main + sub / divisor + attack x mult (non-weapons only by default) + all stat x mult
    pub fn score(&self, flames: &FlameValues, attack: StatCategory, is_weapon: bool) -> u32 {
        let scoring = &self.config.scoring;

        let sub = flames.sub_stat / scoring.sub_stat_divisor.max(1);
        let attack = if !is_weapon || scoring.score_weapon_attack {
            flames.get(attack).saturating_mul(scoring.attack_multiplier)
        } else {
            0
        };
        let all_stat = flames
            .all_stat_percent
            .saturating_mul(scoring.all_stat_multiplier);

        flames
            .main_stat
            .saturating_add(sub)
            .saturating_add(attack)
            .saturating_add(all_stat)
    }

    fn select(
        &self,
        facts: &ExtractedFacts,
        request: &AnalysisRequest,
        overrides: &ManualOverrides,
    ) -> Selection {
        let main_stat = request.main_stat.or(facts.primary_stat);
        let sub_stat = request.sub_stat.filter(|sub| Some(*sub) != main_stat);

        let attack = if facts.is_weapon {
            match facts.weapon_attack_kind() {
                LineKind::MagicAttack => StatCategory::MagicAttack,
                _ => StatCategory::Attack,
            }
        } else {
            Self::non_weapon_attack(facts, main_stat)
        };

        Selection {
            main_stat,
            sub_stat,
            attack,
            weapon_set: overrides.weapon_set.or(facts.item_category.weapon_set()),
        }
    }

    /// Attack kind actually present on a non-weapon, preferring magic for INT builds
    fn non_weapon_attack(facts: &ExtractedFacts, main_stat: Option<StatKind>) -> StatCategory {
        let present = |reading: FlameReading| reading != FlameReading::Absent;

        if main_stat == Some(StatKind::Int) && present(facts.magic_attack) {
            StatCategory::MagicAttack
        } else if present(facts.attack) {
            StatCategory::Attack
        } else if present(facts.magic_attack) {
            StatCategory::MagicAttack
        } else {
            StatCategory::Attack
        }
    }

    fn relevant_categories(&self, selection: &Selection) -> Vec<StatCategory> {
        StatCategory::ALL
            .into_iter()
            .filter(|category| match category {
                StatCategory::MainStat => selection.main_stat.is_some(),
                StatCategory::SubStat => selection.sub_stat.is_some(),
                StatCategory::Attack | StatCategory::MagicAttack => *category == selection.attack,
                StatCategory::AllStatPercent | StatCategory::BossDamagePercent => true,
            })
            .collect()
    }
}
