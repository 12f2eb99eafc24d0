use crate::models::config::FlameConfig;
use crate::models::facts::{ExtractedFacts, FlameReading, LineKind, RawStatLine};
use crate::models::stat::{ItemCategory, StatKind, WeaponSet};
use crate::services::tier_table::set_for_base_attack;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

/// "REQ LEV: 160", tolerating LEY/LEU misreads and an optional "EL" suffix
static REQ_LEVEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)REQ\.?\s*LE[VYU](?:EL)?\.?[\s:.]*(\d+)").unwrap());
/// A number followed somewhere by a parenthesized group
static CANDIDATE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+.*\(.+\)").unwrap());
static PAREN_GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^)]*)\)?").unwrap());
static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());
static WEAPON_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:weapon\s+)?type\s*[:=]\s*(.+)").unwrap());

fn parse_number(digits: &str) -> Option<u32> {
    digits.parse().ok()
}

/// Display total and bonus components of one line
///
/// Parenthesized form: "STR: +63 (20 + 28 + 15)". Inline form: "STR +63 20 28 15",
/// where the first number is only taken as a total when it equals the sum of the rest.
pub fn read_numbers(line: &str) -> Option<(Option<u32>, Vec<u32>)> {
    if let Some(caps) = PAREN_GROUP.captures(line) {
        let group_start = caps.get(0).map_or(0, |m| m.start());
        let inner = caps.get(1).map_or("", |m| m.as_str());

        let total = NUMBER
            .find(&line[..group_start])
            .and_then(|m| parse_number(m.as_str()));
        let components: Vec<u32> = inner
            .split('+')
            .filter_map(|part| NUMBER.find(part).and_then(|m| parse_number(m.as_str())))
            .collect();

        if total.is_none() && components.is_empty() {
            return None;
        }
        return Some((total, components));
    }

    let numbers: Vec<u32> = NUMBER
        .find_iter(line)
        .filter_map(|m| parse_number(m.as_str()))
        .collect();

    match numbers.as_slice() {
        [] => None,
        [only] => Some((Some(*only), Vec::new())),
        [first, rest @ ..]
            if rest.len() >= 2 && u64::from(*first) == rest.iter().map(|&n| u64::from(n)).sum::<u64>() =>
        {
            Some((Some(*first), rest.to_vec()))
        }
        _ => Some((None, numbers)),
    }
}

/// Flame portion of a line given the enhancement state
///
/// Stat and attack lines need 2 components (base, flame) or, when starforced,
/// 3 (base, flame, enhancement). A shown total must equal the component sum.
pub fn flame_reading(
    kind: LineKind,
    total: Option<u32>,
    components: &[u32],
    is_starforced: bool,
) -> FlameReading {
    if kind.is_percent() {
        let flame = match components {
            [_, second, ..] => *second,
            [only] => *only,
            [] => total.unwrap_or(0),
        };
        return FlameReading::Resolved { flame, base: None };
    }

    match components.len() {
        0 => FlameReading::Absent,
        2 | 3 => {
            if components.len() == 3 && !is_starforced {
                return FlameReading::Unresolved;
            }
            let sum: u64 = components.iter().map(|&n| u64::from(n)).sum();
            if total.map_or(false, |total| u64::from(total) != sum) {
                return FlameReading::Unresolved;
            }
            let base = matches!(kind, LineKind::Attack | LineKind::MagicAttack)
                .then(|| components[0]);
            FlameReading::Resolved {
                flame: components[1],
                base,
            }
        }
        _ => FlameReading::Unresolved,
    }
}

fn starts_with_word(line: &str, prefix: &str) -> bool {
    let Some(head) = line.get(..prefix.len()) else {
        return false;
    };
    head.eq_ignore_ascii_case(prefix)
        && !line[prefix.len()..]
            .chars()
            .next()
            .map_or(false, |c| c.is_ascii_alphabetic())
}

/// Turns raw OCR text into per-category readings and item facts
#[derive(Debug, Clone)]
pub struct LineExtractor {
    config: Arc<FlameConfig>,
}

impl LineExtractor {
    pub fn new(config: Arc<FlameConfig>) -> Self {
        Self { config }
    }

    /// Never fails: missing or garbled data degrades to zero/absent readings
    pub fn extract(&self, text: &str, is_starforced: Option<bool>) -> ExtractedFacts {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let required_level = Self::required_level(&lines);
        let primary_stat = self.primary_stat(text);
        let starforce_detected = Self::detect_starforce(&lines);
        let is_starforced = is_starforced.unwrap_or(starforce_detected);

        let is_weapon = self
            .config
            .keywords
            .weapon_keywords()
            .any(|keyword| text.contains(keyword));
        let weapon_type = lines.iter().find_map(|line| {
            WEAPON_TYPE
                .captures(line)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
        });
        let uses_magic_attack = is_weapon && self.is_caster_weapon(weapon_type.as_deref(), text);

        debug!(
            required_level,
            ?primary_stat,
            is_starforced,
            starforce_detected,
            is_weapon,
            uses_magic_attack,
            "item facts"
        );

        let mut facts = ExtractedFacts {
            required_level,
            primary_stat,
            is_starforced,
            starforce_detected,
            is_weapon,
            uses_magic_attack,
            weapon_type,
            ..ExtractedFacts::default()
        };

        for line in &lines {
            let Some(kind) = self.classify(line) else {
                continue;
            };
            let Some((total, components)) = read_numbers(line) else {
                continue;
            };

            let raw = RawStatLine {
                kind,
                text: line.to_string(),
                total,
                components,
            };

            if Self::has_reading(&facts, kind) {
                debug!(line = %raw.text, "ignoring repeated line for {:?}", kind);
            } else {
                let reading = flame_reading(kind, raw.total, &raw.components, is_starforced);
                debug!(line = %raw.text, ?reading, "stat line");
                Self::store_reading(&mut facts, kind, reading);
            }
            facts.lines.push(raw);
        }

        facts.base_attack = facts.reading(facts.weapon_attack_kind()).base();
        facts.item_category = self.item_category(text, facts.base_attack);
        debug!(base_attack = ?facts.base_attack, item_category = ?facts.item_category, "weapon context");

        facts
    }

    fn required_level(lines: &[&str]) -> u32 {
        lines
            .iter()
            .find_map(|line| {
                REQ_LEVEL
                    .captures(line)
                    .and_then(|caps| caps.get(1))
                    .and_then(|m| parse_number(m.as_str()))
            })
            .unwrap_or(0)
    }

    fn primary_stat(&self, text: &str) -> Option<StatKind> {
        self.config
            .keywords
            .main_stat
            .iter()
            .find(|entry| entry.keywords.iter().any(|k| text.contains(k.as_str())))
            .map(|entry| entry.stat)
    }

    /// Starforced when any candidate line shows three bonus components
    fn detect_starforce(lines: &[&str]) -> bool {
        lines
            .iter()
            .filter(|line| CANDIDATE_LINE.is_match(line))
            .filter_map(|line| read_numbers(line))
            .any(|(_, components)| components.len() == 3)
    }

    /// Case-insensitive against the type line, case-sensitive against the whole text
    /// so set names like "Arcane" don't read as "Cane"
    fn is_caster_weapon(&self, weapon_type: Option<&str>, text: &str) -> bool {
        let keywords = &self.config.keywords.caster_weapons;
        match weapon_type {
            Some(weapon_type) => {
                let weapon_type = weapon_type.to_lowercase();
                keywords
                    .iter()
                    .any(|keyword| weapon_type.contains(&keyword.to_lowercase()))
            }
            None => keywords.iter().any(|keyword| text.contains(keyword.as_str())),
        }
    }

    /// First matching category wins: stat name, attack, magic, all stat, boss
    fn classify(&self, line: &str) -> Option<LineKind> {
        for entry in &self.config.keywords.stat_line_aliases {
            if entry
                .keywords
                .iter()
                .any(|alias| starts_with_word(line, alias))
            {
                return Some(LineKind::Stat(entry.stat));
            }
        }

        let lower = line.to_lowercase();
        if lower.contains("attack") && !lower.contains("magic") {
            Some(LineKind::Attack)
        } else if lower.contains("magic") || lower.contains("m.att") {
            Some(LineKind::MagicAttack)
        } else if lower.contains("all") {
            Some(LineKind::AllStat)
        } else if lower.contains("boss") {
            Some(LineKind::BossDamage)
        } else {
            None
        }
    }

    fn has_reading(facts: &ExtractedFacts, kind: LineKind) -> bool {
        facts.lines.iter().any(|line| line.kind == kind)
    }

    fn store_reading(facts: &mut ExtractedFacts, kind: LineKind, reading: FlameReading) {
        match kind {
            LineKind::Stat(stat) => {
                facts.stats.insert(stat, reading);
            }
            LineKind::Attack => facts.attack = reading,
            LineKind::MagicAttack => facts.magic_attack = reading,
            LineKind::AllStat => facts.all_stat = reading,
            LineKind::BossDamage => facts.boss_damage = reading,
        }
    }

    /// Literal set name first, then reverse lookup of the base attack value
    fn item_category(&self, text: &str, base_attack: Option<u32>) -> ItemCategory {
        let lower = text.to_lowercase();
        let by_name: Option<WeaponSet> = self
            .config
            .keywords
            .weapon_sets
            .iter()
            .find(|entry| {
                entry
                    .names
                    .iter()
                    .any(|name| lower.contains(&name.to_lowercase()))
            })
            .map(|entry| entry.set);

        by_name
            .or_else(|| base_attack.and_then(|base| set_for_base_attack(&self.config.tiers, base)))
            .map(ItemCategory::Set)
            .unwrap_or(ItemCategory::Unknown)
    }
}
