use crate::models::analysis::{AnalysisRequest, AnalysisResult, AnalysisState};
use crate::models::config::FlameConfig;
use crate::models::facts::ExtractedFacts;
use crate::models::stat::WeaponSet;
use crate::services::extractor::LineExtractor;
use crate::services::resolver::{ManualOverrides, TierResolver};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

/// Entry point: raw OCR text in, resumable analysis session out
#[derive(Debug, Clone)]
pub struct FlameAnalyzer {
    config: Arc<FlameConfig>,
    extractor: LineExtractor,
    resolver: TierResolver,
}

impl Default for FlameAnalyzer {
    fn default() -> Self {
        Self::new(FlameConfig::default())
    }
}

impl FlameAnalyzer {
    pub fn new(config: FlameConfig) -> Self {
        Self::with_shared(Arc::new(config))
    }

    pub fn with_shared(config: Arc<FlameConfig>) -> Self {
        Self {
            extractor: LineExtractor::new(config.clone()),
            resolver: TierResolver::new(config.clone()),
            config,
        }
    }

    pub fn config(&self) -> &FlameConfig {
        &self.config
    }

    /// Extract and resolve one tooltip
    pub fn analyze(&self, text: &str, request: &AnalysisRequest) -> FlameSession {
        let facts = self.extractor.extract(text, request.is_starforced);
        let session = FlameSession::start(facts, *request, self.resolver.clone());

        info!(
            score = session.result().score,
            complete = session.result().is_complete(),
            "analyzed flame text"
        );
        session
    }

    /// Independent texts analyzed in parallel, results in input order
    pub fn analyze_batch(&self, texts: &[String], request: &AnalysisRequest) -> Vec<FlameSession> {
        texts
            .par_iter()
            .map(|text| self.analyze(text, request))
            .collect()
    }
}

/// One item's analysis, waiting on the caller for any missing input
///
/// The weapon set question comes first, then manual stats in category order.
/// Every accepted answer re-runs the resolver with all answers given so far.
#[derive(Debug, Clone)]
pub struct FlameSession {
    facts: ExtractedFacts,
    request: AnalysisRequest,
    overrides: ManualOverrides,
    resolver: TierResolver,
    result: AnalysisResult,
}

impl FlameSession {
    fn start(facts: ExtractedFacts, request: AnalysisRequest, resolver: TierResolver) -> Self {
        let overrides = ManualOverrides::default();
        let result = resolver.resolve(&facts, &request, &overrides);
        Self {
            facts,
            request,
            overrides,
            resolver,
            result,
        }
    }

    pub fn state(&self) -> AnalysisState {
        if self.result.weapon_set_required {
            AnalysisState::AwaitingWeaponSet {
                choices: WeaponSet::ALL.to_vec(),
            }
        } else if let Some(pending) = self.result.manual_input_required.first() {
            AnalysisState::AwaitingManualStat(pending.clone())
        } else {
            AnalysisState::Complete(self.result.clone())
        }
    }

    /// Current result, partial while input is still pending
    pub fn result(&self) -> &AnalysisResult {
        &self.result
    }

    pub fn into_result(self) -> AnalysisResult {
        self.result
    }

    pub fn facts(&self) -> &ExtractedFacts {
        &self.facts
    }

    pub fn request(&self) -> &AnalysisRequest {
        &self.request
    }

    pub fn is_complete(&self) -> bool {
        self.result.is_complete()
    }

    /// Parse a manual entry such as "27" for the stat currently asked for
    pub fn supply_stat(&mut self, input: &str) -> Result<&AnalysisResult, String> {
        let value: u32 = input
            .trim()
            .parse()
            .map_err(|_| format!("Invalid value '{}': expected a whole number", input.trim()))?;
        self.supply_stat_value(value)
    }

    pub fn supply_stat_value(&mut self, value: u32) -> Result<&AnalysisResult, String> {
        let pending = match self.state() {
            AnalysisState::AwaitingManualStat(pending) => pending,
            AnalysisState::AwaitingWeaponSet { .. } => {
                return Err("Weapon set must be chosen first".to_string())
            }
            AnalysisState::Complete(_) => return Err("No manual input is pending".to_string()),
        };

        let max = self.resolver.config().max_manual_value;
        if value > max {
            return Err(format!(
                "{} must be between 0 and {}, got {}",
                pending.label, max, value
            ));
        }

        debug!(key = %pending.key, value, "manual stat supplied");
        self.overrides.values.insert(pending.category, value);
        Ok(self.refresh())
    }

    /// Parse a set name ("AbsoLab", "Arcane", "Genesis") for the pending weapon question
    pub fn choose_weapon_set(&mut self, input: &str) -> Result<&AnalysisResult, String> {
        let set: WeaponSet = input.parse()?;
        self.select_weapon_set(set)
    }

    pub fn select_weapon_set(&mut self, set: WeaponSet) -> Result<&AnalysisResult, String> {
        if !self.result.weapon_set_required {
            return Err("No weapon set selection is pending".to_string());
        }

        debug!(%set, "weapon set chosen");
        self.overrides.weapon_set = Some(set);
        Ok(self.refresh())
    }

    fn refresh(&mut self) -> &AnalysisResult {
        self.result = self
            .resolver
            .resolve(&self.facts, &self.request, &self.overrides);
        &self.result
    }
}
