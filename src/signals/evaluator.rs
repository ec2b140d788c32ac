//! Turns an indicator reading into a signal when the enabled rules align.

use std::sync::Arc;

use chrono::Duration;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::error::ConfigError;
use crate::models::indicators::IndicatorReading;
use crate::models::settings::Settings;
use crate::models::signal::Signal;
use crate::signals::rules::{self, RuleAssessment};
use crate::signals::scoring::{ConfidenceScorer, RandomConfidence};

pub const DEFAULT_ENTRY_OFFSET_SECS: i64 = 30;

pub struct SignalEvaluator {
    scorer: Arc<dyn ConfidenceScorer>,
    entry_offset: Duration,
}

impl SignalEvaluator {
    pub fn new() -> Self {
        Self {
            scorer: Arc::new(RandomConfidence::new()),
            entry_offset: Duration::seconds(DEFAULT_ENTRY_OFFSET_SECS),
        }
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn ConfidenceScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_entry_offset(mut self, entry_offset: Duration) -> Self {
        self.entry_offset = entry_offset;
        self
    }

    pub fn entry_offset(&self) -> Duration {
        self.entry_offset
    }

    /// Pick one selected instrument uniformly at random.
    pub fn pick_instrument(&self, settings: &Settings) -> Result<String, ConfigError> {
        let selected = settings.require_selection()?;
        selected
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or(ConfigError::NoInstrumentsSelected)
    }

    /// Run the enabled rules without building a signal.
    pub fn assess(&self, settings: &Settings, reading: &IndicatorReading) -> RuleAssessment {
        rules::assess(settings, reading)
    }

    /// `Ok(None)` when the rules did not align, which is the common case.
    pub fn evaluate(
        &self,
        settings: &Settings,
        reading: &IndicatorReading,
    ) -> Result<Option<Signal>, ConfigError> {
        settings.require_selection()?;

        let assessment = rules::assess(settings, reading);
        if !assessment.passed() {
            debug!(
                instrument = %reading.instrument,
                reasons = ?assessment.rejections,
                "SignalEvaluator: no signal for {}",
                reading.instrument
            );
            return Ok(None);
        }

        let direction = rules::derive_direction(settings, &assessment);
        let confidence = self.scorer.score(reading, &assessment);

        Ok(Some(Signal::new(
            reading.clone(),
            direction,
            assessment.trend,
            confidence,
            self.entry_offset,
        )))
    }
}

impl Default for SignalEvaluator {
    fn default() -> Self {
        Self::new()
    }
}
