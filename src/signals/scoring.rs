//! Confidence scoring for emitted signals

use std::ops::RangeInclusive;

use rand::Rng;

use crate::models::indicators::IndicatorReading;
use crate::signals::rules::RuleAssessment;

pub const DEFAULT_CONFIDENCE_RANGE: RangeInclusive<u8> = 75..=95;

/// Assigns a 0-100 confidence to a signal that passed every enabled rule.
pub trait ConfidenceScorer: Send + Sync {
    fn score(&self, reading: &IndicatorReading, assessment: &RuleAssessment) -> u8;
}

/// Uniform draw from a fixed range. Stands in until scoring works off real
/// indicator data.
pub struct RandomConfidence {
    range: RangeInclusive<u8>,
}

impl RandomConfidence {
    pub fn new() -> Self {
        Self::with_range(DEFAULT_CONFIDENCE_RANGE)
    }

    pub fn with_range(range: RangeInclusive<u8>) -> Self {
        let start = (*range.start()).min(100);
        let end = (*range.end()).clamp(start, 100);
        Self { range: start..=end }
    }
}

impl Default for RandomConfidence {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfidenceScorer for RandomConfidence {
    fn score(&self, _reading: &IndicatorReading, _assessment: &RuleAssessment) -> u8 {
        rand::thread_rng().gen_range(self.range.clone())
    }
}

/// Always returns the same score.
pub struct FixedConfidence(pub u8);

impl ConfidenceScorer for FixedConfidence {
    fn score(&self, _reading: &IndicatorReading, _assessment: &RuleAssessment) -> u8 {
        self.0.min(100)
    }
}
