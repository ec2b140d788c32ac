//! Signal evaluation and history.

pub mod evaluator;
pub mod history;
pub mod rules;
pub mod scoring;

pub use evaluator::SignalEvaluator;
pub use history::HistoryLedger;
pub use rules::{RsiAnalysis, RuleAssessment, StochasticAnalysis, TrendAnalysis};
pub use scoring::{ConfidenceScorer, FixedConfidence, RandomConfidence};
