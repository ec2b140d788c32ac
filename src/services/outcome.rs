//! Outcome assignment for emitted signals.

use rand::Rng;

use crate::models::signal::{Outcome, Signal};

/// Decides whether a signal won or lost. Real trade settlement plugs in here.
pub trait OutcomeResolver: Send + Sync {
    fn resolve(&self, signal: &Signal) -> Option<Outcome>;
}

/// Random outcome with a fixed win probability.
pub struct SimulatedOutcomeResolver {
    win_probability: f64,
}

impl SimulatedOutcomeResolver {
    pub const DEFAULT_WIN_PROBABILITY: f64 = 0.75;

    pub fn new() -> Self {
        Self::with_win_probability(Self::DEFAULT_WIN_PROBABILITY)
    }

    pub fn with_win_probability(win_probability: f64) -> Self {
        Self {
            win_probability: win_probability.clamp(0.0, 1.0),
        }
    }
}

impl Default for SimulatedOutcomeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl OutcomeResolver for SimulatedOutcomeResolver {
    fn resolve(&self, _signal: &Signal) -> Option<Outcome> {
        if rand::thread_rng().gen_bool(self.win_probability) {
            Some(Outcome::Win)
        } else {
            Some(Outcome::Loss)
        }
    }
}

/// Leaves outcomes unset until settled elsewhere.
pub struct PendingOutcome;

impl OutcomeResolver for PendingOutcome {
    fn resolve(&self, _signal: &Signal) -> Option<Outcome> {
        None
    }
}
