//! Unit tests for HistoryLedger

use pocket_signals::models::{
    IndicatorReading, Outcome, Signal, SignalDirection, Trend,
};
use pocket_signals::signals::history::{HISTORY_CAPACITY, RECENT_WINDOW};
use pocket_signals::signals::HistoryLedger;

/// Signals are numbered through their RSI reading so order can be checked.
fn numbered(n: usize) -> Signal {
    let reading = IndicatorReading::new("EURUSD-OTC", n as f64, 10.0, 10.0);
    Signal::new(
        reading,
        SignalDirection::Call,
        Trend::Bullish,
        80,
        chrono::Duration::seconds(30),
    )
}

fn with_outcome(n: usize, outcome: Outcome) -> Signal {
    numbered(n).with_outcome(outcome)
}

#[test]
fn starts_empty() {
    let ledger = HistoryLedger::new();
    assert!(ledger.is_empty());
    assert!(ledger.latest().is_none());
    assert_eq!(ledger.capacity(), HISTORY_CAPACITY);
    assert_eq!(ledger.win_rate(), 0.0);
}

#[test]
fn append_keeps_chronological_order() {
    let mut ledger = HistoryLedger::new();
    for n in 1..=5 {
        ledger.append(numbered(n));
    }
    let order: Vec<f64> = ledger.recent(10).iter().map(|s| s.readings.rsi).collect();
    assert_eq!(order, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    assert_eq!(ledger.latest().unwrap().readings.rsi, 5.0);
}

#[test]
fn oldest_entries_are_evicted_past_capacity() {
    let mut ledger = HistoryLedger::new();
    for n in 1..=150 {
        ledger.append(numbered(n));
    }

    assert_eq!(ledger.len(), 100);
    let all = ledger.recent(HISTORY_CAPACITY);
    assert_eq!(all.first().unwrap().readings.rsi, 51.0);
    assert_eq!(all.last().unwrap().readings.rsi, 150.0);

    let recent = ledger.recent(RECENT_WINDOW);
    assert_eq!(recent.len(), 50);
    assert_eq!(recent.first().unwrap().readings.rsi, 101.0);
    assert_eq!(recent.last().unwrap().readings.rsi, 150.0);
}

#[test]
fn small_capacity_ledger() {
    let mut ledger = HistoryLedger::with_capacity(3);
    for n in 1..=4 {
        ledger.append(numbered(n));
    }
    let order: Vec<f64> = ledger.recent(10).iter().map(|s| s.readings.rsi).collect();
    assert_eq!(order, vec![2.0, 3.0, 4.0]);
}

#[test]
fn win_rate_is_zero_below_minimum_samples() {
    let mut ledger = HistoryLedger::new();
    for n in 0..9 {
        ledger.append(with_outcome(n, Outcome::Win));
    }
    assert_eq!(ledger.win_rate(), 0.0);

    ledger.append(with_outcome(9, Outcome::Win));
    assert_eq!(ledger.win_rate(), 100.0);
}

#[test]
fn win_rate_uses_last_twenty_entries() {
    let mut ledger = HistoryLedger::new();
    // Older losses fall outside the window.
    for n in 0..10 {
        ledger.append(with_outcome(n, Outcome::Loss));
    }
    for n in 10..30 {
        let outcome = if n % 4 == 0 { Outcome::Loss } else { Outcome::Win };
        ledger.append(with_outcome(n, outcome));
    }
    assert_eq!(ledger.win_rate(), 75.0);
}

#[test]
fn win_rate_with_fewer_than_twenty_entries() {
    let mut ledger = HistoryLedger::new();
    for n in 0..12 {
        let outcome = if n < 9 { Outcome::Win } else { Outcome::Loss };
        ledger.append(with_outcome(n, outcome));
    }
    assert_eq!(ledger.win_rate(), 75.0);
}

#[test]
fn pending_outcomes_count_as_non_wins() {
    let mut ledger = HistoryLedger::new();
    for n in 0..10 {
        ledger.append(numbered(n));
    }
    assert_eq!(ledger.win_rate(), 0.0);
}

#[test]
fn clear_resets_everything() {
    let mut ledger = HistoryLedger::new();
    for n in 0..20 {
        ledger.append(with_outcome(n, Outcome::Win));
    }
    ledger.clear();

    assert!(ledger.is_empty());
    assert!(ledger.latest().is_none());
    assert!(ledger.recent(RECENT_WINDOW).is_empty());
    assert_eq!(ledger.win_rate(), 0.0);
}
