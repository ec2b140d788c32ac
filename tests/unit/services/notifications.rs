//! Unit tests for NotificationDispatcher and message formatting

use std::sync::Arc;
use std::time::Duration;

use pocket_signals::models::{IndicatorReading, Settings, Signal, SignalDirection, Trend};
use pocket_signals::services::notifications::format_signal_message;
use pocket_signals::services::{NotificationDispatcher, NotifyOutcome};

use crate::test_utils::RecordingTransport;

fn sample_signal(direction: SignalDirection) -> Signal {
    let reading = IndicatorReading::new("EURUSD-OTC", 25.0, 12.5, 15.0).with_emas(1.15, 1.14);
    Signal::new(
        reading,
        direction,
        Trend::Bullish,
        87,
        chrono::Duration::seconds(30),
    )
}

#[tokio::test]
async fn skipped_without_target() {
    let transport = Arc::new(RecordingTransport::ok());
    let dispatcher = NotificationDispatcher::new(transport.clone());

    let outcome = dispatcher
        .notify(&sample_signal(SignalDirection::Call), &Settings::default(), 0.0)
        .await;

    assert_eq!(outcome, NotifyOutcome::Skipped);
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn sent_to_configured_target() {
    let transport = Arc::new(RecordingTransport::ok());
    let dispatcher = NotificationDispatcher::new(transport.clone());
    let settings = Settings::default().with_notification_target("-100123");

    let outcome = dispatcher
        .notify(&sample_signal(SignalDirection::Call), &settings, 75.0)
        .await;

    assert_eq!(outcome, NotifyOutcome::Sent);
    let (destination, text) = transport.last().unwrap();
    assert_eq!(destination, "-100123");
    assert!(text.contains("EURUSD-OTC"));
    assert!(text.contains("75.0%"));
}

#[tokio::test]
async fn transport_error_is_reported_as_failed() {
    let transport = Arc::new(RecordingTransport::failing(500));
    let dispatcher = NotificationDispatcher::new(transport.clone());
    let settings = Settings::default().with_notification_target("-100123");

    let outcome = dispatcher
        .notify(&sample_signal(SignalDirection::Put), &settings, 0.0)
        .await;

    assert_eq!(outcome, NotifyOutcome::Failed);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn slow_transport_times_out() {
    let transport = Arc::new(RecordingTransport::slow(Duration::from_secs(5)));
    let dispatcher =
        NotificationDispatcher::new(transport.clone()).with_timeout(Duration::from_millis(50));
    let settings = Settings::default().with_notification_target("-100123");

    let started = std::time::Instant::now();
    let outcome = dispatcher
        .notify(&sample_signal(SignalDirection::Call), &settings, 0.0)
        .await;

    assert_eq!(outcome, NotifyOutcome::Failed);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn call_message_layout() {
    let signal = sample_signal(SignalDirection::Call);
    let text = format_signal_message(&signal, 66.666);

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "🚀 <b>POCKET OPTION SIGNAL</b>");
    assert!(text.contains("Pair: <b>EURUSD-OTC</b>"));
    assert!(text.contains("Direction: <b>🔺 CALL</b>"));
    assert!(text.contains("Confidence: 87%"));
    assert!(text.contains("RSI: 25\n"));
    assert!(text.contains("Stochastic: 12.50/15\n"));
    assert!(text.contains("EMA Trend: bullish"));
    assert!(text.contains("Current Winrate: 66.7%"));
    assert!(text.ends_with("<b>Enter trade in 30 seconds</b>"));

    let time = signal.created_at.format("%H:%M:%S UTC").to_string();
    assert!(text.contains(&format!("Time: {}", time)));
}

#[test]
fn put_message_uses_down_marker() {
    let text = format_signal_message(&sample_signal(SignalDirection::Put), 0.0);
    assert!(text.contains("Direction: <b>🔻 PUT</b>"));
    assert!(text.contains("Current Winrate: 0.0%"));
}

#[test]
fn instrument_name_is_escaped() {
    let reading = IndicatorReading::new("A<B>&C", 25.0, 12.0, 15.0);
    let signal = Signal::new(
        reading,
        SignalDirection::Call,
        Trend::Neutral,
        80,
        chrono::Duration::seconds(30),
    );
    let text = format_signal_message(&signal, 0.0);
    assert!(text.contains("Pair: <b>A&lt;B&gt;&amp;C</b>"));
}
