//! Signal notification formatting and dispatch.

pub mod telegram;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::error::TransportError;
use crate::models::settings::Settings;
use crate::models::signal::Signal;

pub use telegram::TelegramTransport;

pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers a text message to a destination on an external messaging service.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn send(&self, destination: &str, text: &str) -> Result<(), TransportError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    /// No notification target configured.
    Skipped,
    Failed,
}

pub struct NotificationDispatcher {
    transport: Arc<dyn MessageTransport>,
    timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(transport: Arc<dyn MessageTransport>) -> Self {
        Self {
            transport,
            timeout: DEFAULT_NOTIFY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Format and deliver a signal. Delivery errors are logged and reported
    /// as [`NotifyOutcome::Failed`], never returned.
    pub async fn notify(
        &self,
        signal: &Signal,
        settings: &Settings,
        win_rate: f64,
    ) -> NotifyOutcome {
        let Some(target) = settings.notification_target.as_deref() else {
            debug!(
                instrument = %signal.instrument,
                "NotificationDispatcher: no notification target configured, skipping"
            );
            return NotifyOutcome::Skipped;
        };

        let message = format_signal_message(signal, win_rate);
        match self.deliver(target, &message).await {
            Ok(()) => {
                info!(
                    instrument = %signal.instrument,
                    direction = signal.direction.as_str(),
                    "NotificationDispatcher: notification sent for {}",
                    signal.instrument
                );
                NotifyOutcome::Sent
            }
            Err(e) => {
                error!(
                    instrument = %signal.instrument,
                    error = %e,
                    "NotificationDispatcher: failed to send notification for {}",
                    signal.instrument
                );
                NotifyOutcome::Failed
            }
        }
    }

    async fn deliver(&self, target: &str, message: &str) -> Result<(), TransportError> {
        tokio::time::timeout(self.timeout, self.transport.send(target, message))
            .await
            .map_err(|_| TransportError::Timeout(self.timeout))?
    }
}

/// HTML message body for a signal.
pub fn format_signal_message(signal: &Signal, win_rate: f64) -> String {
    let readings = &signal.readings;
    let entry_secs = signal.entry_offset().num_seconds().max(0);

    format!(
        "🚀 <b>POCKET OPTION SIGNAL</b>\n\n\
         📊 Pair: <b>{pair}</b>\n\
         📈 Direction: <b>{marker} {direction}</b>\n\
         ⏰ Time: {time}\n\
         🎯 Confidence: {confidence}%\n\n\
         📋 <b>Technical Analysis:</b>\n\
         RSI: {rsi}\n\
         Stochastic: {k}/{d}\n\
         EMA Trend: {trend}\n\n\
         📊 Current Winrate: {win_rate:.1}%\n\
         ⏳ <b>Enter trade in {entry_secs} seconds</b>",
        pair = escape_html(&signal.instrument),
        marker = signal.direction.marker(),
        direction = signal.direction.as_str(),
        time = signal.created_at.format("%H:%M:%S UTC"),
        confidence = signal.confidence,
        rsi = format_reading(readings.rsi),
        k = format_reading(readings.stoch_k),
        d = format_reading(readings.stoch_d),
        trend = signal.trend.as_str(),
        win_rate = win_rate,
        entry_secs = entry_secs,
    )
}

fn format_reading(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
