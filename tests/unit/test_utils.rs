//! Shared fakes for unit tests

use async_trait::async_trait;
use pocket_signals::error::{ReadingError, TransportError};
use pocket_signals::models::IndicatorReading;
use pocket_signals::services::{MessageTransport, ReadingSource};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Returns the same values for every instrument.
pub struct FixedReadings {
    pub rsi: f64,
    pub stoch_k: f64,
    pub stoch_d: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub reads: AtomicUsize,
}

impl FixedReadings {
    pub fn new(rsi: f64, stoch_k: f64, stoch_d: f64, ema_fast: f64, ema_slow: f64) -> Self {
        Self {
            rsi,
            stoch_k,
            stoch_d,
            ema_fast,
            ema_slow,
            reads: AtomicUsize::new(0),
        }
    }

    /// Oversold on RSI and stochastic with a clear bullish trend.
    pub fn aligned() -> Self {
        Self::new(25.0, 12.0, 15.0, 1.1500, 1.1400)
    }

    /// Neutral on every indicator.
    pub fn neutral() -> Self {
        Self::new(50.0, 50.0, 50.0, 1.1500, 1.1499)
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReadingSource for FixedReadings {
    async fn read(&self, instrument: &str) -> Result<IndicatorReading, ReadingError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(
            IndicatorReading::new(instrument, self.rsi, self.stoch_k, self.stoch_d)
                .with_emas(self.ema_fast, self.ema_slow),
        )
    }
}

pub struct FailingReadings;

#[async_trait]
impl ReadingSource for FailingReadings {
    async fn read(&self, instrument: &str) -> Result<IndicatorReading, ReadingError> {
        Err(ReadingError::new(instrument, "feed unavailable"))
    }
}

pub struct PanickingReadings;

#[async_trait]
impl ReadingSource for PanickingReadings {
    async fn read(&self, _instrument: &str) -> Result<IndicatorReading, ReadingError> {
        panic!("reading source exploded");
    }
}

/// Never returns within any test's patience.
pub struct StalledReadings;

#[async_trait]
impl ReadingSource for StalledReadings {
    async fn read(&self, instrument: &str) -> Result<IndicatorReading, ReadingError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(ReadingError::new(instrument, "stalled"))
    }
}

/// Records every message and answers with a fixed result.
pub struct RecordingTransport {
    pub sent: Mutex<Vec<(String, String)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    fail_with_status: Option<u16>,
    delay: Option<Duration>,
}

impl RecordingTransport {
    pub fn ok() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            fail_with_status: None,
            delay: None,
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_with_status: Some(status),
            ..Self::ok()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::ok()
        }
    }

    pub fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<(String, String)> {
        self.sent.lock().unwrap().last().cloned()
    }

    /// Highest number of sends that were in progress at the same time.
    pub fn max_concurrent(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageTransport for RecordingTransport {
    async fn send(&self, destination: &str, text: &str) -> Result<(), TransportError> {
        self.sent
            .lock()
            .unwrap()
            .push((destination.to_string(), text.to_string()));
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match self.fail_with_status {
            Some(status) => Err(TransportError::Status {
                status,
                body: "rejected".to_string(),
            }),
            None => Ok(()),
        }
    }
}
