//! Indicator reading source interface for future data feed integration.

use async_trait::async_trait;
use rand::Rng;

use crate::error::ReadingError;
use crate::models::indicators::IndicatorReading;

#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// Current indicator snapshot for an instrument.
    async fn read(&self, instrument: &str) -> Result<IndicatorReading, ReadingError>;
}

/// Random readings inside the value ranges a real feed would produce:
/// RSI 20-80, stochastic K/D 10-90, EMAs 1.1000-1.2000.
pub struct SyntheticReadingSource;

impl SyntheticReadingSource {
    pub fn generate(instrument: &str) -> IndicatorReading {
        let mut rng = rand::thread_rng();
        let rsi = rng.gen_range(20..=80);
        let stoch_k = rng.gen_range(10..=90);
        let stoch_d = rng.gen_range(10..=90);
        let ema_fast = rng.gen_range(1.1000..=1.2000);
        let ema_slow = rng.gen_range(1.1000..=1.2000);

        IndicatorReading::new(instrument, rsi as f64, stoch_k as f64, stoch_d as f64)
            .with_emas(ema_fast, ema_slow)
    }
}

#[async_trait]
impl ReadingSource for SyntheticReadingSource {
    async fn read(&self, instrument: &str) -> Result<IndicatorReading, ReadingError> {
        Ok(Self::generate(instrument))
    }
}
