//! Runtime settings and partial updates.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::parse_bool;
use crate::error::ConfigError;

pub const DEFAULT_INTERVAL_SECS: u64 = 15;

const DEFAULT_UNIVERSE: [&str; 9] = [
    "EURUSD-OTC",
    "GBPUSD-OTC",
    "USDJPY-OTC",
    "AUDUSD-OTC",
    "NZDUSD-OTC",
    "EURJPY-OTC",
    "USDCAD-OTC",
    "EURGBP-OTC",
    "AUDNZD-OTC",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiParams {
    pub period: u32,
    pub overbought: u32,
    pub oversold: u32,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self {
            period: 14,
            overbought: 70,
            oversold: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticParams {
    pub k_period: u32,
    pub d_period: u32,
    pub slowing: u32,
    /// Both lines below this value count as oversold.
    pub lower_band: u32,
    /// Both lines above this value count as overbought.
    pub upper_band: u32,
}

impl Default for StochasticParams {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
            slowing: 3,
            lower_band: 20,
            upper_band: 80,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmaParams {
    pub fast_period: u32,
    pub slow_period: u32,
    /// Minimum |fast - slow| for the trend to count as clear.
    pub min_separation: f64,
}

impl Default for EmaParams {
    fn default() -> Self {
        Self {
            fast_period: 50,
            slow_period: 200,
            min_separation: 0.0010,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledIndicators {
    pub rsi: bool,
    pub stochastic: bool,
    pub ema: bool,
}

impl EnabledIndicators {
    pub fn all() -> Self {
        Self {
            rsi: true,
            stochastic: true,
            ema: true,
        }
    }

    pub fn none() -> Self {
        Self {
            rsi: false,
            stochastic: false,
            ema: false,
        }
    }
}

impl Default for EnabledIndicators {
    fn default() -> Self {
        Self::all()
    }
}

/// Which readings may vote for a CALL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionPolicy {
    /// Only enabled RSI / stochastic rules vote. With neither enabled, an
    /// enabled bullish EMA trend gives CALL.
    #[default]
    EnabledIndicators,
    /// RSI and stochastic thresholds vote whether or not they are enabled.
    AllIndicators,
}

/// Complete engine settings. Always consistent once it passes [`Settings::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub instruments: Vec<String>,
    pub selected_instruments: Vec<String>,
    pub rsi: RsiParams,
    pub stochastic: StochasticParams,
    pub ema: EmaParams,
    pub enabled: EnabledIndicators,
    pub interval_secs: u64,
    pub notification_target: Option<String>,
    #[serde(default)]
    pub direction_policy: DirectionPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        let instruments: Vec<String> = DEFAULT_UNIVERSE.iter().map(|s| s.to_string()).collect();
        let selected_instruments = instruments.iter().take(3).cloned().collect();
        Self {
            instruments,
            selected_instruments,
            rsi: RsiParams::default(),
            stochastic: StochasticParams::default(),
            ema: EmaParams::default(),
            enabled: EnabledIndicators::default(),
            interval_secs: DEFAULT_INTERVAL_SECS,
            notification_target: None,
            direction_policy: DirectionPolicy::default(),
        }
    }
}

impl Settings {
    pub fn with_notification_target(mut self, target: impl Into<String>) -> Self {
        self.notification_target = Some(target.into());
        self
    }

    pub fn with_selected(mut self, selected: &[&str]) -> Self {
        self.selected_instruments = selected.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_enabled(mut self, enabled: EnabledIndicators) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_interval(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs;
        self
    }

    /// Check internal consistency. An empty selection is allowed here; it is
    /// rejected when the engine starts or a cycle evaluates.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instruments.is_empty() {
            return Err(ConfigError::EmptyUniverse);
        }
        if let Some(unknown) = self
            .selected_instruments
            .iter()
            .find(|s| !self.instruments.contains(s))
        {
            return Err(ConfigError::UnknownInstrument(unknown.clone()));
        }
        if self.interval_secs == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        if self.rsi.oversold >= self.rsi.overbought || self.rsi.overbought > 100 {
            return Err(ConfigError::InvalidThresholds {
                indicator: "rsi",
                lower: self.rsi.oversold as f64,
                upper: self.rsi.overbought as f64,
            });
        }
        if self.stochastic.lower_band >= self.stochastic.upper_band
            || self.stochastic.upper_band > 100
        {
            return Err(ConfigError::InvalidThresholds {
                indicator: "stochastic",
                lower: self.stochastic.lower_band as f64,
                upper: self.stochastic.upper_band as f64,
            });
        }
        if !self.ema.min_separation.is_finite() || self.ema.min_separation < 0.0 {
            return Err(ConfigError::InvalidField {
                field: "ema_min_separation".to_string(),
                value: self.ema.min_separation.to_string(),
            });
        }
        for (field, value) in [
            ("rsi_period", self.rsi.period),
            ("stoch_k", self.stochastic.k_period),
            ("stoch_d", self.stochastic.d_period),
            ("stoch_slow", self.stochastic.slowing),
            ("ema_fast", self.ema.fast_period),
            ("ema_slow", self.ema.slow_period),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidField {
                    field: field.to_string(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    /// The selected instruments, or an error when none are selected.
    pub fn require_selection(&self) -> Result<&[String], ConfigError> {
        if self.selected_instruments.is_empty() {
            Err(ConfigError::NoInstrumentsSelected)
        } else {
            Ok(&self.selected_instruments)
        }
    }

    /// Copy of these settings with the named fields of `patch` replaced.
    pub fn merged(&self, patch: &SettingsPatch) -> Settings {
        let mut next = self.clone();

        if let Some(v) = &patch.pairs {
            next.instruments = v.clone();
        }
        if let Some(v) = &patch.selected_pairs {
            next.selected_instruments = v.clone();
        }
        if let Some(v) = patch.rsi_period {
            next.rsi.period = v;
        }
        if let Some(v) = patch.rsi_overbought {
            next.rsi.overbought = v;
        }
        if let Some(v) = patch.rsi_oversold {
            next.rsi.oversold = v;
        }
        if let Some(v) = patch.stoch_k {
            next.stochastic.k_period = v;
        }
        if let Some(v) = patch.stoch_d {
            next.stochastic.d_period = v;
        }
        if let Some(v) = patch.stoch_slow {
            next.stochastic.slowing = v;
        }
        if let Some(v) = patch.stoch_lower {
            next.stochastic.lower_band = v;
        }
        if let Some(v) = patch.stoch_upper {
            next.stochastic.upper_band = v;
        }
        if let Some(v) = patch.ema_fast {
            next.ema.fast_period = v;
        }
        if let Some(v) = patch.ema_slow {
            next.ema.slow_period = v;
        }
        if let Some(v) = patch.ema_min_separation {
            next.ema.min_separation = v;
        }
        if let Some(v) = patch.signal_interval {
            next.interval_secs = v;
        }
        if let Some(v) = patch.use_rsi {
            next.enabled.rsi = v;
        }
        if let Some(v) = patch.use_stoch {
            next.enabled.stochastic = v;
        }
        if let Some(v) = patch.use_ema {
            next.enabled.ema = v;
        }
        if let Some(v) = &patch.telegram_chat_id {
            let trimmed = v.trim();
            next.notification_target = if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            };
        }
        if let Some(v) = patch.direction_policy {
            next.direction_policy = v;
        }

        next
    }
}

/// Partial settings update. Unset fields keep their current value.
///
/// An empty `telegram_chat_id` clears the notification target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_pairs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsi_period: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsi_overbought: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsi_oversold: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stoch_k: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stoch_d: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stoch_slow: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stoch_lower: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stoch_upper: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ema_fast: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ema_slow: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ema_min_separation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_interval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_rsi: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_stoch: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_ema: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram_chat_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction_policy: Option<DirectionPolicy>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        *self == SettingsPatch::default()
    }

    /// Parse a JSON object into a patch.
    pub fn from_json(value: Value) -> Result<Self, ConfigError> {
        serde_json::from_value(value).map_err(|e| ConfigError::Malformed(e.to_string()))
    }

    /// Parse form-style string pairs. List fields are comma separated and
    /// repeated keys accumulate, so `selected_pairs=A&selected_pairs=B` and
    /// `selected_pairs=A,B` are equivalent.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut patch = SettingsPatch::default();
        for (key, value) in pairs {
            let key = key.as_ref();
            let raw = value.as_ref();
            match key {
                "pairs" => extend_list(&mut patch.pairs, raw),
                "selected_pairs" => extend_list(&mut patch.selected_pairs, raw),
                "rsi_period" => patch.rsi_period = Some(parse_number(key, raw)?),
                "rsi_overbought" => patch.rsi_overbought = Some(parse_number(key, raw)?),
                "rsi_oversold" => patch.rsi_oversold = Some(parse_number(key, raw)?),
                "stoch_k" => patch.stoch_k = Some(parse_number(key, raw)?),
                "stoch_d" => patch.stoch_d = Some(parse_number(key, raw)?),
                "stoch_slow" => patch.stoch_slow = Some(parse_number(key, raw)?),
                "stoch_lower" => patch.stoch_lower = Some(parse_number(key, raw)?),
                "stoch_upper" => patch.stoch_upper = Some(parse_number(key, raw)?),
                "ema_fast" => patch.ema_fast = Some(parse_number(key, raw)?),
                "ema_slow" => patch.ema_slow = Some(parse_number(key, raw)?),
                "ema_min_separation" => {
                    patch.ema_min_separation = Some(parse_number(key, raw)?)
                }
                "signal_interval" => patch.signal_interval = Some(parse_number(key, raw)?),
                "use_rsi" => patch.use_rsi = Some(parse_bool(key, raw)?),
                "use_stoch" => patch.use_stoch = Some(parse_bool(key, raw)?),
                "use_ema" => patch.use_ema = Some(parse_bool(key, raw)?),
                "telegram_chat_id" => patch.telegram_chat_id = Some(raw.to_string()),
                "direction_policy" => {
                    patch.direction_policy = Some(match raw.trim() {
                        "enabled_indicators" => DirectionPolicy::EnabledIndicators,
                        "all_indicators" => DirectionPolicy::AllIndicators,
                        _ => {
                            return Err(ConfigError::InvalidField {
                                field: key.to_string(),
                                value: raw.to_string(),
                            })
                        }
                    })
                }
                other => return Err(ConfigError::UnknownField(other.to_string())),
            }
        }
        Ok(patch)
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn extend_list(target: &mut Option<Vec<String>>, raw: &str) {
    target.get_or_insert_with(Vec::new).extend(parse_list(raw));
}

fn parse_number<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidField {
        field: field.to_string(),
        value: raw.to_string(),
    })
}
