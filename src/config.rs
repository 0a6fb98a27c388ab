use serde::{Deserialize, Serialize};

use crate::backend::BackendKind;
use crate::error::ConfigError;
use crate::filter::TAU_75_US;

const RATIO_TOLERANCE: f64 = 1e-9;

/// Construction parameters of a [`Demodulator`](crate::Demodulator).
///
/// `signal_rate` is the rate of the incoming IQ chunks and `audio_rate` the
/// rate of the produced audio; the first must be an integer multiple of the
/// second. De-emphasis runs after decimation, so `tau` applies at `audio_rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct DemodConfig {
    pub tau: f64,
    pub signal_rate: f64,
    pub audio_rate: f64,
    pub chunk_size: usize,
    pub backend: BackendKind,
    pub reject_non_finite: bool,
}

impl Default for DemodConfig {
    fn default() -> Self {
        Self {
            tau: TAU_75_US,
            signal_rate: 240_000.0,
            audio_rate: 48_000.0,
            chunk_size: 24_000,
            backend: BackendKind::Scalar,
            reject_non_finite: true,
        }
    }
}

impl DemodConfig {
    pub fn new(tau: f64, signal_rate: f64, audio_rate: f64, chunk_size: usize) -> Self {
        Self {
            tau,
            signal_rate,
            audio_rate,
            chunk_size,
            ..Default::default()
        }
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Checks every invariant and returns the decimation factor.
    pub fn validate(&self) -> Result<usize, ConfigError> {
        for (name, value) in [
            ("tau", self.tau),
            ("signal_rate", self.signal_rate),
            ("audio_rate", self.audio_rate),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }

        let ratio = self.signal_rate / self.audio_rate;
        let factor = ratio.round();
        if factor < 1.0 || (ratio - factor).abs() > RATIO_TOLERANCE * ratio {
            return Err(ConfigError::FractionalDecimation { ratio });
        }
        Ok(factor as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_decimates_by_five() {
        assert_eq!(DemodConfig::default().validate().unwrap(), 5);
    }

    #[test]
    fn equal_rates_are_allowed() {
        let config = DemodConfig::new(50e-6, 48_000.0, 48_000.0, 1024);
        assert_eq!(config.validate().unwrap(), 1);
    }

    #[test]
    fn rejects_fractional_ratio() {
        let config = DemodConfig::new(75e-6, 120_000.0, 48_000.0, 1024);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FractionalDecimation { ratio }) if (ratio - 2.5).abs() < 1e-12
        ));
    }

    #[test]
    fn rejects_upsampling() {
        let config = DemodConfig::new(75e-6, 24_000.0, 48_000.0, 1024);
        assert!(matches!(config.validate(), Err(ConfigError::FractionalDecimation { .. })));
    }

    #[test]
    fn rejects_non_positive_parameters() {
        for tau in [0.0, -75e-6, f64::NAN] {
            let config = DemodConfig::new(tau, 240_000.0, 48_000.0, 1024);
            assert!(matches!(config.validate(), Err(ConfigError::NonPositive { name: "tau", .. })));
        }
        let config = DemodConfig::new(75e-6, 240_000.0, 0.0, 1024);
        assert!(matches!(config.validate(), Err(ConfigError::NonPositive { name: "audio_rate", .. })));
        let config = DemodConfig::new(75e-6, 240_000.0, 48_000.0, 0);
        assert!(matches!(config.validate(), Err(ConfigError::ZeroChunkSize)));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config = DemodConfig::from_json(r#"{ "tau": 50e-6, "backend": "parallel" }"#).unwrap();
        assert_eq!(config.tau, 50e-6);
        assert_eq!(config.backend, BackendKind::Parallel);
        assert_eq!(config.signal_rate, 240_000.0);
        assert!(config.reject_non_finite);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(DemodConfig::from_json("{ tau"), Err(ConfigError::Parse(_))));
    }
}
