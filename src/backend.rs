//! Numeric execution strategies for the demodulator.
//!
//! The pipeline is written against [`Backend`]; implementations must agree
//! sample for sample so that switching strategy never changes the audio.

use std::fmt;

use rustfft::num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::filter::Deemphasis;
use crate::iter::wrap_correction;
use crate::resample::Decimator;

pub trait Backend: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Appends the argument of every sample to `out`.
    fn angle(&self, samples: &[Complex64], out: &mut Vec<f64>);

    /// Unwraps `phases` in place, keeping `phases[0]` as the reference.
    fn unwrap(&self, phases: &mut [f64]);

    fn decimate(&self, decimator: &Decimator, input: &[f64]) -> Vec<f64>;

    /// Runs the IIR over `samples` from delay value `z`; returns the trailing delay.
    fn lfilter(&self, filter: &Deemphasis, samples: &mut [f64], z: f64) -> f64 {
        filter.apply(samples, z)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    Scalar,
    Parallel,
}

impl BackendKind {
    pub fn build(self) -> Result<Box<dyn Backend>, ConfigError> {
        match self {
            BackendKind::Scalar => Ok(Box::new(Scalar)),
            #[cfg(feature = "parallel")]
            BackendKind::Parallel => Ok(Box::new(Parallel)),
            #[cfg(not(feature = "parallel"))]
            BackendKind::Parallel => Err(ConfigError::BackendUnavailable("parallel")),
        }
    }
}

/// Sequential iterator pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scalar;

impl Backend for Scalar {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn angle(&self, samples: &[Complex64], out: &mut Vec<f64>) {
        out.extend(samples.iter().map(|z| z.arg()));
    }

    fn unwrap(&self, phases: &mut [f64]) {
        let Some(&first) = phases.first() else {
            return;
        };
        let (mut prev, mut total) = (first, 0.0);
        for phase in phases[1..].iter_mut() {
            let raw = *phase;
            total += wrap_correction(raw - prev);
            prev = raw;
            *phase += total;
        }
    }

    fn decimate(&self, decimator: &Decimator, input: &[f64]) -> Vec<f64> {
        decimator.process(input)
    }
}

/// Data-parallel phase extraction, unwrap corrections and decimation.
#[cfg(feature = "parallel")]
#[derive(Debug, Clone, Copy, Default)]
pub struct Parallel;

#[cfg(feature = "parallel")]
impl Backend for Parallel {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn angle(&self, samples: &[Complex64], out: &mut Vec<f64>) {
        use rayon::prelude::*;

        out.par_extend(samples.par_iter().map(|z| z.arg()));
    }

    fn unwrap(&self, phases: &mut [f64]) {
        use rayon::prelude::*;

        let corrections: Vec<f64> = phases
            .par_windows(2)
            .map(|w| wrap_correction(w[1] - w[0]))
            .collect();
        let mut total = 0.0;
        for (phase, correction) in phases[1..].iter_mut().zip(corrections) {
            total += correction;
            *phase += total;
        }
    }

    fn decimate(&self, decimator: &Decimator, input: &[f64]) -> Vec<f64> {
        use rayon::prelude::*;

        (0..decimator.output_len(input.len()))
            .into_par_iter()
            .map(|m| decimator.output_sample(input, m))
            .collect()
    }
}
