use std::f64::consts::PI;

use rustfft::num_complex::{Complex, Complex64};
use rustfft::num_traits::{AsPrimitive, Float};
use tracing::{debug, trace, warn};

use crate::backend::Backend;
use crate::config::DemodConfig;
use crate::error::{InputError, Result};
use crate::filter::Deemphasis;
use crate::iter::IterExt;
use crate::resample::Decimator;
use crate::ring::DcHistory;

/// Streaming FM demodulator recovering the LPR (left + right) audio channel.
///
/// Each call to [`demodulate`](Self::demodulate) turns one chunk of IQ samples
/// at the signal rate into one chunk of audio at the audio rate. The unwrapped
/// phase of the last sample, the recent DC estimates and the de-emphasis delay
/// carry over between calls, so consecutive chunks join without clicks.
#[derive(Debug)]
pub struct Demodulator {
    config: DemodConfig,
    backend: Box<dyn Backend>,
    decimator: Decimator,
    deemphasis: Deemphasis,
    state: State,
    phases: Vec<f64>,
}

/// Everything that carries from one chunk to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
struct State {
    last_phase: f64,
    dc_history: DcHistory,
    /// De-emphasis delay.
    zi: f64,
}

impl State {
    /// Phase seeded at zero, no bias estimates, filter settled on a unit input.
    fn initial(deemphasis: &Deemphasis) -> Self {
        Self {
            last_phase: 0.0,
            dc_history: DcHistory::new(),
            zi: deemphasis.steady_state(),
        }
    }
}

impl Demodulator {
    pub fn new(config: DemodConfig) -> Result<Self> {
        let factor = config.validate()?;
        let backend = config.backend.build()?;
        let deemphasis = Deemphasis::new(config.tau, config.audio_rate);
        let decimator = Decimator::new(factor);

        debug!(
            "demodulator: {} Hz -> {} Hz (decimation {}), de-emphasis pole {:.6}, {} backend",
            config.signal_rate,
            config.audio_rate,
            factor,
            deemphasis.pole(),
            backend.name()
        );

        Ok(Self {
            phases: Vec::with_capacity(config.chunk_size + 1),
            config,
            backend,
            decimator,
            state: State::initial(&deemphasis),
            deemphasis,
        })
    }

    /// Demodulates one chunk of IQ samples into audio clamped to [-1, 1].
    ///
    /// The output has `ceil(chunk.len() / decimation)` samples. A rejected
    /// chunk leaves the demodulator exactly as it was.
    pub fn demodulate<T>(&mut self, chunk: &[Complex<T>]) -> Result<Vec<T>>
    where
        T: Float + AsPrimitive<f64>,
        f64: AsPrimitive<T>,
    {
        let samples = self.validate(chunk)?;

        self.phases.clear();
        self.phases.push(self.state.last_phase);
        self.backend.angle(&samples, &mut self.phases);
        self.backend.unwrap(&mut self.phases);
        let last_phase = self.phases[self.phases.len() - 1];

        let mut deviation: Vec<f64> = self
            .phases
            .iter()
            .copied()
            .array_windows()
            .map(|[prev, next]| (next - prev) / PI)
            .collect();

        let mut dc_history = self.state.dc_history;
        dc_history.push(deviation.iter().sum::<f64>() / deviation.len() as f64);
        let bias = dc_history.mean().unwrap_or_default();
        deviation.iter_mut().for_each(|v| *v -= bias);

        let mut audio = self.backend.decimate(&self.decimator, &deviation);
        let zi = self.backend.lfilter(&self.deemphasis, &mut audio, self.state.zi);

        self.state = State {
            last_phase,
            dc_history,
            zi,
        };
        trace!(
            input = chunk.len(),
            output = audio.len(),
            bias,
            last_phase,
            "demodulated chunk"
        );

        Ok(audio.into_iter().map(|v| v.clamp(-1.0, 1.0).as_()).collect())
    }

    fn validate<T>(&self, chunk: &[Complex<T>]) -> std::result::Result<Vec<Complex64>, InputError>
    where
        T: Float + AsPrimitive<f64>,
    {
        if chunk.is_empty() {
            warn!("rejecting empty chunk");
            return Err(InputError::EmptyChunk);
        }
        if chunk.len() != self.config.chunk_size {
            trace!(expected = self.config.chunk_size, got = chunk.len(), "chunk size differs from hint");
        }

        let samples: Vec<Complex64> = chunk.iter().map(|z| Complex64::new(z.re.as_(), z.im.as_())).collect();
        if self.config.reject_non_finite {
            if let Some(index) = samples.iter().position(|z| !z.is_finite()) {
                warn!(index, "rejecting chunk with non-finite sample");
                return Err(InputError::NonFinite { index });
            }
        }
        Ok(samples)
    }

    /// Forgets all carried state, as if freshly constructed.
    ///
    /// This is the way back after non-finite input slipped through with
    /// `reject_non_finite` disabled; the next chunk starts with a discontinuity.
    pub fn reset(&mut self) {
        debug!("demodulator state reset");
        self.state = State::initial(&self.deemphasis);
    }

    pub fn config(&self) -> &DemodConfig {
        &self.config
    }

    pub fn decimation(&self) -> usize {
        self.decimator.factor()
    }

    pub fn deemphasis(&self) -> &Deemphasis {
        &self.deemphasis
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Unwrapped phase of the last sample seen.
    pub fn last_phase(&self) -> f64 {
        self.state.last_phase
    }

    /// Bias currently subtracted, averaged over up to the last 32 chunks.
    pub fn dc_bias(&self) -> f64 {
        self.state.dc_history.mean().unwrap_or_default()
    }

    /// Number of chunks contributing to [`dc_bias`](Self::dc_bias).
    pub fn dc_history_len(&self) -> usize {
        self.state.dc_history.len()
    }
}
