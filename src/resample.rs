//! Integer polyphase decimation.
//!
//! Behaves like `resample_poly(x, 1, q, window="hamming")`: a `20q + 1` tap
//! windowed-sinc low-pass at `1/q` of Nyquist, centred on every `q`-th input
//! sample, with the block zero-extended at both ends. Only the kept outputs are
//! evaluated, which is the whole polyphase saving when the up factor is one.

use std::f64::consts::PI;

/// Half filter length per unit of decimation.
const HALF_LEN_PER_FACTOR: usize = 10;

#[derive(Debug, Clone)]
pub struct Decimator {
    factor: usize,
    half_len: usize,
    taps: Box<[f64]>,
}

impl Decimator {
    pub fn new(factor: usize) -> Self {
        let factor = factor.max(1);
        if factor == 1 {
            return Self {
                factor,
                half_len: 0,
                taps: Box::new([1.0]),
            };
        }
        let half_len = HALF_LEN_PER_FACTOR * factor;
        Self {
            factor,
            half_len,
            taps: design_lowpass(2 * half_len + 1, 1.0 / factor as f64),
        }
    }

    pub fn factor(&self) -> usize {
        self.factor
    }

    pub fn taps(&self) -> &[f64] {
        &self.taps
    }

    pub fn output_len(&self, input_len: usize) -> usize {
        input_len.div_ceil(self.factor)
    }

    /// Output sample `m`, i.e. the filter centred on input `m * factor`.
    pub fn output_sample(&self, input: &[f64], m: usize) -> f64 {
        let center = m * self.factor + self.half_len;
        let lo = (center + 1).saturating_sub(input.len());
        let hi = center.min(self.taps.len() - 1);
        if lo > hi {
            return 0.0;
        }
        self.taps[lo..=hi]
            .iter()
            .zip(input[center - hi..=center - lo].iter().rev())
            .map(|(h, x)| h * x)
            .sum()
    }

    pub fn process(&self, input: &[f64]) -> Vec<f64> {
        (0..self.output_len(input.len()))
            .map(|m| self.output_sample(input, m))
            .collect()
    }
}

/// Windowed-sinc low-pass, `cutoff` relative to Nyquist, unit gain at DC.
fn design_lowpass(numtaps: usize, cutoff: f64) -> Box<[f64]> {
    let alpha = (numtaps - 1) as f64 / 2.0;
    let window = make_hamming_window(numtaps, 1.0);
    let mut taps: Vec<f64> = window
        .iter()
        .enumerate()
        .map(|(i, w)| cutoff * sinc(cutoff * (i as f64 - alpha)) * w)
        .collect();
    let gain: f64 = taps.iter().sum();
    taps.iter_mut().for_each(|h| *h /= gain);
    taps.into_boxed_slice()
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

fn make_hamming_window(size: usize, scale: f64) -> Box<[f64]> {
    if size == 1 {
        return Box::new([scale]);
    }
    let mut window = Vec::with_capacity(size);
    for i in 0..size {
        window.push(scale * (0.54 - 0.46 * f64::cos(2.0 * PI * (i as f64) / (size as f64 - 1.0))));
    }
    window.into_boxed_slice()
}
