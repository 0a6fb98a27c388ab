//! Single-pole de-emphasis filter.
//!
//! Broadcast FM boosts high audio frequencies before transmission; the receiver
//! undoes it with a first-order low-pass whose time constant matches the
//! transmitter's:
//!
//! `y[n] = (1 - x)·v[n] + x·y[n-1]`, `x = exp(-1 / (rate·τ))`
//!
//! In `lfilter` terms `b = [1 - x]` and `a = [1, -x]`. The filter runs in
//! transposed direct form II, so its whole history is a single delay value that
//! callers carry between blocks.

/// Americas and South Korea.
pub const TAU_75_US: f64 = 75e-6;
/// Europe and most other regions.
pub const TAU_50_US: f64 = 50e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deemphasis {
    b0: f64,
    a1: f64,
}

impl Deemphasis {
    /// `tau` and `rate` must be positive; the pole then lies in (0, 1).
    pub fn new(tau: f64, rate: f64) -> Self {
        let x = (-1.0 / (rate * tau)).exp();
        Self { b0: 1.0 - x, a1: -x }
    }

    pub fn pole(&self) -> f64 {
        -self.a1
    }

    /// Delay value that holds the output steady for a constant unit input
    /// (the `lfilter_zi` state).
    pub fn steady_state(&self) -> f64 {
        -self.a1 * self.b0 / (1.0 + self.a1)
    }

    #[inline]
    pub fn step(&self, v: f64, z: &mut f64) -> f64 {
        let y = self.b0 * v + *z;
        *z = -self.a1 * y;
        y
    }

    /// Filters `samples` in place starting from delay value `z`, returning the
    /// trailing delay value.
    pub fn apply(&self, samples: &mut [f64], mut z: f64) -> f64 {
        for v in samples.iter_mut() {
            *v = self.step(*v, &mut z);
        }
        z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn coefficients_follow_time_constant() {
        let filter = Deemphasis::new(TAU_75_US, 48_000.0);
        let x = (-1.0f64 / (48_000.0 * 75e-6)).exp();
        assert_relative_eq!(filter.pole(), x);
        let mut z = 0.0;
        assert_relative_eq!(filter.step(1.0, &mut z), 1.0 - x);
        assert_relative_eq!(z, x * (1.0 - x));
        assert!(filter.pole() > 0.0 && filter.pole() < 1.0);
    }

    #[test]
    fn steady_state_equals_pole() {
        let filter = Deemphasis::new(TAU_50_US, 48_000.0);
        assert_relative_eq!(filter.steady_state(), filter.pole(), epsilon = 1e-12);
    }

    #[test]
    fn primed_filter_has_no_transient() {
        let filter = Deemphasis::new(TAU_75_US, 48_000.0);
        let mut samples = vec![0.4; 64];
        filter.apply(&mut samples, filter.steady_state() * 0.4);
        for v in samples {
            assert_relative_eq!(v, 0.4, epsilon = 1e-12);
        }
    }

    #[test]
    fn step_response_converges_to_unity() {
        let filter = Deemphasis::new(TAU_75_US, 48_000.0);
        let mut samples = vec![1.0; 200];
        filter.apply(&mut samples, 0.0);
        assert_relative_eq!(samples[0], 1.0 - filter.pole());
        assert!(samples.windows(2).all(|w| w[1] >= w[0]));
        assert_relative_eq!(samples[199], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn split_blocks_match_single_block() {
        let filter = Deemphasis::new(TAU_50_US, 32_000.0);
        let input: Vec<f64> = (0..100).map(|i| ((i as f64) * 0.37).sin()).collect();

        let mut whole = input.clone();
        filter.apply(&mut whole, 0.0);

        let (mut head, mut tail) = (input[..41].to_vec(), input[41..].to_vec());
        let z = filter.apply(&mut head, 0.0);
        filter.apply(&mut tail, z);

        for (a, b) in whole.iter().zip(head.iter().chain(tail.iter())) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
    }
}
