//! Streaming FM demodulation of the LPR (left + right) broadcast audio channel.
//!
//! ```
//! use mfm::{DemodConfig, Demodulator};
//! use rustfft::num_complex::Complex32;
//!
//! let mut demod = Demodulator::new(DemodConfig::new(75e-6, 240_000.0, 48_000.0, 2400)).unwrap();
//! let chunk: Vec<Complex32> = (0..2400).map(|n| Complex32::from_polar(1.0, 0.01 * n as f32)).collect();
//! let audio = demod.demodulate(&chunk).unwrap();
//! assert_eq!(audio.len(), 480);
//! ```

pub mod backend;
pub mod config;
pub mod demod;
pub mod error;
pub mod filter;
mod iter;
pub mod resample;
pub mod ring;

pub use backend::{Backend, BackendKind};
pub use config::DemodConfig;
pub use demod::Demodulator;
pub use error::{ConfigError, Error, InputError, Result};
