use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),
}

/// Construction parameters that cannot describe a working demodulator.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} must be a positive finite number, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("signal rate / audio rate must be an integer >= 1, got {ratio}")]
    FractionalDecimation { ratio: f64 },

    #[error("chunk size must be non-zero")]
    ZeroChunkSize,

    #[error("backend '{0}' is not compiled in")]
    BackendUnavailable(&'static str),

    #[error("cannot parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A chunk the demodulator refuses; the pipeline state is left untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("chunk is empty")]
    EmptyChunk,

    #[error("sample {index} is not finite")]
    NonFinite { index: usize },
}
