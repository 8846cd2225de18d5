use std::path::PathBuf;
use thiserror::Error;

/// Rejected command-line values. Raised before any data is loaded.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("epoch count must be >= 0, got {0}")]
    NegativeEpochs(i64),

    #[error("batch size must be >= 1, got {0}")]
    InvalidBatchSize(i64),

    #[error("learning rate must be finite and > 0, got {0}")]
    InvalidLearningRate(f64),

    #[error("learning-rate decay power must be finite and >= 0, got {0}")]
    InvalidDecayPower(f64),

    #[error("seed must lie in 0..={}, got {got}", u32::MAX)]
    SeedOutOfRange { got: i64 },
}

/// Dataset fetch, parse or partition failures.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("download failed: {0}")]
    Download(String),

    #[error("corrupt data file {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("malformed IDX data: {0}")]
    Format(String),

    #[error("{features} feature rows but {labels} labels")]
    LengthMismatch { features: usize, labels: usize },

    #[error("cannot hold out {test_size} of {len} samples; need 0 < test_size < {len}")]
    InvalidSplit { test_size: usize, len: usize },
}

/// Failures while advancing the classifier by one epoch.
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("training set is empty")]
    EmptyDataset,

    #[error("expected {expected} features per sample, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    #[error("label {0:?} was not seen on the first epoch; warm start keeps the class set fixed")]
    UnknownLabel(String),

    #[error("loss became non-finite ({loss}) during epoch {epoch}")]
    NonFiniteLoss { epoch: usize, loss: f64 },
}

/// Failures while scoring a completed epoch.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("classifier has not been trained yet")]
    NotFitted,

    #[error("evaluation set is empty")]
    EmptyDataset,

    #[error("expected {expected} features per sample, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    #[error("{what}: expected {expected} entries, got {got}")]
    LengthMismatch { what: &'static str, expected: usize, got: usize },

    #[error("probability row {row} has {got} entries for {expected} classes")]
    ProbabilityWidth { row: usize, expected: usize, got: usize },

    #[error("true label {0:?} is not one of the classifier's classes")]
    UnknownLabel(String),
}

/// Failures while writing or reading a persisted model.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model (de)serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Anything that terminates a run once the data is loaded.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("training failed: {0}")]
    Training(#[from] TrainingError),

    #[error("evaluation failed: {0}")]
    Evaluation(#[from] EvaluationError),

    #[error("saving the model failed: {0}")]
    Persist(#[from] PersistError),
}
