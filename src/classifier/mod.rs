pub mod convergence;
pub mod mlp;

pub use convergence::ConvergenceWarningsSuppressed;
pub use mlp::{MlpClassifier, MlpParams, CONVERGENCE_TARGET};

use crate::data::dataset::{Dataset, Label};
use crate::error::{EvaluationError, TrainingError};

/// A stateful, warm-startable classifier driven one epoch at a time.
///
/// Implementations keep their parameters between calls: every
/// `advance_one_epoch` continues from where the previous one stopped.
pub trait Classifier {
    /// One full optimization pass over `train`, mutating the model in place.
    fn advance_one_epoch(&mut self, train: &Dataset) -> Result<(), TrainingError>;

    /// One probability row per sample of `data`, in sample order; column `j`
    /// is the probability of `classes()[j]`.
    fn predict_proba(&self, data: &Dataset) -> Result<Vec<Vec<f64>>, EvaluationError>;

    /// One predicted label per sample of `data`, in sample order.
    fn predict(&self, data: &Dataset) -> Result<Vec<Label>, EvaluationError>;

    /// Class labels, in the column order of `predict_proba`.
    fn classes(&self) -> &[Label];

    /// Enables or disables the non-convergence diagnostic and returns the
    /// previous setting. Classifiers without such a diagnostic ignore it.
    fn set_convergence_warnings(&mut self, _enabled: bool) -> bool {
        true
    }
}
