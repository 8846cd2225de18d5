use crate::classifier::Classifier;
use crate::data::dataset::{Dataset, Label};
use crate::error::EvaluationError;
use crate::loss::cross_entropy::CrossEntropyLoss;
use crate::train::epoch_stats::EpochMetric;

/// Mean multi-class cross-entropy of `proba` against `y_true`.
///
/// Column `j` of every probability row belongs to `classes[j]`. The
/// probability of the true class is clamped to
/// `[LOG_LOSS_EPS, 1 - LOG_LOSS_EPS]`; rows are otherwise taken as given.
pub fn log_loss(y_true: &[Label], proba: &[Vec<f64>], classes: &[Label]) -> Result<f64, EvaluationError> {
    if y_true.is_empty() {
        return Err(EvaluationError::EmptyDataset);
    }
    if proba.len() != y_true.len() {
        return Err(EvaluationError::LengthMismatch {
            what: "probability rows",
            expected: y_true.len(),
            got: proba.len(),
        });
    }

    let mut total = 0.0;
    for (row, (label, p)) in y_true.iter().zip(proba).enumerate() {
        if p.len() != classes.len() {
            return Err(EvaluationError::ProbabilityWidth {
                row,
                expected: classes.len(),
                got: p.len(),
            });
        }
        let j = classes
            .iter()
            .position(|c| c == label)
            .ok_or_else(|| EvaluationError::UnknownLabel(label.clone()))?;
        total += CrossEntropyLoss::clamped_nll(p[j]);
    }
    Ok(total / y_true.len() as f64)
}

/// `(correct, total)` under exact label equality.
pub fn accuracy_counts(y_true: &[Label], y_pred: &[Label]) -> Result<(usize, usize), EvaluationError> {
    if y_true.is_empty() {
        return Err(EvaluationError::EmptyDataset);
    }
    if y_pred.len() != y_true.len() {
        return Err(EvaluationError::LengthMismatch {
            what: "predicted labels",
            expected: y_true.len(),
            got: y_pred.len(),
        });
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    Ok((correct, y_true.len()))
}

/// Scores the classifier's current state against `test`.
pub fn evaluate<C: Classifier + ?Sized>(
    epoch: usize,
    classifier: &C,
    test: &Dataset,
) -> Result<EpochMetric, EvaluationError> {
    let proba = classifier.predict_proba(test)?;
    let predicted = classifier.predict(test)?;

    let log_loss = log_loss(test.labels(), &proba, classifier.classes())?;
    let (correct, total) = accuracy_counts(test.labels(), &predicted)?;

    Ok(EpochMetric {
        epoch,
        log_loss,
        accuracy: correct as f64 / total as f64,
        correct,
        total,
    })
}
