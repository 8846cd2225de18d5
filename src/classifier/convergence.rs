use std::ops::{Deref, DerefMut};

use crate::classifier::Classifier;

/// Silences a classifier's non-convergence warnings for as long as the guard
/// lives. Dropping the guard restores the previous setting, including when
/// the guarded call returns an error or unwinds.
///
/// ```ignore
/// ConvergenceWarningsSuppressed::new(&mut model).advance_one_epoch(&train)?;
/// ```
pub struct ConvergenceWarningsSuppressed<'a, C: Classifier + ?Sized> {
    classifier: &'a mut C,
    previous: bool,
}

impl<'a, C: Classifier + ?Sized> ConvergenceWarningsSuppressed<'a, C> {
    pub fn new(classifier: &'a mut C) -> Self {
        let previous = classifier.set_convergence_warnings(false);
        ConvergenceWarningsSuppressed { classifier, previous }
    }
}

impl<C: Classifier + ?Sized> Deref for ConvergenceWarningsSuppressed<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.classifier
    }
}

impl<C: Classifier + ?Sized> DerefMut for ConvergenceWarningsSuppressed<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.classifier
    }
}

impl<C: Classifier + ?Sized> Drop for ConvergenceWarningsSuppressed<'_, C> {
    fn drop(&mut self) {
        self.classifier.set_convergence_warnings(self.previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::{Dataset, Label};
    use crate::error::{EvaluationError, TrainingError};

    /// Records the warning setting seen by each epoch; optionally fails.
    struct Probe {
        warnings: bool,
        seen: Vec<bool>,
        fail: bool,
    }

    impl Classifier for Probe {
        fn advance_one_epoch(&mut self, _train: &Dataset) -> Result<(), TrainingError> {
            self.seen.push(self.warnings);
            if self.fail { Err(TrainingError::EmptyDataset) } else { Ok(()) }
        }
        fn predict_proba(&self, _data: &Dataset) -> Result<Vec<Vec<f64>>, EvaluationError> {
            Ok(vec![])
        }
        fn predict(&self, _data: &Dataset) -> Result<Vec<Label>, EvaluationError> {
            Ok(vec![])
        }
        fn classes(&self) -> &[Label] {
            &[]
        }
        fn set_convergence_warnings(&mut self, enabled: bool) -> bool {
            std::mem::replace(&mut self.warnings, enabled)
        }
    }

    fn empty() -> Dataset {
        Dataset::from_rows(&[], Vec::<String>::new()).unwrap()
    }

    #[test]
    fn suppressed_during_the_call_and_restored_after() {
        let mut probe = Probe { warnings: true, seen: vec![], fail: false };
        ConvergenceWarningsSuppressed::new(&mut probe).advance_one_epoch(&empty()).unwrap();
        assert_eq!(probe.seen, vec![false]);
        assert!(probe.warnings);
    }

    #[test]
    fn restored_when_the_call_fails() {
        let mut probe = Probe { warnings: true, seen: vec![], fail: true };
        let result = ConvergenceWarningsSuppressed::new(&mut probe).advance_one_epoch(&empty());
        assert!(result.is_err());
        assert!(probe.warnings);
    }

    #[test]
    fn nesting_keeps_an_outer_disable() {
        let mut probe = Probe { warnings: false, seen: vec![], fail: false };
        {
            let mut guard = ConvergenceWarningsSuppressed::new(&mut probe);
            guard.advance_one_epoch(&empty()).unwrap();
        }
        assert!(!probe.warnings);
    }
}
