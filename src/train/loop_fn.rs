use std::time::Instant;

use log::{debug, info};

use crate::classifier::{Classifier, ConvergenceWarningsSuppressed};
use crate::data::dataset::Dataset;
use crate::error::RunError;
use crate::train::metrics::evaluate;
use crate::train::reporter::Reporter;

/// Runs `epochs` rounds of (advance one epoch, score on `test`, report) and
/// returns the wall-clock seconds from the start to the last metric
/// computation, which are also reported once at the end.
///
/// Epochs run strictly in order against the same `classifier`, each one
/// continuing from the state the previous left. Non-convergence warnings are
/// silenced around every training call. The first failure aborts the run:
/// metrics already reported stand, and no timing is reported.
pub fn train_eval_loop<C, R>(
    classifier: &mut C,
    train: &Dataset,
    test: &Dataset,
    epochs: usize,
    reporter: &mut R,
) -> Result<f64, RunError>
where
    C: Classifier + ?Sized,
    R: Reporter + ?Sized,
{
    info!("training for {} epochs on {} samples, scoring on {}", epochs, train.len(), test.len());
    let start = Instant::now();
    let mut elapsed = start.elapsed();

    for epoch in 1..=epochs {
        ConvergenceWarningsSuppressed::new(classifier).advance_one_epoch(train)?;

        let metric = evaluate(epoch, &*classifier, test)?;
        // Reporting time is excluded.
        elapsed = start.elapsed();
        debug!("epoch {}/{}: {:?}", epoch, epochs, metric);
        reporter.report_epoch(&metric);
    }

    let seconds = elapsed.as_secs_f64();
    reporter.report_timing(seconds);
    Ok(seconds)
}
