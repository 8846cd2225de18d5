use log::debug;

use crate::train::epoch_stats::EpochMetric;

/// Sink for the per-epoch scores and the final timing of a run.
pub trait Reporter {
    fn report_epoch(&mut self, metric: &EpochMetric);

    /// Wall-clock seconds from the start of epoch 1 to the end of the last
    /// epoch's scoring.
    fn report_timing(&mut self, seconds: f64);
}

/// Prints one line per epoch and one timing line to stdout.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report_epoch(&mut self, metric: &EpochMetric) {
        let line = format_epoch(metric);
        debug!("{}", line);
        println!("{}", line);
    }

    fn report_timing(&mut self, seconds: f64) {
        let line = format_timing(seconds);
        debug!("{}", line);
        println!("{}", line);
    }
}

/// Keeps every reported metric for callers that want the whole trajectory.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MetricHistory {
    pub epochs: Vec<EpochMetric>,
    pub elapsed_seconds: Option<f64>,
}

impl Reporter for MetricHistory {
    fn report_epoch(&mut self, metric: &EpochMetric) {
        self.epochs.push(metric.clone());
    }

    fn report_timing(&mut self, seconds: f64) {
        self.elapsed_seconds = Some(seconds);
    }
}

/// Forwards to both reporters in turn.
impl<A: Reporter, B: Reporter> Reporter for (A, B) {
    fn report_epoch(&mut self, metric: &EpochMetric) {
        self.0.report_epoch(metric);
        self.1.report_epoch(metric);
    }

    fn report_timing(&mut self, seconds: f64) {
        self.0.report_timing(seconds);
        self.1.report_timing(seconds);
    }
}

pub fn format_epoch(metric: &EpochMetric) -> String {
    format!(
        "Test set: average loss: {:.4}, accuracy: {}/{} ({:.0}%)",
        metric.log_loss,
        metric.correct,
        metric.total,
        100.0 * metric.accuracy
    )
}

pub fn format_timing(seconds: f64) -> String {
    format!("Training time: {:.2}s", seconds)
}
