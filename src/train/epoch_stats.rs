use serde::{Serialize, Deserialize};

/// Held-out scores of one completed epoch.
///
/// Produced once per epoch by `train_eval_loop` and handed straight to the
/// `Reporter`; the loop itself keeps no history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetric {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Mean clamped cross-entropy of the true class over the test set.
    pub log_loss: f64,
    /// `correct / total`, in [0, 1].
    pub accuracy: f64,
    pub correct: usize,
    pub total: usize,
}
