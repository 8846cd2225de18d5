use crate::math::matrix::Matrix;

/// Categorical cross-entropy loss for use with a Softmax output layer.
pub struct CrossEntropyLoss;

/// Small epsilon added inside log() during training to prevent log(0) = -inf.
const EPS: f64 = 1e-12;

/// Clamp applied to the true-class probability when scoring a held-out set:
/// probabilities are clipped to `[LOG_LOSS_EPS, 1 - LOG_LOSS_EPS]` so a
/// confidently wrong prediction costs `-ln(1e-15) ≈ 34.54` instead of +inf.
pub const LOG_LOSS_EPS: f64 = 1e-15;

impl CrossEntropyLoss {
    /// Computes the scalar cross-entropy loss for one sample:
    ///   L = -sum(expected[i] * log(predicted[i] + eps))
    ///
    /// `predicted` — softmax probabilities, shape [n_classes]
    /// `expected`  — one-hot (or soft) target distribution, shape [n_classes]
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        predicted.iter().zip(expected.iter())
            .map(|(p, e)| -e * (p + EPS).ln())
            .sum()
    }

    /// Mean of `loss` over the rows of a batch.
    pub fn mean_loss(predicted: &Matrix, expected: &Matrix) -> f64 {
        if predicted.rows == 0 {
            return 0.0;
        }
        predicted.iter_rows().zip(expected.iter_rows())
            .map(|(p, e)| CrossEntropyLoss::loss(p, e))
            .sum::<f64>() / predicted.rows as f64
    }

    /// Gradient of the combined Softmax + cross-entropy w.r.t. the pre-softmax
    /// logits, for a whole batch:
    ///   ∂L/∂z = predicted - expected   (element-wise)
    ///
    /// The Softmax layer's own derivative is identity (1.0) so the combined
    /// gradient is not double-applied.
    pub fn derivative(predicted: &Matrix, expected: &Matrix) -> Matrix {
        predicted - expected
    }

    /// Clamped negative log-likelihood of the true class.
    pub fn clamped_nll(p_true: f64) -> f64 {
        -p_true.clamp(LOG_LOSS_EPS, 1.0 - LOG_LOSS_EPS).ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn perfect_prediction_has_near_zero_loss() {
        assert!(CrossEntropyLoss::loss(&[0.0, 1.0, 0.0], &[0.0, 1.0, 0.0]) < 1e-9);
    }

    #[test]
    fn derivative_is_predicted_minus_expected() {
        let p = Matrix::from_rows(&[vec![0.7, 0.2, 0.1]]);
        let e = Matrix::from_rows(&[vec![0.0, 1.0, 0.0]]);
        let d = CrossEntropyLoss::derivative(&p, &e);
        assert_relative_eq!(d.get(0, 0), 0.7);
        assert_relative_eq!(d.get(0, 1), -0.8);
        assert_relative_eq!(d.get(0, 2), 0.1);
    }

    #[test]
    fn clamped_nll_pins_both_ends() {
        assert_relative_eq!(CrossEntropyLoss::clamped_nll(0.0), -(1e-15f64).ln());
        assert_relative_eq!(CrossEntropyLoss::clamped_nll(0.0), 34.538776394910684, epsilon = 1e-9);
        let at_one = CrossEntropyLoss::clamped_nll(1.0);
        assert!(at_one > 0.0 && at_one < 1e-14);
        assert_relative_eq!(CrossEntropyLoss::clamped_nll(0.5), std::f64::consts::LN_2);
    }
}
