use serde::{Serialize, Deserialize};
use std::f64::consts::E;

use crate::math::matrix::Matrix;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActivationFunction {
    Identity,
    Sigmoid,
    Tanh,
    ReLU,
    /// Softmax is a vector-valued activation; it is applied per row in
    /// `activate()` and is only used on the output layer.
    Softmax,
}

impl ActivationFunction {
    /// Element-wise activation.  For `Softmax`, use `activate()` which
    /// normalizes each row; this path should not be reached.
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Identity => x,
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::Softmax => {
                panic!("ActivationFunction::Softmax::function() must not be called directly; \
                        use activate() which applies the full-row softmax.")
            }
        }
    }

    /// Element-wise derivative, evaluated at the pre-activation `x`.
    ///
    /// For `Softmax`, the network pairs it with cross-entropy and the combined
    /// gradient is `predicted - expected`, so this returns `1.0` to pass that
    /// delta through unchanged.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Identity => 1.0,
            ActivationFunction::Sigmoid => {
                let fx = self.function(x);
                fx * (1.0 - fx)
            }
            ActivationFunction::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::Softmax => 1.0,
        }
    }

    /// Applies the activation to a batch of pre-activations (one sample per row).
    pub fn activate(&self, z: &Matrix) -> Matrix {
        match self {
            ActivationFunction::Softmax => {
                let mut out = z.clone();
                for i in 0..out.rows {
                    softmax_in_place(out.row_mut(i));
                }
                out
            }
            _ => z.map(|x| self.function(x)),
        }
    }

    /// Glorot-uniform scale factor: the weight bound is
    /// `sqrt(factor / (fan_in + fan_out))`.
    pub fn init_factor(&self) -> f64 {
        match self {
            ActivationFunction::Sigmoid => 2.0,
            _ => 6.0,
        }
    }
}

/// Numerically stable softmax (max subtracted before exponentiation).
fn softmax_in_place(row: &mut [f64]) {
    let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mut sum = 0.0;
    for x in row.iter_mut() {
        *x = (*x - max).exp();
        sum += *x;
    }
    for x in row.iter_mut() {
        *x /= sum;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn softmax_rows_sum_to_one() {
        let z = Matrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![1000.0, 1000.0, -1000.0]]);
        let a = ActivationFunction::Softmax.activate(&z);
        for row in a.iter_rows() {
            assert_relative_eq!(row.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        }
        assert_relative_eq!(a.get(1, 0), 0.5, epsilon = 1e-12);
        assert!(a.get(0, 2) > a.get(0, 1));
    }

    #[test]
    fn relu_derivative_is_a_step() {
        let relu = ActivationFunction::ReLU;
        assert_eq!(relu.derivative(-0.5), 0.0);
        assert_eq!(relu.derivative(0.0), 0.0);
        assert_eq!(relu.derivative(2.0), 1.0);
    }

    #[test]
    fn sigmoid_uses_narrower_init() {
        assert_eq!(ActivationFunction::Sigmoid.init_factor(), 2.0);
        assert_eq!(ActivationFunction::ReLU.init_factor(), 6.0);
    }
}
