use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::{math::matrix::Matrix, activation::activation::ActivationFunction};

/// Fully connected layer. `weights` is `input_size x size` so a batch of
/// row-vector samples feeds through as `batch * weights + biases`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub size: usize,
    pub input_size: usize,
    pub weights: Matrix,
    pub biases: Matrix,
    pub activator: ActivationFunction,
}

impl Layer {
    /// Glorot-uniform initialization of both weights and biases.
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        input_size: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Layer {
        let bound = (activation.init_factor() / (input_size + size) as f64).sqrt();
        let weights = Matrix::uniform(input_size, size, bound, rng);
        let biases = Matrix::uniform(1, size, bound, rng);

        Layer {
            size,
            input_size,
            weights,
            biases,
            activator: activation,
        }
    }

    /// Returns `(z, a)`: pre-activations and activations for the batch.
    pub fn forward(&self, input: &Matrix) -> (Matrix, Matrix) {
        let mut z = input.matmul(&self.weights);
        z.add_row_broadcast(&self.biases);
        let a = self.activator.activate(&z);
        (z, a)
    }

    /// Computes batch-averaged gradients.
    /// Returns `(weights_grad, biases_grad, layer_delta)`.
    ///
    /// `error` is ∂L/∂a for this layer (one row per sample), `pre_activation`
    /// the `z` recorded on the forward pass and `inputs` the activations that
    /// fed it. `alpha` is the L2 penalty; its gradient `alpha * W / batch` is
    /// folded into `weights_grad`.
    pub fn compute_gradients(
        &self,
        error: &Matrix,
        pre_activation: &Matrix,
        inputs: &Matrix,
        alpha: f64,
    ) -> (Matrix, Matrix, Matrix) {
        let act_derivative = pre_activation.map(|x| self.activator.derivative(x));
        // δ = error ⊙ σ'(z)
        let layer_delta = error.hadamard(&act_derivative);

        let inv_batch = 1.0 / inputs.rows as f64;
        let mut weights_grad = inputs.transpose_matmul(&layer_delta).map(|x| x * inv_batch);
        weights_grad.scaled_add(alpha * inv_batch, &self.weights);
        let biases_grad = layer_delta.sum_rows().map(|x| x * inv_batch);

        (weights_grad, biases_grad, layer_delta)
    }

    /// Propagates `layer_delta` through the weights: ∂L/∂a of the previous layer.
    pub fn propagate(&self, layer_delta: &Matrix) -> Matrix {
        layer_delta.matmul(&self.weights.transpose())
    }

    /// Adds pre-computed parameter updates (already scaled by the optimizer).
    pub fn apply_updates(&mut self, weights_update: &Matrix, biases_update: &Matrix) {
        self.weights.scaled_add(1.0, weights_update);
        self.biases.scaled_add(1.0, biases_update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn glorot_bound_holds_for_weights_and_biases() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let layer = Layer::new(20, 30, ActivationFunction::ReLU, &mut rng);
        let bound = (6.0f64 / 50.0).sqrt();
        assert_eq!((layer.weights.rows, layer.weights.cols), (30, 20));
        assert_eq!((layer.biases.rows, layer.biases.cols), (1, 20));
        assert!(layer.weights.data.iter().chain(&layer.biases.data).all(|w| w.abs() <= bound));
    }

    #[test]
    fn identity_gradients_match_closed_form() {
        let layer = Layer {
            size: 1,
            input_size: 2,
            weights: Matrix::from_rows(&[vec![0.5], vec![-1.0]]),
            biases: Matrix::from_rows(&[vec![0.0]]),
            activator: ActivationFunction::Identity,
        };
        let inputs = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]);
        let (z, _) = layer.forward(&inputs);
        let error = Matrix::from_rows(&[vec![1.0], vec![-1.0]]);

        let (w_grad, b_grad, delta) = layer.compute_gradients(&error, &z, &inputs, 0.0);

        // mean over batch of x^T * δ
        assert_relative_eq!(w_grad.get(0, 0), (1.0 - 3.0) / 2.0);
        assert_relative_eq!(w_grad.get(1, 0), (2.0 - 4.0) / 2.0);
        assert_relative_eq!(b_grad.get(0, 0), 0.0);
        assert_eq!(delta, error);
        assert_eq!(layer.propagate(&delta).data, vec![0.5, -1.0, -0.5, 1.0]);
    }
}
