use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::{
    activation::activation::ActivationFunction,
    layers::dense::Layer,
    loss::cross_entropy::CrossEntropyLoss,
    math::matrix::Matrix,
};

/// Activations recorded during a forward pass, needed for backprop.
///
/// `activations[0]` is the input batch and `activations[i + 1]` the output of
/// layer `i`; `pre_activations[i]` is that layer's `z`.
pub struct ForwardPass {
    pub pre_activations: Vec<Matrix>,
    pub activations: Vec<Matrix>,
}

impl ForwardPass {
    pub fn output(&self) -> &Matrix {
        // activations always holds at least the input batch.
        &self.activations[self.activations.len() - 1]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub layers: Vec<Layer>,
}

impl Network {
    /// Builds `input_size -> hidden[0] -> ... -> output_size`, with `hidden_activation`
    /// on every hidden layer and a softmax output layer.
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        hidden: &[usize],
        hidden_activation: ActivationFunction,
        output_size: usize,
        rng: &mut R,
    ) -> Network {
        let mut layers = Vec::with_capacity(hidden.len() + 1);
        let mut fan_in = input_size;
        for &size in hidden {
            layers.push(Layer::new(size, fan_in, hidden_activation, rng));
            fan_in = size;
        }
        layers.push(Layer::new(output_size, fan_in, ActivationFunction::Softmax, rng));
        Network { layers }
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map(|l| l.input_size).unwrap_or(0)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map(|l| l.size).unwrap_or(0)
    }

    /// Forward pass that keeps every intermediate for `backward`.
    pub fn forward(&self, input: Matrix) -> ForwardPass {
        let mut pre_activations = Vec::with_capacity(self.layers.len());
        let mut activations = Vec::with_capacity(self.layers.len() + 1);
        activations.push(input);
        for layer in &self.layers {
            let (z, a) = layer.forward(&activations[activations.len() - 1]);
            pre_activations.push(z);
            activations.push(a);
        }
        ForwardPass { pre_activations, activations }
    }

    /// Inference only: returns the output activations (class probabilities).
    pub fn predict(&self, input: &Matrix) -> Matrix {
        let mut current = input.clone();
        for layer in &self.layers {
            current = layer.forward(&current).1;
        }
        current
    }

    /// Backward pass for softmax + cross-entropy against one-hot `expected`.
    /// Returns one `(weights_grad, biases_grad)` pair per layer, input → output.
    pub fn backward(&self, pass: &ForwardPass, expected: &Matrix, alpha: f64) -> Vec<(Matrix, Matrix)> {
        let mut grads: Vec<(Matrix, Matrix)> = Vec::with_capacity(self.layers.len());
        let mut error = CrossEntropyLoss::derivative(pass.output(), expected);

        for i in (0..self.layers.len()).rev() {
            let (w_grad, b_grad, delta) = self.layers[i].compute_gradients(
                &error,
                &pass.pre_activations[i],
                &pass.activations[i],
                alpha,
            );
            if i > 0 {
                error = self.layers[i].propagate(&delta);
            }
            grads.push((w_grad, b_grad));
        }

        grads.reverse();
        grads
    }

    /// Sum of squared weights (biases excluded), for the L2 term of the loss.
    pub fn weight_sum_squares(&self) -> f64 {
        self.layers.iter().map(|l| l.weights.sum_squares()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn tiny_network() -> Network {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        Network::new(4, &[5, 3], ActivationFunction::Tanh, 2, &mut rng)
    }

    #[test]
    fn layer_shapes_chain() {
        let net = tiny_network();
        let shapes: Vec<(usize, usize)> = net.layers.iter().map(|l| (l.input_size, l.size)).collect();
        assert_eq!(shapes, vec![(4, 5), (5, 3), (3, 2)]);
        assert_eq!(net.layers[2].activator, ActivationFunction::Softmax);
    }

    #[test]
    fn predict_agrees_with_forward_output() {
        let net = tiny_network();
        let x = Matrix::from_rows(&[vec![0.1, 0.2, 0.3, 0.4], vec![1.0, 0.0, 0.0, 0.5]]);
        let pass = net.forward(x.clone());
        assert_eq!(&net.predict(&x), pass.output());
    }

    #[test]
    fn backward_matches_finite_differences() {
        let net = tiny_network();
        let x = Matrix::from_rows(&[vec![0.1, -0.2, 0.3, 0.4], vec![0.9, 0.0, -0.4, 0.5]]);
        let y = Matrix::from_rows(&[vec![1.0, 0.0], vec![0.0, 1.0]]);

        let mean_loss = |n: &Network| {
            let out = n.predict(&x);
            out.iter_rows().zip(y.iter_rows())
                .map(|(p, e)| CrossEntropyLoss::loss(p, e))
                .sum::<f64>() / 2.0
        };

        let grads = net.backward(&net.forward(x.clone()), &y, 0.0);

        let h = 1e-6;
        for (layer, (row, col)) in [(0usize, (1usize, 2usize)), (1, (4, 0)), (2, (2, 1))] {
            let mut plus = net.clone();
            let idx = row * plus.layers[layer].weights.cols + col;
            plus.layers[layer].weights.data[idx] += h;
            let mut minus = net.clone();
            minus.layers[layer].weights.data[idx] -= h;
            let numeric = (mean_loss(&plus) - mean_loss(&minus)) / (2.0 * h);
            assert_relative_eq!(grads[layer].0.get(row, col), numeric, epsilon = 1e-5);
        }
    }
}
