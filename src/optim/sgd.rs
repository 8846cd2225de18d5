use serde::{Serialize, Deserialize};

use crate::{math::matrix::Matrix, layers::dense::Layer};

/// Mini-batch SGD with (Nesterov) momentum and an inverse-scaling
/// learning-rate schedule.
///
/// Velocities and the current learning rate are part of the optimizer state
/// and survive across epochs, so a warm-started network keeps its momentum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sgd {
    pub learning_rate_init: f64,
    pub learning_rate: f64,
    pub power_t: f64,
    pub momentum: f64,
    pub nesterov: bool,
    velocities: Vec<(Matrix, Matrix)>,
}

impl Sgd {
    pub fn new(learning_rate_init: f64, power_t: f64, momentum: f64, nesterov: bool) -> Sgd {
        Sgd {
            learning_rate_init,
            learning_rate: learning_rate_init,
            power_t,
            momentum,
            nesterov,
            velocities: Vec::new(),
        }
    }

    /// Applies one update to every layer given per-layer `(weights_grad, biases_grad)`.
    ///
    /// `v = momentum * v - lr * g`; the applied update is `v`, or
    /// `momentum * v - lr * g` again when Nesterov momentum is on.
    pub fn step(&mut self, layers: &mut [Layer], grads: &[(Matrix, Matrix)]) {
        if self.velocities.len() != layers.len() {
            self.velocities = layers.iter()
                .map(|l| (
                    Matrix::zeros(l.weights.rows, l.weights.cols),
                    Matrix::zeros(l.biases.rows, l.biases.cols),
                ))
                .collect();
        }

        let lr = self.learning_rate;
        let momentum = self.momentum;
        for ((layer, (w_grad, b_grad)), (w_vel, b_vel)) in layers.iter_mut()
            .zip(grads)
            .zip(self.velocities.iter_mut())
        {
            let w_update = Sgd::velocity_update(w_vel, w_grad, lr, momentum, self.nesterov);
            let b_update = Sgd::velocity_update(b_vel, b_grad, lr, momentum, self.nesterov);
            layer.apply_updates(&w_update, &b_update);
        }
    }

    fn velocity_update(velocity: &mut Matrix, grad: &Matrix, lr: f64, momentum: f64, nesterov: bool) -> Matrix {
        *velocity = velocity.map(|v| v * momentum);
        velocity.scaled_add(-lr, grad);
        if nesterov {
            let mut update = velocity.map(|v| v * momentum);
            update.scaled_add(-lr, grad);
            update
        } else {
            velocity.clone()
        }
    }

    /// Advances the schedule once an epoch ends; `samples_seen` counts every
    /// sample of every epoch so far.
    pub fn iteration_ends(&mut self, samples_seen: usize) {
        self.learning_rate = self.learning_rate_init / ((samples_seen + 1) as f64).powf(self.power_t);
    }
}
