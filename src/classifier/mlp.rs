use std::path::Path;

use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::classifier::Classifier;
use crate::data::dataset::{Dataset, Label};
use crate::error::{EvaluationError, PersistError, TrainingError};
use crate::loss::cross_entropy::CrossEntropyLoss;
use crate::math::matrix::Matrix;
use crate::network::network::Network;
use crate::optim::sgd::Sgd;

/// Log target of the per-epoch non-convergence warning.
pub const CONVERGENCE_TARGET: &str = "ferrite_mlp::convergence";

/// Rows scored per forward pass when predicting, to bound peak memory.
const PREDICT_CHUNK: usize = 4096;

/// Hyperparameters of an [`MlpClassifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlpParams {
    /// Widths of the hidden layers, input side first.
    pub hidden_layer_sizes: Vec<usize>,
    /// Activation of every hidden layer; the output layer is always softmax.
    pub activation: ActivationFunction,
    /// Samples per mini-batch, capped at the training-set size.
    pub batch_size: usize,
    pub learning_rate_init: f64,
    /// Exponent of the inverse-scaling schedule; 0 keeps the rate constant.
    pub power_t: f64,
    pub momentum: f64,
    pub nesterov: bool,
    /// L2 penalty.
    pub alpha: f64,
    /// Minimum loss improvement that resets the no-improvement counter.
    pub tol: f64,
    /// Epochs without `tol` improvement after which training counts as converged.
    pub n_iter_no_change: usize,
    /// Reshuffle the training samples every epoch.
    pub shuffle: bool,
    /// Seeds weight initialization and every epoch's shuffle.
    pub random_state: u64,
}

impl Default for MlpParams {
    fn default() -> Self {
        MlpParams {
            hidden_layer_sizes: vec![100],
            activation: ActivationFunction::ReLU,
            batch_size: 200,
            learning_rate_init: 0.001,
            power_t: 0.5,
            momentum: 0.9,
            nesterov: true,
            alpha: 1e-4,
            tol: 1e-4,
            n_iter_no_change: 10,
            shuffle: true,
            random_state: 0,
        }
    }
}

/// Multi-layer perceptron classifier trained with mini-batch SGD, one epoch
/// per [`Classifier::advance_one_epoch`] call.
///
/// The first epoch learns the class set from the training labels and
/// initializes the network; later epochs warm-start from the current
/// weights, optimizer velocities and learning-rate schedule. Randomness is
/// derived from `random_state` and the number of completed epochs only, so
/// a model saved with [`save_json`](Self::save_json) and reloaded continues
/// exactly as the saved instance would have.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlpClassifier {
    params: MlpParams,
    classes: Vec<Label>,
    network: Option<Network>,
    optimizer: Sgd,
    n_iter: usize,
    samples_seen: usize,
    loss_curve: Vec<f64>,
    best_loss: Option<f64>,
    no_improvement_count: usize,
    #[serde(skip, default = "warnings_on")]
    convergence_warnings: bool,
}

fn warnings_on() -> bool {
    true
}

impl MlpClassifier {
    pub fn new(params: MlpParams) -> MlpClassifier {
        let optimizer = Sgd::new(
            params.learning_rate_init,
            params.power_t,
            params.momentum,
            params.nesterov,
        );
        MlpClassifier {
            params,
            classes: Vec::new(),
            network: None,
            optimizer,
            n_iter: 0,
            samples_seen: 0,
            loss_curve: Vec::new(),
            best_loss: None,
            no_improvement_count: 0,
            convergence_warnings: true,
        }
    }

    pub fn params(&self) -> &MlpParams {
        &self.params
    }

    /// `None` until the first epoch has run.
    pub fn network(&self) -> Option<&Network> {
        self.network.as_ref()
    }

    /// Epochs completed so far.
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    /// Training loss of every completed epoch.
    pub fn loss_curve(&self) -> &[f64] {
        &self.loss_curve
    }

    /// Learning rate the next epoch will use.
    pub fn learning_rate(&self) -> f64 {
        self.optimizer.learning_rate
    }

    pub fn is_converged(&self) -> bool {
        self.no_improvement_count > self.params.n_iter_no_change
    }

    pub fn convergence_warnings_enabled(&self) -> bool {
        self.convergence_warnings
    }

    /// Serializes the full training state to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)
            .map_err(|source| PersistError::Io { path: path.to_path_buf(), source })?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a classifier previously written by `save_json`.
    pub fn load_json(path: impl AsRef<Path>) -> Result<MlpClassifier, PersistError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|source| PersistError::Io { path: path.to_path_buf(), source })?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Stream 0 initializes weights; stream `k` shuffles epoch `k`.
    fn rng(&self, stream: u64) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(self.params.random_state);
        rng.set_stream(stream);
        rng
    }

    fn update_no_improvement(&mut self, loss: f64) {
        let best = self.best_loss.unwrap_or(f64::INFINITY);
        if loss > best - self.params.tol {
            self.no_improvement_count += 1;
        } else {
            self.no_improvement_count = 0;
        }
        if loss < best {
            self.best_loss = Some(loss);
        }
    }
}

impl Classifier for MlpClassifier {
    fn advance_one_epoch(&mut self, train: &Dataset) -> Result<(), TrainingError> {
        if train.is_empty() {
            return Err(TrainingError::EmptyDataset);
        }

        match &self.network {
            None => self.classes = train.classes(),
            Some(net) if net.input_size() != train.n_features() => {
                return Err(TrainingError::FeatureMismatch {
                    expected: net.input_size(),
                    got: train.n_features(),
                });
            }
            Some(_) => {}
        }

        let targets = one_hot(&self.classes, train.labels())?;

        let n = train.len();
        let mut indices: Vec<usize> = (0..n).collect();
        if self.params.shuffle {
            indices.shuffle(&mut self.rng(self.n_iter as u64 + 1));
        }
        let mut init_rng = self.rng(0);

        let params = &self.params;
        let n_classes = self.classes.len();
        let network = self.network.get_or_insert_with(|| {
            Network::new(
                train.n_features(),
                &params.hidden_layer_sizes,
                params.activation,
                n_classes,
                &mut init_rng,
            )
        });

        let batch_size = params.batch_size.clamp(1, n);
        let mut total_loss = 0.0;
        for batch in indices.chunks(batch_size) {
            let inputs = train.features().select_rows(batch);
            let expected = targets.select_rows(batch);

            let pass = network.forward(inputs);
            total_loss += CrossEntropyLoss::mean_loss(pass.output(), &expected) * batch.len() as f64;

            let grads = network.backward(&pass, &expected, params.alpha);
            self.optimizer.step(&mut network.layers, &grads);
        }

        let loss = total_loss / n as f64
            + 0.5 * params.alpha * network.weight_sum_squares() / n as f64;

        self.n_iter += 1;
        if !loss.is_finite() {
            return Err(TrainingError::NonFiniteLoss { epoch: self.n_iter, loss });
        }

        self.samples_seen += n;
        self.loss_curve.push(loss);
        self.update_no_improvement(loss);
        self.optimizer.iteration_ends(self.samples_seen);

        debug!(
            "epoch {}: training loss {:.6}, next learning rate {:.6}",
            self.n_iter, loss, self.optimizer.learning_rate
        );
        if self.convergence_warnings && !self.is_converged() {
            warn!(
                target: CONVERGENCE_TARGET,
                "stochastic optimizer: epoch {} finished and the optimization hasn't converged yet",
                self.n_iter
            );
        }
        Ok(())
    }

    fn predict_proba(&self, data: &Dataset) -> Result<Vec<Vec<f64>>, EvaluationError> {
        let network = self.network.as_ref().ok_or(EvaluationError::NotFitted)?;
        if data.is_empty() {
            return Ok(Vec::new());
        }
        if data.n_features() != network.input_size() {
            return Err(EvaluationError::FeatureMismatch {
                expected: network.input_size(),
                got: data.n_features(),
            });
        }

        let mut rows = Vec::with_capacity(data.len());
        let all: Vec<usize> = (0..data.len()).collect();
        for chunk in all.chunks(PREDICT_CHUNK) {
            let probs = network.predict(&data.features().select_rows(chunk));
            rows.extend(probs.iter_rows().map(|r| r.to_vec()));
        }
        Ok(rows)
    }

    fn predict(&self, data: &Dataset) -> Result<Vec<Label>, EvaluationError> {
        let proba = self.predict_proba(data)?;
        Ok(proba.iter().map(|row| self.classes[argmax(row)].clone()).collect())
    }

    fn classes(&self) -> &[Label] {
        &self.classes
    }

    fn set_convergence_warnings(&mut self, enabled: bool) -> bool {
        std::mem::replace(&mut self.convergence_warnings, enabled)
    }
}

/// One-hot targets in `classes` column order.
fn one_hot(classes: &[Label], labels: &[Label]) -> Result<Matrix, TrainingError> {
    let mut targets = Matrix::zeros(labels.len(), classes.len());
    for (i, label) in labels.iter().enumerate() {
        let j = classes
            .binary_search(label)
            .map_err(|_| TrainingError::UnknownLabel(label.clone()))?;
        targets.row_mut(i)[j] = 1.0;
    }
    Ok(targets)
}

/// Index of the maximum element; the first one wins on ties.
fn argmax(v: &[f64]) -> usize {
    let mut best = 0;
    for (i, &x) in v.iter().enumerate() {
        if x > v[best] {
            best = i;
        }
    }
    best
}
