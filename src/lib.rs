pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod classifier;
pub mod data;
pub mod train;
pub mod cli;
pub mod error;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::dense::Layer;
pub use network::network::Network;
pub use loss::cross_entropy::{CrossEntropyLoss, LOG_LOSS_EPS};
pub use optim::sgd::Sgd;
pub use classifier::{Classifier, ConvergenceWarningsSuppressed, MlpClassifier, MlpParams};
pub use data::{Dataset, DatasetProvider, Label, MnistProvider};
pub use train::{
    run, train_eval_loop, ConsoleReporter, EpochMetric, JsonPersister, MetricHistory,
    ModelPersister, Reporter, RunConfig,
};
pub use error::{ConfigError, DataError, EvaluationError, PersistError, RunError, TrainingError};
