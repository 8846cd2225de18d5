pub mod epoch_stats;
pub mod loop_fn;
pub mod metrics;
pub mod persist;
pub mod reporter;
pub mod train_config;
pub mod trainer;

pub use epoch_stats::EpochMetric;
pub use loop_fn::train_eval_loop;
pub use metrics::{accuracy_counts, evaluate, log_loss};
pub use persist::{JsonPersister, ModelPersister, MODEL_FILE};
pub use reporter::{ConsoleReporter, MetricHistory, Reporter};
pub use train_config::{RunConfig, HIDDEN_LAYER_SIZES, SPLIT_SEED, TEST_SIZE};
pub use trainer::{run, RunSummary};
