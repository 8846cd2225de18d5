use clap::Parser;

use crate::error::ConfigError;
use crate::train::train_config::RunConfig;

/// Train an MLP on handwritten digits, scoring the held-out set after every epoch.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "ferrite-mlp", version, about)]
pub struct Args {
    /// Input batch size
    #[arg(long, default_value_t = 64, value_name = "N", allow_negative_numbers = true)]
    pub batch_size: i64,

    /// Number of epochs to train
    #[arg(long, default_value_t = 14, value_name = "N", allow_negative_numbers = true)]
    pub epochs: i64,

    /// Initial learning rate
    #[arg(long, default_value_t = 0.01, value_name = "LR", allow_negative_numbers = true)]
    pub lr: f64,

    /// Learning-rate decay power (inverse scaling; 0 keeps it constant)
    #[arg(long, default_value_t = 0.0, value_name = "M", allow_negative_numbers = true)]
    pub gamma: f64,

    /// Random seed of the classifier
    #[arg(long, default_value_t = 1, value_name = "S", allow_negative_numbers = true)]
    pub seed: i64,

    /// Save the trained model
    #[arg(long)]
    pub save_model: bool,
}

impl TryFrom<Args> for RunConfig {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        RunConfig::validate(args.batch_size, args.epochs, args.lr, args.gamma, args.seed, args.save_model)
    }
}
