use crate::activation::activation::ActivationFunction;
use crate::classifier::mlp::MlpParams;
use crate::error::ConfigError;

/// Hidden-layer widths of the digit classifier.
pub const HIDDEN_LAYER_SIZES: [usize; 4] = [1000, 100, 40, 20];

/// Samples held out for scoring.
pub const TEST_SIZE: usize = 10_000;

/// Seed of the train/test partition. Independent of `RunConfig::seed`, which
/// only seeds the classifier, so every run scores on the same test set.
pub const SPLIT_SEED: u64 = 0;

/// Validated run settings, fixed for the whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub batch_size: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    /// Exponent of the inverse-scaling learning-rate decay.
    pub lr_decay_power: f64,
    pub seed: u64,
    pub save_model: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            batch_size: 64,
            epochs: 14,
            learning_rate: 0.01,
            lr_decay_power: 0.0,
            seed: 1,
            save_model: false,
        }
    }
}

impl RunConfig {
    /// Checks raw (possibly negative) values as they arrive from the command line.
    pub fn validate(
        batch_size: i64,
        epochs: i64,
        learning_rate: f64,
        lr_decay_power: f64,
        seed: i64,
        save_model: bool,
    ) -> Result<RunConfig, ConfigError> {
        if batch_size < 1 {
            return Err(ConfigError::InvalidBatchSize(batch_size));
        }
        if epochs < 0 {
            return Err(ConfigError::NegativeEpochs(epochs));
        }
        if !learning_rate.is_finite() || learning_rate <= 0.0 {
            return Err(ConfigError::InvalidLearningRate(learning_rate));
        }
        if !lr_decay_power.is_finite() || lr_decay_power < 0.0 {
            return Err(ConfigError::InvalidDecayPower(lr_decay_power));
        }
        if seed < 0 || seed > u32::MAX as i64 {
            return Err(ConfigError::SeedOutOfRange { got: seed });
        }

        Ok(RunConfig {
            batch_size: batch_size as usize,
            epochs: epochs as usize,
            learning_rate,
            lr_decay_power,
            seed: seed as u64,
            save_model,
        })
    }
}

impl From<&RunConfig> for MlpParams {
    /// ReLU network with `HIDDEN_LAYER_SIZES`, Nesterov-momentum SGD and the
    /// run's batch size, learning rate, decay power and seed.
    fn from(config: &RunConfig) -> Self {
        MlpParams {
            hidden_layer_sizes: HIDDEN_LAYER_SIZES.to_vec(),
            activation: ActivationFunction::ReLU,
            batch_size: config.batch_size,
            learning_rate_init: config.learning_rate,
            power_t: config.lr_decay_power,
            random_state: config.seed,
            ..MlpParams::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate_to_the_default_config() {
        let config = RunConfig::validate(64, 14, 0.01, 0.0, 1, false).unwrap();
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn zero_epochs_is_allowed() {
        assert_eq!(RunConfig::validate(64, 0, 0.01, 0.0, 1, false).unwrap().epochs, 0);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert_eq!(RunConfig::validate(64, -1, 0.01, 0.0, 1, false), Err(ConfigError::NegativeEpochs(-1)));
        assert_eq!(RunConfig::validate(0, 1, 0.01, 0.0, 1, false), Err(ConfigError::InvalidBatchSize(0)));
        assert_eq!(RunConfig::validate(64, 1, 0.0, 0.0, 1, false), Err(ConfigError::InvalidLearningRate(0.0)));
        assert!(matches!(
            RunConfig::validate(64, 1, f64::NAN, 0.0, 1, false),
            Err(ConfigError::InvalidLearningRate(_))
        ));
        assert_eq!(RunConfig::validate(64, 1, 0.01, -0.5, 1, false), Err(ConfigError::InvalidDecayPower(-0.5)));
        assert_eq!(
            RunConfig::validate(64, 1, 0.01, 0.0, -3, false),
            Err(ConfigError::SeedOutOfRange { got: -3 })
        );
    }

    #[test]
    fn params_follow_the_config() {
        let config = RunConfig { batch_size: 32, learning_rate: 0.05, lr_decay_power: 0.25, seed: 9, ..RunConfig::default() };
        let params = MlpParams::from(&config);
        assert_eq!(params.hidden_layer_sizes, vec![1000, 100, 40, 20]);
        assert_eq!(params.batch_size, 32);
        assert_eq!(params.learning_rate_init, 0.05);
        assert_eq!(params.power_t, 0.25);
        assert_eq!(params.random_state, 9);
        assert!(params.nesterov);
    }
}
