// Trains the digit classifier and prints the held-out scores of every epoch.
// Run with:
//   cargo run --release -- --epochs 14 --save-model
use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use ferrite_mlp::cli::Args;
use ferrite_mlp::train::{SPLIT_SEED, TEST_SIZE};
use ferrite_mlp::{
    run, ConsoleReporter, DatasetProvider, JsonPersister, MlpClassifier, MlpParams,
    MnistProvider, RunConfig,
};

fn main() -> Result<()> {
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    pretty_env_logger::formatted_builder().parse_filters(&filters).init();

    let config = RunConfig::try_from(Args::parse()).context("invalid command-line arguments")?;
    info!("{:?}", config);

    let provider = MnistProvider::default();
    let (train, test) = provider
        .load_split(TEST_SIZE, SPLIT_SEED)
        .with_context(|| format!("loading digits from {}", provider.data_dir().display()))?;

    let params = MlpParams::from(&config);
    info!(
        "MLP {} -> {:?} -> softmax, {:?} hidden activation",
        train.n_features(),
        params.hidden_layer_sizes,
        params.activation
    );
    let mut model = MlpClassifier::new(params);

    let summary = run(
        &config,
        &mut model,
        &train,
        &test,
        &mut ConsoleReporter,
        &mut JsonPersister::new("."),
    )
    .context("training run aborted")?;

    if let Some(file) = summary.saved_to {
        info!("trained model written to {}", file);
    }
    Ok(())
}
