use crate::classifier::Classifier;
use crate::data::dataset::Dataset;
use crate::error::RunError;
use crate::train::loop_fn::train_eval_loop;
use crate::train::persist::{ModelPersister, MODEL_FILE};
use crate::train::reporter::Reporter;
use crate::train::train_config::RunConfig;

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub elapsed_seconds: f64,
    pub saved_to: Option<String>,
}

/// Trains and scores for `config.epochs` epochs, then hands the final model to
/// `persister` exactly once if `config.save_model` is set.
pub fn run<C, R, P>(
    config: &RunConfig,
    classifier: &mut C,
    train: &Dataset,
    test: &Dataset,
    reporter: &mut R,
    persister: &mut P,
) -> Result<RunSummary, RunError>
where
    C: Classifier + ?Sized,
    R: Reporter + ?Sized,
    P: ModelPersister<C> + ?Sized,
{
    let elapsed_seconds = train_eval_loop(classifier, train, test, config.epochs, reporter)?;

    let saved_to = if config.save_model {
        persister.save(&*classifier, MODEL_FILE)?;
        Some(MODEL_FILE.to_string())
    } else {
        None
    };

    Ok(RunSummary { elapsed_seconds, saved_to })
}
