//! Observes the log output itself: the training loop must not let a single
//! non-convergence warning through, while a bare epoch still emits one.
//!
//! `log` allows one logger per process, so everything runs in one test.

use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};

use ferrite_mlp::classifier::CONVERGENCE_TARGET;
use ferrite_mlp::{train_eval_loop, Classifier, Dataset, MetricHistory, MlpClassifier, MlpParams};

struct CapturingLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.records
            .lock()
            .unwrap()
            .push((record.level(), record.target().to_string()));
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger { records: Mutex::new(Vec::new()) };

fn convergence_warnings() -> usize {
    LOGGER
        .records
        .lock()
        .unwrap()
        .iter()
        .filter(|(level, target)| *level == Level::Warn && target == CONVERGENCE_TARGET)
        .count()
}

fn clear() {
    LOGGER.records.lock().unwrap().clear();
}

fn stripes(n: usize) -> Dataset {
    let rows: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            let on = i % 2 == 0;
            vec![if on { 0.9 } else { 0.1 }, if on { 0.1 } else { 0.9 }, 0.5]
        })
        .collect();
    Dataset::from_rows(&rows, (0..n).map(|i| if i % 2 == 0 { "3" } else { "8" })).unwrap()
}

fn model() -> MlpClassifier {
    MlpClassifier::new(MlpParams {
        hidden_layer_sizes: vec![4],
        batch_size: 4,
        learning_rate_init: 0.05,
        random_state: 7,
        ..MlpParams::default()
    })
}

#[test]
fn loop_is_silent_and_bare_epochs_warn() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Trace);
    let data = stripes(16);

    clear();
    let mut looped = model();
    train_eval_loop(&mut looped, &data, &data, 3, &mut MetricHistory::default()).unwrap();
    assert!(!looped.is_converged());
    assert_eq!(convergence_warnings(), 0);
    assert!(looped.convergence_warnings_enabled());

    // Same state, driven without the guard.
    clear();
    looped.advance_one_epoch(&data).unwrap();
    assert_eq!(convergence_warnings(), 1);

    clear();
    let mut direct = model();
    direct.advance_one_epoch(&data).unwrap();
    direct.advance_one_epoch(&data).unwrap();
    assert_eq!(convergence_warnings(), 2);

    clear();
    direct.set_convergence_warnings(false);
    direct.advance_one_epoch(&data).unwrap();
    assert_eq!(convergence_warnings(), 0);
}
