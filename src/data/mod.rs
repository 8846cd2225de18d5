pub mod dataset;
pub mod idx;
pub mod mnist;

pub use dataset::{normalize_pixels, train_test_split, Dataset, Label};
pub use mnist::MnistProvider;

use crate::error::DataError;

/// Source of a normalized, deterministically split dataset.
pub trait DatasetProvider {
    /// Returns `(train, test)` where `test` holds exactly `test_size` samples.
    /// The same `seed` must always produce the same partition.
    fn load_split(&self, test_size: usize, seed: u64) -> Result<(Dataset, Dataset), DataError>;
}
