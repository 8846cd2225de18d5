use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::DataError;
use crate::math::matrix::Matrix;

/// Class label. The digit data labels its samples "0".."9".
pub type Label = String;

/// Ordered (feature vector, label) pairs with a fixed feature width.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Matrix,
    labels: Vec<Label>,
}

impl Dataset {
    /// One row of `features` per label.
    pub fn new(features: Matrix, labels: Vec<Label>) -> Result<Dataset, DataError> {
        if features.rows != labels.len() {
            return Err(DataError::LengthMismatch {
                features: features.rows,
                labels: labels.len(),
            });
        }
        Ok(Dataset { features, labels })
    }

    /// Convenience constructor from per-sample rows.
    ///
    /// # Panics
    /// Panics if the rows have differing lengths.
    pub fn from_rows<L: Into<Label>>(
        rows: &[Vec<f64>],
        labels: impl IntoIterator<Item = L>,
    ) -> Result<Dataset, DataError> {
        Dataset::new(Matrix::from_rows(rows), labels.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.features.cols
    }

    pub fn features(&self) -> &Matrix {
        &self.features
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Sorted, de-duplicated labels.
    pub fn classes(&self) -> Vec<Label> {
        let mut classes = self.labels.clone();
        classes.sort();
        classes.dedup();
        classes
    }

    /// Samples at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: self.features.select_rows(indices),
            labels: indices.iter().map(|&i| self.labels[i].clone()).collect(),
        }
    }

    /// Appends `other`'s samples after this set's.
    pub fn concat(mut self, other: Dataset) -> Result<Dataset, DataError> {
        if !self.is_empty() && !other.is_empty() && self.n_features() != other.n_features() {
            return Err(DataError::Format(format!(
                "cannot concatenate datasets with {} and {} features",
                self.n_features(),
                other.n_features()
            )));
        }
        if self.is_empty() {
            return Ok(other);
        }
        self.features.data.extend_from_slice(&other.features.data);
        self.features.rows += other.features.rows;
        self.labels.extend(other.labels);
        Ok(self)
    }
}

/// Deterministically partitions `data` into `(train, test)`.
///
/// The sample indices are permuted with a ChaCha8 RNG seeded by `seed`; the
/// first `test_size` permuted indices form the test set and the rest the
/// train set, each in permutation order. Same seed, same split.
pub fn train_test_split(
    data: &Dataset,
    test_size: usize,
    seed: u64,
) -> Result<(Dataset, Dataset), DataError> {
    let len = data.len();
    if test_size == 0 || test_size >= len {
        return Err(DataError::InvalidSplit { test_size, len });
    }

    let mut indices: Vec<usize> = (0..len).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(test_size);
    Ok((data.select(train_idx), data.select(test_idx)))
}

/// Pixel intensities `0..=255` scaled into `[0, 1]`.
pub fn normalize_pixels(pixels: &[u8]) -> Vec<f64> {
    pixels.iter().map(|&p| p as f64 / 255.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> Dataset {
        let rows: Vec<Vec<f64>> = (0..n).map(|i| vec![i as f64, 0.0]).collect();
        Dataset::from_rows(&rows, (0..n).map(|i| (i % 3).to_string())).unwrap()
    }

    #[test]
    fn split_sizes_and_disjointness() {
        let data = numbered(50);
        let (train, test) = train_test_split(&data, 12, 0).unwrap();
        assert_eq!(test.len(), 12);
        assert_eq!(train.len(), 38);

        let mut ids: Vec<usize> = train.features().iter_rows()
            .chain(test.features().iter_rows())
            .map(|r| r[0] as usize)
            .collect();
        ids.sort();
        assert_eq!(ids, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn split_is_reproducible_and_seed_dependent() {
        let data = numbered(40);
        let a = train_test_split(&data, 10, 0).unwrap();
        let b = train_test_split(&data, 10, 0).unwrap();
        assert_eq!(a, b);

        let c = train_test_split(&data, 10, 1).unwrap();
        assert_ne!(a.1, c.1);
    }

    #[test]
    fn split_keeps_features_and_labels_aligned() {
        let data = numbered(30);
        let (train, test) = train_test_split(&data, 7, 5).unwrap();
        for set in [&train, &test] {
            for (row, label) in set.features().iter_rows().zip(set.labels()) {
                assert_eq!(&((row[0] as usize) % 3).to_string(), label);
            }
        }
    }

    #[test]
    fn split_rejects_degenerate_sizes() {
        let data = numbered(5);
        assert!(matches!(train_test_split(&data, 0, 0), Err(DataError::InvalidSplit { .. })));
        assert!(matches!(train_test_split(&data, 5, 0), Err(DataError::InvalidSplit { test_size: 5, len: 5 })));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let err = Dataset::new(Matrix::zeros(3, 2), vec!["a".into()]).unwrap_err();
        assert!(matches!(err, DataError::LengthMismatch { features: 3, labels: 1 }));
    }

    #[test]
    fn classes_are_sorted_unique() {
        assert_eq!(numbered(10).classes(), vec!["0", "1", "2"]);
    }

    #[test]
    fn normalization_maps_into_unit_interval() {
        assert_eq!(normalize_pixels(&[0, 51, 255]), vec![0.0, 0.2, 1.0]);
    }
}
