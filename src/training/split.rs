//! Seeded train/test split

use crate::error::{Result, StudioError};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Row positions of the two halves of a split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with a fixed seed and hold out `ceil(test_size * n)` rows.
///
/// At least one row always stays on each side, so `n` must be at least 2.
pub fn train_test_split(n: usize, test_size: f64, seed: u64) -> Result<SplitIndices> {
    if n < 2 {
        return Err(StudioError::Computation(format!(
            "at least 2 rows are needed to split, got {}",
            n
        )));
    }
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(StudioError::Computation(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }

    let n_test = ((test_size * n as f64).ceil() as usize).clamp(1, n - 1);

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok(SplitIndices { train, test: indices })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes() {
        let split = train_test_split(10, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.len(), 8);

        let split = train_test_split(11, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 3);
    }

    #[test]
    fn test_split_is_partition() {
        let split = train_test_split(25, 0.2, 1).unwrap();
        let mut all: Vec<usize> = split.train.iter().chain(split.test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..25).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_deterministic() {
        assert_eq!(
            train_test_split(30, 0.2, 42).unwrap(),
            train_test_split(30, 0.2, 42).unwrap()
        );
    }

    #[test]
    fn test_two_rows_keep_one_each_side() {
        let split = train_test_split(2, 0.2, 42).unwrap();
        assert_eq!(split.train.len(), 1);
        assert_eq!(split.test.len(), 1);
    }

    #[test]
    fn test_too_few_rows() {
        assert!(train_test_split(1, 0.2, 42).is_err());
        assert!(train_test_split(0, 0.2, 42).is_err());
    }
}
