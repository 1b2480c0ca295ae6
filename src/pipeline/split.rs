//! Stratified train/test splitting

use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::error::{ChurnError, Result};

/// Default held-out fraction
pub const DEFAULT_TEST_SIZE: f64 = 0.2;

/// Default random seed for the split and every candidate
pub const DEFAULT_RANDOM_STATE: u64 = 42;

/// Row indices of the two partitions, each in ascending order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

impl TrainTestSplit {
    pub fn train_len(&self) -> usize {
        self.train_indices.len()
    }

    pub fn test_len(&self) -> usize {
        self.test_indices.len()
    }
}

/// Split row indices so that both partitions keep the class proportions.
///
/// The test partition holds `ceil(test_size * n)` rows. Per-class test counts
/// are allocated by largest remainder and clamped so that every class keeps at
/// least one row on each side.
pub fn stratified_split(labels: &[i32], test_size: f64, seed: u64) -> Result<TrainTestSplit> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(ChurnError::Split(format!(
            "test size must be strictly between 0 and 1, got {}",
            test_size
        )));
    }

    let n = labels.len();
    let mut classes: Vec<i32> = labels.to_vec();
    classes.sort_unstable();
    classes.dedup();

    if classes.len() < 2 {
        return Err(ChurnError::Split(format!(
            "stratification needs at least two classes, found {}",
            classes.len()
        )));
    }

    let members: Vec<Vec<usize>> = classes
        .iter()
        .map(|c| (0..n).filter(|&i| labels[i] == *c).collect())
        .collect();

    if let Some((class, rows)) = classes
        .iter()
        .zip(members.iter())
        .find(|(_, rows)| rows.len() < 2)
    {
        return Err(ChurnError::Split(format!(
            "class {} has only {} member(s); at least 2 are required",
            class,
            rows.len()
        )));
    }

    let n_test = ((test_size * n as f64).ceil() as usize).clamp(classes.len(), n - classes.len());
    let allocation = allocate_test_counts(&members, n_test, n);

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut train_indices = Vec::with_capacity(n - n_test);
    let mut test_indices = Vec::with_capacity(n_test);

    for (rows, take) in members.iter().zip(allocation) {
        let mut shuffled = rows.clone();
        shuffled.shuffle(&mut rng);
        test_indices.extend_from_slice(&shuffled[..take]);
        train_indices.extend_from_slice(&shuffled[take..]);
    }

    train_indices.sort_unstable();
    test_indices.sort_unstable();

    Ok(TrainTestSplit {
        train_indices,
        test_indices,
    })
}

/// Largest-remainder allocation of `n_test` rows across classes
fn allocate_test_counts(members: &[Vec<usize>], n_test: usize, n: usize) -> Vec<usize> {
    let exact: Vec<f64> = members
        .iter()
        .map(|rows| n_test as f64 * rows.len() as f64 / n as f64)
        .collect();

    let mut counts: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();
    let mut remaining = n_test.saturating_sub(counts.iter().sum());

    let mut order: Vec<usize> = (0..members.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.partial_cmp(&ra)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });
    for &c in order.iter().cycle().take(order.len() * 2) {
        if remaining == 0 {
            break;
        }
        if counts[c] + 1 < members[c].len() {
            counts[c] += 1;
            remaining -= 1;
        }
    }

    // Every class keeps at least one row on each side
    for (count, rows) in counts.iter_mut().zip(members) {
        *count = (*count).clamp(1, rows.len() - 1);
    }

    counts
}

/// Gather rows of a frame by index
pub fn take_rows(df: &DataFrame, indices: &[usize]) -> Result<DataFrame> {
    let idx: Vec<IdxSize> = indices.iter().map(|&i| i as IdxSize).collect();
    let idx = IdxCa::from_vec(PlSmallStr::EMPTY, idx);
    Ok(df.take(&idx)?)
}

/// Gather labels by index
pub fn take_labels(labels: &[i32], indices: &[usize]) -> Vec<i32> {
    indices.iter().map(|&i| labels[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pos: usize, neg: usize) -> Vec<i32> {
        let mut v = vec![1; pos];
        v.extend(vec![0; neg]);
        v
    }

    #[test]
    fn test_split_sizes_and_disjointness() {
        let y = labels(27, 73);
        let split = stratified_split(&y, 0.2, 42).unwrap();

        assert_eq!(split.test_len(), 20);
        assert_eq!(split.train_len(), 80);

        let mut all: Vec<usize> = split
            .train_indices
            .iter()
            .chain(split.test_indices.iter())
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_preserves_proportions() {
        let y = labels(30, 70);
        let split = stratified_split(&y, 0.2, 7).unwrap();
        let test_pos = split.test_indices.iter().filter(|&&i| y[i] == 1).count();
        assert_eq!(test_pos, 6);
    }

    #[test]
    fn test_split_is_deterministic() {
        let y = labels(40, 60);
        let a = stratified_split(&y, 0.25, 42).unwrap();
        let b = stratified_split(&y, 0.25, 42).unwrap();
        let c = stratified_split(&y, 0.25, 43).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.test_indices, c.test_indices);
    }

    #[test]
    fn test_split_rejects_bad_fraction() {
        let y = labels(5, 5);
        assert!(matches!(stratified_split(&y, 0.0, 1), Err(ChurnError::Split(_))));
        assert!(matches!(stratified_split(&y, 1.0, 1), Err(ChurnError::Split(_))));
    }

    #[test]
    fn test_split_rejects_tiny_class() {
        let y = labels(1, 9);
        assert!(matches!(stratified_split(&y, 0.2, 1), Err(ChurnError::Split(_))));
    }

    #[test]
    fn test_small_class_lands_on_both_sides() {
        let y = labels(2, 18);
        let split = stratified_split(&y, 0.1, 3).unwrap();
        let test_pos = split.test_indices.iter().filter(|&&i| y[i] == 1).count();
        let train_pos = split.train_indices.iter().filter(|&&i| y[i] == 1).count();
        assert_eq!(test_pos, 1);
        assert_eq!(train_pos, 1);
    }
}
