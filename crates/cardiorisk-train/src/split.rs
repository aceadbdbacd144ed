//! Seeded, class-stratified train/test split and k-fold assignment.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Indices of each class, shuffled with `rng`.
fn shuffled_classes(labels: &[u8], rng: &mut StdRng) -> [Vec<usize>; 2] {
    let mut classes: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
    for (i, &y) in labels.iter().enumerate() {
        classes[usize::from(y == 1)].push(i);
    }
    for class in classes.iter_mut() {
        class.shuffle(rng);
    }
    classes
}

/// Split indices into `(train, test)` keeping the class ratio in both parts.
/// Each class contributes `round(n_class * test_fraction)` rows to the test side.
pub fn stratified_split(labels: &[u8], test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for class in shuffled_classes(labels, &mut rng) {
        let n_test = ((class.len() as f64) * test_fraction).round() as usize;
        let (test_part, train_part) = class.split_at(n_test.min(class.len()));
        test.extend_from_slice(test_part);
        train.extend_from_slice(train_part);
    }

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);
    (train, test)
}

/// Deal each class round-robin into `k` folds.
pub fn stratified_folds(labels: &[u8], k: usize, seed: u64) -> Vec<Vec<usize>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut folds = vec![Vec::new(); k.max(1)];
    let mut next = 0;
    for class in shuffled_classes(labels, &mut rng) {
        for i in class {
            let slot = next % folds.len();
            folds[slot].push(i);
            next += 1;
        }
    }
    folds
}

/// Train indices for fold `held_out`: every index not in that fold.
pub fn complement(folds: &[Vec<usize>], held_out: usize) -> Vec<usize> {
    folds
        .iter()
        .enumerate()
        .filter(|(k, _)| *k != held_out)
        .flat_map(|(_, fold)| fold.iter().copied())
        .collect()
}
