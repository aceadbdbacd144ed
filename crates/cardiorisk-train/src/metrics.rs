//! Classification metrics and coefficient importance.

use cardiorisk_model::DECISION_THRESHOLD;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub true_negative: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub true_positive: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(labels: &[u8], predicted: &[u8]) -> Self {
        let mut m = Self::default();
        for (&y, &p) in labels.iter().zip(predicted) {
            match (y, p) {
                (1, 1) => m.true_positive += 1,
                (1, _) => m.false_negative += 1,
                (_, 1) => m.false_positive += 1,
                _ => m.true_negative += 1,
            }
        }
        m
    }

    pub fn total(&self) -> usize {
        self.true_negative + self.false_positive + self.false_negative + self.true_positive
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positive + self.true_negative, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_positive)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_negative)
    }

    /// Harmonic mean of precision and recall; 0 when both are 0.
    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub samples: usize,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// `None` when the labels hold a single class.
    pub roc_auc: Option<f64>,
    pub confusion: ConfusionMatrix,
}

pub fn threshold(proba: &[f64]) -> Vec<u8> {
    proba.iter().map(|&p| u8::from(p > DECISION_THRESHOLD)).collect()
}

pub fn evaluate(labels: &[u8], proba: &[f64]) -> Evaluation {
    let confusion = ConfusionMatrix::from_predictions(labels, &threshold(proba));
    Evaluation {
        samples: labels.len(),
        accuracy: confusion.accuracy(),
        precision: confusion.precision(),
        recall: confusion.recall(),
        f1: confusion.f1(),
        roc_auc: roc_auc(labels, proba),
        confusion,
    }
}

/// Area under the ROC curve via the Mann-Whitney U statistic, with tied
/// scores sharing their average rank.
pub fn roc_auc(labels: &[u8], scores: &[f64]) -> Option<f64> {
    let n = labels.len().min(scores.len());
    let positives = labels[..n].iter().filter(|&&y| y == 1).count();
    let negatives = n - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut indexed: Vec<(usize, f64)> = scores[..n].iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut rank_sum = 0.0;
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && indexed[j + 1].1 == indexed[i].1 {
            j += 1;
        }
        let avg_rank = (i + j + 2) as f64 / 2.0;
        for item in &indexed[i..=j] {
            if labels[item.0] == 1 {
                rank_sum += avg_rank;
            }
        }
        i = j + 1;
    }

    let (p, q) = (positives as f64, negatives as f64);
    Some((rank_sum - p * (p + 1.0) / 2.0) / (p * q))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureWeight {
    pub feature: &'static str,
    pub weight: f64,
}

/// Coefficients ranked by magnitude. Comparable across features because the
/// numeric inputs are standardised.
pub fn coefficient_importance(features: &[&'static str], weights: &[f32]) -> Vec<FeatureWeight> {
    let mut ranked: Vec<FeatureWeight> = features
        .iter()
        .zip(weights)
        .map(|(&feature, &w)| FeatureWeight { feature, weight: f64::from(w) })
        .collect();
    ranked.sort_by(|a, b| {
        b.weight
            .abs()
            .partial_cmp(&a.weight.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_confusion_and_scores() {
        let labels = [1, 1, 1, 0, 0, 0, 0, 1];
        let predicted = [1, 1, 0, 0, 0, 1, 0, 1];
        let m = ConfusionMatrix::from_predictions(&labels, &predicted);

        assert_eq!(
            m,
            ConfusionMatrix { true_negative: 3, false_positive: 1, false_negative: 1, true_positive: 3 }
        );
        assert_eq!(m.accuracy(), 0.75);
        assert_eq!(m.precision(), 0.75);
        assert_eq!(m.recall(), 0.75);
        assert!((m.f1() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_f1_without_positives_is_zero() {
        let m = ConfusionMatrix::from_predictions(&[0, 0], &[0, 0]);
        assert_eq!(m.f1(), 0.0);
    }

    #[test]
    fn test_threshold_is_strict() {
        assert_eq!(threshold(&[0.5, 0.5000001, 0.2]), vec![0, 1, 0]);
    }

    #[test]
    fn test_roc_auc() {
        // perfect ranking
        assert_eq!(roc_auc(&[0, 0, 1, 1], &[0.1, 0.2, 0.8, 0.9]), Some(1.0));
        // inverted
        assert_eq!(roc_auc(&[1, 1, 0, 0], &[0.1, 0.2, 0.8, 0.9]), Some(0.0));
        // one discordant pair out of four
        assert_eq!(roc_auc(&[0, 0, 1, 1], &[0.1, 0.4, 0.35, 0.8]), Some(0.75));
        // ties count half
        assert_eq!(roc_auc(&[0, 1], &[0.5, 0.5]), Some(0.5));
        assert_eq!(roc_auc(&[1, 1], &[0.2, 0.3]), None);
    }

    #[test]
    fn test_coefficient_importance_sorted_by_magnitude() {
        let ranked = coefficient_importance(&["ap_hi", "smoke", "bmi"], &[0.5, -1.5, 0.25]);
        let order: Vec<&str> = ranked.iter().map(|f| f.feature).collect();
        assert_eq!(order, vec!["smoke", "ap_hi", "bmi"]);
        assert_eq!(ranked[0].weight, -1.5);
    }
}
