//! Classification quality scores

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::data::Label;
use crate::error::AnalysisError;

/// Accuracy and support-weighted F1 of one labelled dataset
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassificationScores {
    pub accuracy: f64,
    pub f1: f64,
    pub support: usize,
}

impl ClassificationScores {
    pub fn compute(target: &[Label], prediction: &[Label]) -> Result<Self, AnalysisError> {
        if target.len() != prediction.len() {
            return Err(AnalysisError::LengthMismatch {
                left: "target".to_string(),
                right: "prediction".to_string(),
                left_len: target.len(),
                right_len: prediction.len(),
            });
        }
        if target.is_empty() {
            return Err(AnalysisError::EmptyDataset("labelled".to_string()));
        }

        Ok(Self {
            accuracy: accuracy(target, prediction),
            f1: weighted_f1(target, prediction),
            support: target.len(),
        })
    }
}

/// Fraction of positions where both labels agree. Inputs must be the same length.
pub fn accuracy(target: &[Label], prediction: &[Label]) -> f64 {
    if target.is_empty() {
        return 0.0;
    }
    let correct = target
        .iter()
        .zip(prediction)
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / target.len() as f64
}

#[derive(Default)]
struct ClassCounts {
    true_positive: usize,
    predicted: usize,
    support: usize,
}

/// F1 per class over every label seen in either column, weighted by support.
pub fn weighted_f1(target: &[Label], prediction: &[Label]) -> f64 {
    if target.is_empty() {
        return 0.0;
    }

    let labels: BTreeSet<Label> = target.iter().chain(prediction).copied().collect();
    let mut counts: BTreeMap<Label, ClassCounts> = labels
        .into_iter()
        .map(|l| (l, ClassCounts::default()))
        .collect();

    for (t, p) in target.iter().zip(prediction) {
        if let Some(c) = counts.get_mut(t) {
            c.support += 1;
            if t == p {
                c.true_positive += 1;
            }
        }
        if let Some(c) = counts.get_mut(p) {
            c.predicted += 1;
        }
    }

    let weighted: f64 = counts
        .values()
        .map(|c| {
            let precision = ratio(c.true_positive, c.predicted);
            let recall = ratio(c.true_positive, c.support);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            f1 * c.support as f64
        })
        .sum();

    weighted / target.len() as f64
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_agreement_scores_one() {
        let labels = [0, 1, 2, 2, 1, 0];
        let scores = ClassificationScores::compute(&labels, &labels).expect("scores");
        assert_eq!(scores.accuracy, 1.0);
        assert_eq!(scores.f1, 1.0);
        assert_eq!(scores.support, 6);
    }

    #[test]
    fn test_weighted_f1_matches_hand_computation() {
        // class 0: p=1/2 r=1/2 f1=1/2 support 2
        // class 1: p=1/2 r=1/2 f1=1/2 support 2
        let target = [0, 0, 1, 1];
        let prediction = [0, 1, 1, 0];
        assert!((weighted_f1(&target, &prediction) - 0.5).abs() < 1e-12);
        assert!((accuracy(&target, &prediction) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_predicted_only_label_has_no_weight() {
        // label 2 has zero support and contributes nothing
        let target = [0, 0, 0, 0];
        let prediction = [0, 0, 0, 2];
        let f1 = weighted_f1(&target, &prediction);
        // class 0: p=1 r=3/4 f1=6/7
        assert!((f1 - 6.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let err = ClassificationScores::compute(&[0, 1], &[0]).unwrap_err();
        assert!(matches!(err, AnalysisError::LengthMismatch { .. }));
    }

    #[test]
    fn test_empty_input_rejected() {
        let err = ClassificationScores::compute(&[], &[]).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyDataset(_)));
    }
}
