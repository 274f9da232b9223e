use crate::error::{TrainingError, TrainingResult};
use serde::{Deserialize, Serialize};

/// A single labeled example for sequence classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledExample {
    pub text: String,
    pub label: i64,
}

pub type Dataset = Vec<LabeledExample>;

/// Texts of the synthetic fallback dataset, cycled with `SYNTHETIC_LABELS`.
pub const SYNTHETIC_TEXTS: [&str; 4] =
    ["This is great!", "This is bad", "Amazing product", "Terrible experience"];

pub const SYNTHETIC_LABELS: [i64; 4] = [1, 0, 1, 0];

/// Number of times the synthetic texts are repeated (1000 examples total).
pub const SYNTHETIC_REPEATS: usize = 250;

/// Builds the synthetic fallback dataset used when no external dataset
/// source is usable: the four fixed texts repeated 250 times with an even
/// positive/negative label split.
#[must_use]
pub fn synthetic_dataset() -> Dataset {
    let mut examples = Vec::with_capacity(SYNTHETIC_TEXTS.len() * SYNTHETIC_REPEATS);
    for _ in 0..SYNTHETIC_REPEATS {
        for (text, label) in SYNTHETIC_TEXTS.iter().zip(SYNTHETIC_LABELS) {
            examples.push(LabeledExample { text: (*text).to_string(), label });
        }
    }
    examples
}

pub fn validate_examples(examples: &[LabeledExample]) -> TrainingResult<()> {
    if examples.is_empty() {
        return Err(TrainingError::Dataset("dataset must not be empty".to_string()));
    }
    for (idx, ex) in examples.iter().enumerate() {
        if ex.text.trim().is_empty() {
            return Err(TrainingError::Dataset(format!("example[{idx}] text is empty")));
        }
    }
    Ok(())
}

/// Splits a dataset into train and held-out evaluation parts.
///
/// Deterministic: every `1/holdout` example (by index) lands in the holdout
/// set, so repeated runs over the same dataset evaluate on the same rows.
/// `holdout = 5` gives the 80/20 split used by the pipeline.
#[must_use]
pub fn split_holdout(examples: &[LabeledExample], holdout: usize) -> (Dataset, Dataset) {
    let mut train = Vec::new();
    let mut eval = Vec::new();
    for (idx, ex) in examples.iter().enumerate() {
        if holdout > 1 && idx % holdout == holdout - 1 {
            eval.push(ex.clone());
        } else {
            train.push(ex.clone());
        }
    }
    (train, eval)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_dataset_has_fixed_size_and_label_split() {
        let dataset = synthetic_dataset();
        assert_eq!(dataset.len(), 1000);
        let positives = dataset.iter().filter(|ex| ex.label == 1).count();
        let negatives = dataset.iter().filter(|ex| ex.label == 0).count();
        assert_eq!(positives, 500);
        assert_eq!(negatives, 500);
        assert_eq!(dataset[0].text, "This is great!");
        assert_eq!(dataset[1].label, 0);
    }

    #[test]
    fn test_validate_examples_rejects_empty_dataset() {
        assert!(validate_examples(&[]).is_err());
    }

    #[test]
    fn test_validate_examples_rejects_blank_text() {
        let examples = vec![LabeledExample { text: "   ".to_string(), label: 0 }];
        assert!(validate_examples(&examples).is_err());
    }

    #[test]
    fn test_split_holdout_is_deterministic_and_disjoint() {
        let dataset = synthetic_dataset();
        let (train_a, eval_a) = split_holdout(&dataset, 5);
        let (train_b, eval_b) = split_holdout(&dataset, 5);
        assert_eq!(train_a, train_b);
        assert_eq!(eval_a, eval_b);
        assert_eq!(train_a.len() + eval_a.len(), dataset.len());
        assert_eq!(eval_a.len(), dataset.len() / 5);
    }
}
