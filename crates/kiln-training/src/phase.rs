use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of a training job's forward-only state machine.
///
/// Jobs advance through the phases in declaration order; `Failed` is reachable
/// from any non-terminal phase. There are no backward transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    /// Job accepted, record created, nothing executed yet.
    Initializing,
    /// Optional advisory analysis of the model description.
    Analyzing,
    /// Resolving the training dataset.
    LoadingDataset,
    /// Resolving the tokenizer/model pair.
    PreparingModel,
    /// Delegate trainer is running epochs.
    Training,
    /// Held-out evaluation after training.
    Evaluating,
    /// Publishing artifacts to the hub.
    Deploying,
    /// Terminal success.
    Completed,
    /// Terminal failure.
    Failed,
}

impl JobPhase {
    /// All phases a status record may report, in pipeline order.
    pub const ALL: [Self; 9] = [
        Self::Initializing,
        Self::Analyzing,
        Self::LoadingDataset,
        Self::PreparingModel,
        Self::Training,
        Self::Evaluating,
        Self::Deploying,
        Self::Completed,
        Self::Failed,
    ];

    /// Position in the forward pipeline. `Failed` sits outside the sequence.
    const fn order(self) -> u8 {
        match self {
            Self::Initializing => 0,
            Self::Analyzing => 1,
            Self::LoadingDataset => 2,
            Self::PreparingModel => 3,
            Self::Training => 4,
            Self::Evaluating => 5,
            Self::Deploying => 6,
            Self::Completed => 7,
            Self::Failed => 8,
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Checks whether the job may move from this phase to `to`.
    ///
    /// Forward moves may skip optional phases (a job without a description
    /// goes straight from `Initializing` to `LoadingDataset`), but never
    /// revisit an earlier phase. Terminal phases admit no transition.
    #[must_use]
    pub fn can_advance_to(self, to: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        if to == Self::Failed {
            return true;
        }
        to.order() > self.order()
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Analyzing => "analyzing",
            Self::LoadingDataset => "loading_dataset",
            Self::PreparingModel => "preparing_model",
            Self::Training => "training",
            Self::Evaluating => "evaluating",
            Self::Deploying => "deploying",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_advance_in_order() {
        assert!(JobPhase::Initializing.can_advance_to(JobPhase::Analyzing));
        assert!(JobPhase::Analyzing.can_advance_to(JobPhase::LoadingDataset));
        assert!(JobPhase::Training.can_advance_to(JobPhase::Evaluating));
        assert!(JobPhase::Deploying.can_advance_to(JobPhase::Completed));
    }

    #[test]
    fn test_optional_phases_may_be_skipped() {
        assert!(JobPhase::Initializing.can_advance_to(JobPhase::LoadingDataset));
    }

    #[test]
    fn test_no_backward_transitions() {
        assert!(!JobPhase::Training.can_advance_to(JobPhase::LoadingDataset));
        assert!(!JobPhase::Evaluating.can_advance_to(JobPhase::Evaluating));
    }

    #[test]
    fn test_failed_reachable_from_any_non_terminal_phase() {
        for phase in JobPhase::ALL {
            assert_eq!(phase.can_advance_to(JobPhase::Failed), !phase.is_terminal());
        }
    }

    #[test]
    fn test_terminal_phases_admit_nothing() {
        assert!(!JobPhase::Completed.can_advance_to(JobPhase::Failed));
        assert!(!JobPhase::Failed.can_advance_to(JobPhase::Initializing));
    }

    #[test]
    fn test_serialization_uses_snake_case_vocabulary() {
        let json = serde_json::to_string(&JobPhase::LoadingDataset).unwrap();
        assert_eq!(json, "\"loading_dataset\"");
        for phase in JobPhase::ALL {
            let round: JobPhase =
                serde_json::from_str(&serde_json::to_string(&phase).unwrap()).unwrap();
            assert_eq!(round, phase);
            assert_eq!(serde_json::to_string(&phase).unwrap(), format!("\"{phase}\""));
        }
    }
}
