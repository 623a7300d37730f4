//! Completion state of story steps from live row counts.

use serde::{Deserialize, Serialize};

use crate::introspect::RowCounter;

use super::step::{SourceType, StoryStep};

/// Progress of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepProgress {
    pub current_count: u64,
    pub required: u64,
    pub is_complete: bool,
    /// 0..=100, floored; 100 when nothing is required.
    pub percentage: u8,
}

impl StepProgress {
    /// Progress of `current_count` rows against a threshold.
    pub fn new(current_count: u64, required: u64) -> Self {
        let percentage = if required == 0 {
            100
        } else {
            (u128::from(current_count) * 100 / u128::from(required)).min(100) as u8
        };

        Self {
            current_count,
            required,
            is_complete: current_count >= required,
            percentage,
        }
    }
}

/// Progress of a step against the live target database.
///
/// Never fails: a table that cannot be counted reports zero rows, and
/// view-backed steps always report zero.
pub fn step_progress(step: &StoryStep, counter: &impl RowCounter) -> StepProgress {
    let current = match step.source_type {
        SourceType::Table => counter.row_count(&step.source_name),
        SourceType::View => 0,
    };
    StepProgress::new(current, step.min_records_required)
}

/// A step together with its progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepStatus {
    pub step: StoryStep,
    pub progress: StepProgress,
}

/// Progress over a whole story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryProgress {
    /// Steps in stored order.
    pub steps: Vec<StepStatus>,
    pub total_steps: usize,
    pub completed_steps: usize,
    /// Floored share of complete steps; 100 for an empty story.
    pub overall_percentage: u8,
    pub is_complete: bool,
}

impl StoryProgress {
    /// The first incomplete step, in stored order.
    pub fn current_step(&self) -> Option<&StepStatus> {
        self.steps.iter().find(|s| !s.progress.is_complete)
    }
}

/// Aggregate progress of the given steps.
///
/// Callers pass the enabled steps ordered by `order_index`.
pub fn story_progress(steps: &[StoryStep], counter: &impl RowCounter) -> StoryProgress {
    let statuses: Vec<StepStatus> = steps
        .iter()
        .map(|step| StepStatus {
            step: step.clone(),
            progress: step_progress(step, counter),
        })
        .collect();

    let total_steps = statuses.len();
    let completed_steps = statuses.iter().filter(|s| s.progress.is_complete).count();
    let overall_percentage = if total_steps == 0 {
        100
    } else {
        (completed_steps * 100 / total_steps) as u8
    };

    StoryProgress {
        steps: statuses,
        total_steps,
        completed_steps,
        overall_percentage,
        is_complete: completed_steps == total_steps,
    }
}
