//! Monotonic stage indicator

use cshield_common::events::StepState;

use super::stages::{Stage, STAGES, STAGE_COUNT};

/// Stepper state: one [`StepState`] per stage plus the displayed index
///
/// The displayed index only ever moves forward; an out-of-order message
/// naming an earlier stage leaves the stepper untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stepper {
    displayed: Option<usize>,
    steps: [StepState; STAGE_COUNT],
}

impl Stepper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to `index`, never regressing
    ///
    /// Returns `true` if the displayed index changed. Out-of-range indices
    /// are ignored.
    pub fn advance(&mut self, index: usize) -> bool {
        if index >= STAGE_COUNT {
            return false;
        }
        let target = self.displayed.map_or(index, |shown| shown.max(index));
        let changed = self.displayed != Some(target);
        self.displayed = Some(target);

        for (i, step) in self.steps.iter_mut().enumerate() {
            *step = if i < target {
                StepState::Done
            } else if i == target {
                StepState::Active
            } else {
                StepState::Pending
            };
        }
        changed
    }

    /// Mark every stage done (successful completion)
    pub fn complete_all(&mut self) {
        self.displayed = Some(STAGE_COUNT - 1);
        self.steps = [StepState::Done; STAGE_COUNT];
    }

    /// Currently displayed StageIndex, if any stage was reached
    pub fn displayed(&self) -> Option<usize> {
        self.displayed
    }

    pub fn displayed_stage(&self) -> Option<Stage> {
        self.displayed.map(|i| STAGES[i])
    }

    pub fn steps(&self) -> &[StepState; STAGE_COUNT] {
        &self.steps
    }

    pub fn all_done(&self) -> bool {
        self.steps.iter().all(|s| *s == StepState::Done)
    }
}
