use super::StepRecord;
use serde::{Deserialize, Serialize};

/// Step records of one episode.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrajectoryRecord<S, A> {
    /// Id of the episode.
    pub id: String,

    /// Step records in the order they were recorded.
    pub step_records: Vec<StepRecord<S, A>>,
}

impl<S, A> TrajectoryRecord<S, A> {
    /// Creates an empty trajectory.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            step_records: vec![],
        }
    }

    /// Creates a trajectory with the given step records.
    pub fn with_records(id: impl Into<String>, step_records: Vec<StepRecord<S, A>>) -> Self {
        Self {
            id: id.into(),
            step_records,
        }
    }

    /// Appends a step record.
    pub fn push(&mut self, step_record: impl Into<StepRecord<S, A>>) {
        self.step_records.push(step_record.into());
    }

    /// Number of step records.
    pub fn len(&self) -> usize {
        self.step_records.len()
    }

    /// Returns `true` if there is no step record.
    pub fn is_empty(&self) -> bool {
        self.step_records.is_empty()
    }

    /// The last step record.
    pub fn last(&self) -> Option<&StepRecord<S, A>> {
        self.step_records.last()
    }
}
