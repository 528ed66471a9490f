use super::{Preprocessed, TrajectoryProcessor};
use log::debug;
use trajset_core::record::{TrajectoryRecord, TIME_LIMIT_TRUNCATED_KEY};

/// Clips the last `clip_k` steps of trajectories that end in a dead end.
///
/// When an episode terminates, the last few steps often only reflect that a terminal state is
/// unavoidable rather than being meaningful decisions. Cloning them would bias the policy
/// towards dead ends. This processor
///
/// 1. drops an incomplete last step record,
/// 2. clips the last `clip_k` steps if the trajectory has more than `2 * clip_k` steps and
///    is done, unless the episode was truncated by a time limit,
/// 3. discards the trajectory if it has less than `2 * clip_k` steps.
///
/// Trajectories with exactly `2 * clip_k` steps are left as they are.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeadEndClippingTrajectoryProcessor {
    /// Number of steps to clip.
    pub clip_k: usize,
}

impl DeadEndClippingTrajectoryProcessor {
    /// Creates a processor clipping `clip_k` steps.
    pub fn new(clip_k: usize) -> Self {
        Self { clip_k }
    }
}

impl<S, A> TrajectoryProcessor<S, A> for DeadEndClippingTrajectoryProcessor {
    fn pre_process(&self, mut trajectory: TrajectoryRecord<S, A>) -> Preprocessed<S, A> {
        if trajectory.last().map_or(false, |r| !r.is_complete()) {
            trajectory.step_records.pop();
        }

        let (is_done, time_limited) = match trajectory.last() {
            Some(last) => (
                last.is_done(),
                last.info()
                    .map_or(false, |info| info.contains_key(TIME_LIMIT_TRUNCATED_KEY)),
            ),
            None => return Preprocessed::Single(trajectory),
        };

        let len = trajectory.len();
        let min_len = self.clip_k.saturating_mul(2);
        if len > min_len && is_done && !time_limited {
            trajectory.step_records.truncate(len - self.clip_k);
        } else if len < min_len {
            debug!(
                "Discarded trajectory {} with {} steps, too short for clipping {} steps",
                trajectory.id, len, self.clip_k
            );
            trajectory.step_records.clear();
        }

        Preprocessed::Single(trajectory)
    }
}
