use super::{Preprocessed, TrajectoryProcessor};
use trajset_core::record::TrajectoryRecord;

/// Passes trajectories through unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityTrajectoryProcessor;

impl<S, A> TrajectoryProcessor<S, A> for IdentityTrajectoryProcessor {
    fn pre_process(&self, trajectory: TrajectoryRecord<S, A>) -> Preprocessed<S, A> {
        Preprocessed::Single(trajectory)
    }
}
