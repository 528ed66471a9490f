//! Selection of a trajectory processor by configuration.
use super::{
    DeadEndClippingTrajectoryProcessor, IdentityTrajectoryProcessor, Preprocessed,
    TrajectoryProcessor,
};
use serde::{Deserialize, Serialize};
use trajset_core::record::TrajectoryRecord;

/// Trajectory processors available in configuration files.
///
/// ```yaml
/// trajectory_processor:
///   type: DeadEndClipping
///   clip_k: 3
/// ```
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum TrajectoryProcessorConfig {
    /// [`IdentityTrajectoryProcessor`].
    #[default]
    Identity,

    /// [`DeadEndClippingTrajectoryProcessor`].
    DeadEndClipping {
        /// Number of steps to clip.
        clip_k: usize,
    },
}

impl<S, A> TrajectoryProcessor<S, A> for TrajectoryProcessorConfig {
    fn pre_process(&self, trajectory: TrajectoryRecord<S, A>) -> Preprocessed<S, A> {
        match self {
            Self::Identity => IdentityTrajectoryProcessor.pre_process(trajectory),
            Self::DeadEndClipping { clip_k } => {
                DeadEndClippingTrajectoryProcessor::new(*clip_k).pre_process(trajectory)
            }
        }
    }
}
