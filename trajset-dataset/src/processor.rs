//! Processing of individual trajectories before they are stored in a dataset.
mod base;
mod config;
mod dead_end_clipping;
mod identity;
pub use base::{convert_trajectory_with_env, Preprocessed, TrajectoryProcessor};
pub use config::TrajectoryProcessorConfig;
pub use dead_end_clipping::DeadEndClippingTrajectoryProcessor;
pub use identity::IdentityTrajectoryProcessor;
