//! Types for recorded episodes.
//!
//! An episode is stored as a [`TrajectoryRecord`], an ordered sequence of [`StepRecord`]s.
//! A step record is either
//!
//! * a [`StateRecord`] holding the raw environment state and action, as recorded during a
//!   rollout, or
//! * a [`StructuredSpacesRecord`] holding the observations and actions of all sub-steps, as
//!   obtained after conversion with a [`ConversionEnv`](crate::ConversionEnv).
//!
//! Files on disk contain a [`TrajectoryFile`]: a single trajectory, a list of trajectories or
//! a key-to-trajectory mapping.
use ndarray::ArrayD;
use std::collections::BTreeMap;

mod file;
mod step;
mod trajectory;

pub use file::TrajectoryFile;
pub use step::{ActorId, SpacesRecord, StateRecord, StepRecord, StructuredSpacesRecord};
pub use trajectory::TrajectoryRecord;

/// Key of a sub-step in a structured environment step.
pub type StepKey = String;

/// Observation of a single sub-step, a mapping from observation names to arrays.
pub type ObservationType = BTreeMap<String, ArrayD<f32>>;

/// Action of a single sub-step, a mapping from action names to arrays.
pub type ActionType = BTreeMap<String, ArrayD<f32>>;

/// Auxiliary information of a step.
pub type StepInfo = BTreeMap<String, String>;

/// Key in [`StepInfo`] marking an episode end caused by a time limit.
pub const TIME_LIMIT_TRUNCATED_KEY: &str = "TimeLimit.truncated";

/// Default suffix of trajectory files.
pub const DEFAULT_TRAJECTORY_FILE_SUFFIX: &str = "bincode";
