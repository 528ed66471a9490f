#![warn(missing_docs)]
//! In-memory trajectory datasets for imitation learning.
//!
//! [`InMemoryDataset`] loads recorded episodes from trajectory files or from memory,
//! converts them into [`StructuredSpacesRecord`]s and keeps the results in memory.
//! Loading runs either in the calling thread or in parallel on [`DataLoadWorker`]s.
//!
//! # Loading pipeline
//!
//! 1. A [`DataSource`] is resolved into a list of [`TrajectorySource`]s.
//! 2. Trajectory files are read lazily with [`deserialize_trajectory`].
//! 3. Each trajectory is pre-processed and converted by a [`TrajectoryProcessor`].
//! 4. Each resulting episode is stored in the dataset.
//!
//! [`StructuredSpacesRecord`]: trajset_core::record::StructuredSpacesRecord
mod dataset;
mod deserialize;
mod processor;
mod source;
mod worker;
pub use dataset::{DatasetStats, InMemoryDataset, InMemoryDatasetConfig, Subset};
pub use deserialize::{deserialize_trajectory, list_trajectory_files, TrajectoryIter};
pub use processor::{
    convert_trajectory_with_env, DeadEndClippingTrajectoryProcessor, IdentityTrajectoryProcessor,
    Preprocessed, TrajectoryProcessor, TrajectoryProcessorConfig,
};
pub use source::{DataSource, TrajectorySource};
pub use worker::{DataLoadWorker, LoaderMessage, WorkerErrorReport};
