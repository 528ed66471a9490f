//! Dataset of converted trajectories kept in memory.
mod base;
mod config;
mod stats;
mod subset;
pub use base::InMemoryDataset;
pub use config::InMemoryDatasetConfig;
pub use stats::DatasetStats;
pub use subset::Subset;
