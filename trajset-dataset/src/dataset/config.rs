//! Configuration of [`InMemoryDataset`](super::InMemoryDataset).
use crate::TrajectoryProcessorConfig;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use trajset_core::{error::TrajsetError, record::DEFAULT_TRAJECTORY_FILE_SUFFIX};

/// Configuration of [`InMemoryDataset`](super::InMemoryDataset).
///
/// # Examples
///
/// ```rust
/// use trajset_dataset::{InMemoryDatasetConfig, TrajectoryProcessorConfig};
///
/// let config = InMemoryDatasetConfig::default()
///     .n_workers(4)
///     .trajectory_processor(TrajectoryProcessorConfig::DeadEndClipping { clip_k: 2 });
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct InMemoryDatasetConfig {
    /// Number of workers loading data. With a single worker, data is loaded in the
    /// calling thread.
    pub n_workers: usize,

    /// Processor applied to every loaded trajectory.
    pub trajectory_processor: TrajectoryProcessorConfig,

    /// Suffix of trajectory files when loading from a directory.
    pub file_suffix: String,

    /// Capacity of the channel between workers and the coordinator, in trajectories.
    pub channel_capacity: usize,
}

impl Default for InMemoryDatasetConfig {
    fn default() -> Self {
        Self {
            n_workers: 1,
            trajectory_processor: TrajectoryProcessorConfig::Identity,
            file_suffix: DEFAULT_TRAJECTORY_FILE_SUFFIX.to_string(),
            channel_capacity: 1000,
        }
    }
}

impl InMemoryDatasetConfig {
    /// Sets the number of workers.
    pub fn n_workers(mut self, n_workers: usize) -> Self {
        self.n_workers = n_workers;
        self
    }

    /// Sets the trajectory processor.
    pub fn trajectory_processor(mut self, trajectory_processor: TrajectoryProcessorConfig) -> Self {
        self.trajectory_processor = trajectory_processor;
        self
    }

    /// Sets the suffix of trajectory files.
    pub fn file_suffix(mut self, file_suffix: impl Into<String>) -> Self {
        self.file_suffix = file_suffix.into();
        self
    }

    /// Sets the capacity of the channel used in parallel loading.
    pub fn channel_capacity(mut self, channel_capacity: usize) -> Self {
        self.channel_capacity = channel_capacity;
        self
    }

    /// Checks the values.
    pub fn validate(&self) -> Result<()> {
        if self.n_workers == 0 {
            return Err(TrajsetError::InvalidConfig("n_workers must be at least 1".into()).into());
        }
        if self.channel_capacity == 0 {
            return Err(
                TrajsetError::InvalidConfig("channel_capacity must be at least 1".into()).into(),
            );
        }
        Ok(())
    }

    /// Constructs [`InMemoryDatasetConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`InMemoryDatasetConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_dataset_config() -> Result<()> {
        let config = InMemoryDatasetConfig::default()
            .n_workers(3)
            .file_suffix("traj")
            .trajectory_processor(TrajectoryProcessorConfig::DeadEndClipping { clip_k: 2 });

        let dir = TempDir::new("dataset_config")?;
        let path = dir.path().join("dataset_config.yaml");
        config.save(&path)?;
        let config_ = InMemoryDatasetConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_processor_from_yaml() -> Result<()> {
        let yaml = "n_workers: 2\n\
                    trajectory_processor:\n  type: DeadEndClipping\n  clip_k: 5\n\
                    file_suffix: bincode\n\
                    channel_capacity: 10\n";
        let config: InMemoryDatasetConfig = serde_yaml::from_str(yaml)?;
        assert_eq!(
            config.trajectory_processor,
            TrajectoryProcessorConfig::DeadEndClipping { clip_k: 5 }
        );
        config.validate()?;
        Ok(())
    }

    #[test]
    fn test_validate() {
        assert!(InMemoryDatasetConfig::default().validate().is_ok());
        assert!(InMemoryDatasetConfig::default().n_workers(0).validate().is_err());
        assert!(InMemoryDatasetConfig::default().channel_capacity(0).validate().is_err());
    }
}
