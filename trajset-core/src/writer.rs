//! Writers for recorded trajectories.
//!
//! Writers are handed to whatever produces episodes (a rollout runner, a recording wrapper,
//! a test) explicitly; there is no global registry of writers.
use crate::record::{TrajectoryFile, TrajectoryRecord, DEFAULT_TRAJECTORY_FILE_SUFFIX};
use anyhow::Result;
use log::debug;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    marker::PhantomData,
    path::{Path, PathBuf},
};

/// Writes trajectories to an output destination.
pub trait TrajectoryWriter<S, A> {
    /// Writes a trajectory.
    fn write(&mut self, trajectory: &TrajectoryRecord<S, A>) -> Result<()>;

    /// Flushes buffered trajectories, if any.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes every trajectory into its own file `<id>.<suffix>` in a directory.
pub struct FileTrajectoryWriter<S, A> {
    dir: PathBuf,
    suffix: String,
    n_written: usize,
    phantom: PhantomData<(S, A)>,
}

impl<S, A> FileTrajectoryWriter<S, A> {
    /// Creates a writer, creating the directory if it does not exist.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            suffix: DEFAULT_TRAJECTORY_FILE_SUFFIX.to_string(),
            n_written: 0,
            phantom: PhantomData,
        })
    }

    /// Sets the file suffix.
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Number of trajectories written so far.
    pub fn n_written(&self) -> usize {
        self.n_written
    }

    /// Path of the file for the given trajectory.
    pub fn path_of(&self, trajectory: &TrajectoryRecord<S, A>) -> PathBuf {
        self.dir.join(format!("{}.{}", trajectory.id, self.suffix))
    }
}

impl<S, A> TrajectoryWriter<S, A> for FileTrajectoryWriter<S, A>
where
    S: Serialize + DeserializeOwned + Clone,
    A: Serialize + DeserializeOwned + Clone,
{
    fn write(&mut self, trajectory: &TrajectoryRecord<S, A>) -> Result<()> {
        let path = self.path_of(trajectory);
        TrajectoryFile::Single(trajectory.clone()).save(&path)?;
        self.n_written += 1;
        debug!("Wrote trajectory {} to {:?}", trajectory.id, path);
        Ok(())
    }
}

/// Keeps written trajectories in memory.
pub struct InMemoryTrajectoryWriter<S, A> {
    buf: Vec<TrajectoryRecord<S, A>>,
}

impl<S, A> Default for InMemoryTrajectoryWriter<S, A> {
    fn default() -> Self {
        Self { buf: Vec::new() }
    }
}

impl<S, A> InMemoryTrajectoryWriter<S, A> {
    /// Constructs the writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an iterator over the trajectories.
    pub fn iter(&self) -> std::slice::Iter<TrajectoryRecord<S, A>> {
        self.buf.iter()
    }

    /// Number of trajectories.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if nothing was written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Returns the trajectories as the content of a trajectory file.
    pub fn into_file(self) -> TrajectoryFile<S, A> {
        TrajectoryFile::List(self.buf)
    }
}

impl<S: Clone, A: Clone> TrajectoryWriter<S, A> for InMemoryTrajectoryWriter<S, A> {
    fn write(&mut self, trajectory: &TrajectoryRecord<S, A>) -> Result<()> {
        self.buf.push(trajectory.clone());
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::record::StateRecord;
    use tempdir::TempDir;
    use test_log::test;

    fn trajectory(id: &str) -> TrajectoryRecord<Vec<f32>, usize> {
        let mut t = TrajectoryRecord::new(id);
        t.push(StateRecord::new(vec![0.0, 1.0], 1, 0.0, false));
        t.push(StateRecord::new(vec![1.0, 2.0], 0, 1.0, true));
        t
    }

    #[test]
    fn test_file_writer() -> Result<()> {
        let dir = TempDir::new("file_writer")?;
        let mut writer = FileTrajectoryWriter::new(dir.path().join("out"))?.suffix("traj");
        writer.write(&trajectory("ep_0"))?;
        writer.write(&trajectory("ep_1"))?;
        writer.flush()?;
        assert_eq!(writer.n_written(), 2);

        let path = dir.path().join("out").join("ep_1.traj");
        assert!(path.is_file());
        let loaded = TrajectoryFile::<Vec<f32>, usize>::load(&path)?;
        assert_eq!(loaded, TrajectoryFile::Single(trajectory("ep_1")));
        Ok(())
    }

    #[test]
    fn test_in_memory_writer() -> Result<()> {
        let mut writer = InMemoryTrajectoryWriter::new();
        assert!(writer.is_empty());
        writer.write(&trajectory("a"))?;
        writer.write(&trajectory("b"))?;
        assert_eq!(writer.len(), 2);
        assert_eq!(writer.iter().next().unwrap().id, "a");

        let file = writer.into_file();
        assert_eq!(file.len(), 2);

        let writer = InMemoryTrajectoryWriter::<Vec<f32>, usize>::default();
        assert!(writer.into_file().is_empty());
        Ok(())
    }
}
