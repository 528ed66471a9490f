use super::TrajectoryRecord;
use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

/// Content of a trajectory file.
///
/// Files are encoded with `bincode`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum TrajectoryFile<S, A> {
    /// A single trajectory.
    Single(TrajectoryRecord<S, A>),

    /// A list of trajectories.
    List(Vec<TrajectoryRecord<S, A>>),

    /// Trajectories keyed by name, in insertion order.
    Map(Vec<(String, TrajectoryRecord<S, A>)>),
}

impl<S, A> TrajectoryFile<S, A> {
    /// Number of trajectories in the file.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::List(v) => v.len(),
            Self::Map(v) => v.len(),
        }
    }

    /// Returns `true` if the file holds no trajectory.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the trajectories, dropping the keys of a map.
    pub fn into_trajectories(self) -> Vec<TrajectoryRecord<S, A>> {
        match self {
            Self::Single(t) => vec![t],
            Self::List(v) => v,
            Self::Map(v) => v.into_iter().map(|(_, t)| t).collect(),
        }
    }
}

impl<S, A> TrajectoryFile<S, A>
where
    S: Serialize + DeserializeOwned,
    A: Serialize + DeserializeOwned,
{
    /// Writes the content into a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
        bincode::serialize_into(BufWriter::new(file), self)
            .with_context(|| format!("Failed to write trajectories into {:?}", path))?;
        Ok(())
    }

    /// Reads the content of a file.
    ///
    /// Errors are not classified here, see `trajset_dataset::deserialize_trajectory` for
    /// loading with file and format checks.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        let content = bincode::deserialize_from(BufReader::new(file))
            .with_context(|| format!("Failed to read trajectories from {:?}", path))?;
        Ok(content)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::record::{StateRecord, StructuredSpacesRecord};
    use tempdir::TempDir;
    use test_log::test;

    fn trajectory(id: &str, n: usize) -> TrajectoryRecord<Vec<f32>, usize> {
        let mut t = TrajectoryRecord::new(id);
        for i in 0..n {
            t.push(StateRecord::new(vec![i as f32], i, 1.0, i + 1 == n));
        }
        t.push(StructuredSpacesRecord::default());
        t
    }

    #[test]
    fn test_save_and_load_map() -> Result<()> {
        let dir = TempDir::new("trajectory_file")?;
        let path = dir.path().join("map.bincode");
        let content = TrajectoryFile::Map(vec![
            ("b".to_string(), trajectory("b", 2)),
            ("a".to_string(), trajectory("a", 3)),
        ]);
        content.save(&path)?;

        let loaded = TrajectoryFile::<Vec<f32>, usize>::load(&path)?;
        assert_eq!(loaded, content);

        let ids: Vec<_> = loaded.into_trajectories().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["b", "a"]);
        Ok(())
    }
}
