//! Reading trajectory files.
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::{
    fs::File,
    io::BufReader,
    marker::PhantomData,
    path::{Path, PathBuf},
};
use trajset_core::{error::TrajsetError, record::TrajectoryRecord};

/// Shape of the content of a trajectory file.
///
/// The discriminants follow the variant order of
/// [`TrajectoryFile`](trajset_core::record::TrajectoryFile), which `bincode` writes as a `u32`
/// in front of the content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FileShape {
    Single,
    List,
    Map,
}

/// Lazily decodes the trajectories in a file.
///
/// Trajectories are decoded one at a time while iterating. Values of a key-to-trajectory
/// mapping are yielded in insertion order. The iterator stops after the first error.
pub struct TrajectoryIter<S, A> {
    reader: BufReader<File>,
    path: PathBuf,
    shape: FileShape,
    remaining: usize,
    phantom: PhantomData<(S, A)>,
}

impl<S, A> TrajectoryIter<S, A>
where
    S: DeserializeOwned,
    A: DeserializeOwned,
{
    fn format_error(&self, e: bincode::Error) -> TrajsetError {
        TrajsetError::Format {
            path: self.path.clone(),
            reason: e.to_string(),
        }
    }

    fn next_trajectory(&mut self) -> Result<TrajectoryRecord<S, A>> {
        let trajectory = match self.shape {
            FileShape::Single | FileShape::List => bincode::deserialize_from(&mut self.reader),
            FileShape::Map => bincode::deserialize_from::<_, (String, TrajectoryRecord<S, A>)>(
                &mut self.reader,
            )
            .map(|(_key, t)| t),
        };
        trajectory.map_err(|e| self.format_error(e).into())
    }

    /// Number of trajectories not yet decoded.
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl<S, A> Iterator for TrajectoryIter<S, A>
where
    S: DeserializeOwned,
    A: DeserializeOwned,
{
    type Item = Result<TrajectoryRecord<S, A>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let trajectory = self.next_trajectory();
        self.remaining = if trajectory.is_ok() { self.remaining - 1 } else { 0 };
        Some(trajectory)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

/// Deserializes all trajectories in the given file.
///
/// Supports files holding a single trajectory, a list of trajectories or a mapping with
/// trajectories as values, written by
/// [`TrajectoryFile::save`](trajset_core::record::TrajectoryFile::save) or a
/// [`TrajectoryWriter`](trajset_core::writer::TrajectoryWriter).
///
/// Fails with [`TrajsetError::FileNotFound`] if `path` is not a file and with
/// [`TrajsetError::Format`] if the content has none of the supported shapes.
pub fn deserialize_trajectory<S, A>(path: impl AsRef<Path>) -> Result<TrajectoryIter<S, A>>
where
    S: DeserializeOwned,
    A: DeserializeOwned,
{
    let path = path.as_ref();
    if !path.is_file() {
        return Err(TrajsetError::FileNotFound(path.to_path_buf()).into());
    }

    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    let mut reader = BufReader::new(file);
    let format_error = |reason: String| TrajsetError::Format {
        path: path.to_path_buf(),
        reason,
    };

    let tag: u32 =
        bincode::deserialize_from(&mut reader).map_err(|e| format_error(e.to_string()))?;
    let shape = match tag {
        0 => FileShape::Single,
        1 => FileShape::List,
        2 => FileShape::Map,
        _ => return Err(format_error(format!("unknown content tag {}", tag)).into()),
    };
    let remaining = match shape {
        FileShape::Single => 1,
        FileShape::List | FileShape::Map => {
            let len: u64 =
                bincode::deserialize_from(&mut reader).map_err(|e| format_error(e.to_string()))?;
            len as usize
        }
    };

    Ok(TrajectoryIter {
        reader,
        path: path.to_path_buf(),
        shape,
        remaining,
        phantom: PhantomData,
    })
}

/// Lists trajectory files with the given suffix in a directory.
///
/// Subdirectories are not searched. The list is sorted by path, so that loading is
/// reproducible.
pub fn list_trajectory_files(dir: impl AsRef<Path>, suffix: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut file_paths = vec![];

    for entry in std::fs::read_dir(dir).with_context(|| format!("Failed to read {:?}", dir))? {
        let path = entry?.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == suffix) {
            file_paths.push(path);
        }
    }

    file_paths.sort();
    Ok(file_paths)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;
    use tempdir::TempDir;
    use trajset_core::record::{StateRecord, TrajectoryFile};

    type Trajectory = TrajectoryRecord<Vec<f32>, usize>;

    fn trajectory(id: &str, n: usize) -> Trajectory {
        let mut t = Trajectory::new(id);
        for i in 0..n {
            t.push(StateRecord::new(vec![i as f32], i, 0.0, i + 1 == n));
        }
        t
    }

    fn ids(path: &Path) -> Result<Vec<String>> {
        deserialize_trajectory::<Vec<f32>, usize>(path)?
            .map(|t| t.map(|t| t.id))
            .collect()
    }

    #[test]
    fn test_deserialize_shapes() -> Result<()> {
        let dir = TempDir::new("deserialize")?;

        let single = dir.path().join("single.bincode");
        TrajectoryFile::Single(trajectory("s", 3)).save(&single)?;
        assert_eq!(ids(&single)?, vec!["s"]);

        let list = dir.path().join("list.bincode");
        TrajectoryFile::List(vec![trajectory("l0", 2), trajectory("l1", 1), trajectory("l2", 4)])
            .save(&list)?;
        assert_eq!(ids(&list)?, vec!["l0", "l1", "l2"]);

        let map = dir.path().join("map.bincode");
        TrajectoryFile::Map(vec![
            ("z".to_string(), trajectory("m0", 2)),
            ("a".to_string(), trajectory("m1", 2)),
        ])
        .save(&map)?;
        assert_eq!(ids(&map)?, vec!["m0", "m1"]);

        let loaded: Vec<Trajectory> = deserialize_trajectory(&single)?.collect::<Result<_>>()?;
        assert_eq!(loaded, vec![trajectory("s", 3)]);
        Ok(())
    }

    #[test]
    fn test_deserialize_is_lazy() -> Result<()> {
        let dir = TempDir::new("deserialize")?;
        let list = dir.path().join("list.bincode");
        TrajectoryFile::List(vec![trajectory("a", 2), trajectory("b", 2)]).save(&list)?;

        let mut it = deserialize_trajectory::<Vec<f32>, usize>(&list)?;
        assert_eq!(it.remaining(), 2);
        assert_eq!(it.next().unwrap()?.id, "a");
        assert_eq!(it.remaining(), 1);
        assert_eq!(it.next().unwrap()?.id, "b");
        assert!(it.next().is_none());
        assert!(it.next().is_none());
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let err = deserialize_trajectory::<Vec<f32>, usize>("/nonexistent/file.bincode")
            .err()
            .unwrap();
        assert!(matches!(
            err.downcast_ref::<TrajsetError>(),
            Some(TrajsetError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_unsupported_content() -> Result<()> {
        let dir = TempDir::new("deserialize")?;
        let path = dir.path().join("bad.bincode");
        let mut file = File::create(&path)?;
        file.write_all(&bincode::serialize(&7u32)?)?;
        drop(file);

        let err = deserialize_trajectory::<Vec<f32>, usize>(&path).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<TrajsetError>(),
            Some(TrajsetError::Format { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_truncated_content() -> Result<()> {
        let dir = TempDir::new("deserialize")?;
        let path = dir.path().join("truncated.bincode");
        let bytes = bincode::serialize(&TrajectoryFile::List(vec![
            trajectory("a", 2),
            trajectory("b", 2),
        ]))?;
        File::create(&path)?.write_all(&bytes[..bytes.len() - 4])?;

        let results: Vec<_> = deserialize_trajectory::<Vec<f32>, usize>(&path)?.collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1].as_ref().unwrap_err().downcast_ref::<TrajsetError>(),
            Some(TrajsetError::Format { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_list_trajectory_files() -> Result<()> {
        let dir = TempDir::new("list_files")?;
        for name in ["c.bincode", "a.bincode", "b.txt", "d.bincode"] {
            File::create(dir.path().join(name))?;
        }
        std::fs::create_dir(dir.path().join("sub.bincode"))?;

        let files = list_trajectory_files(dir.path(), "bincode")?;
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.bincode", "c.bincode", "d.bincode"]);
        Ok(())
    }
}
