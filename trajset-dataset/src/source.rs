//! Sources of trajectory data.
use crate::list_trajectory_files;
use anyhow::Result;
use std::{
    fmt,
    path::{Path, PathBuf},
};
use trajset_core::{error::TrajsetError, record::TrajectoryRecord};

/// A single item to be loaded, a trajectory file or an already loaded trajectory.
#[derive(Clone, Debug)]
pub enum TrajectorySource<S, A> {
    /// File holding one or more trajectories.
    File(PathBuf),

    /// A trajectory in memory.
    Record(TrajectoryRecord<S, A>),
}

impl<S, A> From<PathBuf> for TrajectorySource<S, A> {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

impl<S, A> From<TrajectoryRecord<S, A>> for TrajectorySource<S, A> {
    fn from(trajectory: TrajectoryRecord<S, A>) -> Self {
        Self::Record(trajectory)
    }
}

/// Data given to [`InMemoryDataset::load`](crate::InMemoryDataset::load).
#[derive(Clone, Debug)]
pub enum DataSource<S, A> {
    /// A trajectory file or a directory of trajectory files.
    Path(PathBuf),

    /// An explicit list of files and trajectories.
    List(Vec<TrajectorySource<S, A>>),
}

impl<S, A> DataSource<S, A> {
    /// Resolves the source into a list of items to be loaded.
    ///
    /// A directory is expanded into the files with the given suffix, sorted by name.
    pub fn into_sources(self, suffix: &str) -> Result<Vec<TrajectorySource<S, A>>> {
        match self {
            Self::List(sources) => Ok(sources),
            Self::Path(path) if path.is_file() => Ok(vec![TrajectorySource::File(path)]),
            Self::Path(path) if path.is_dir() => Ok(list_trajectory_files(&path, suffix)?
                .into_iter()
                .map(TrajectorySource::File)
                .collect()),
            Self::Path(path) => Err(TrajsetError::UnsupportedSource(path).into()),
        }
    }
}

impl<S, A> fmt::Display for DataSource<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{:?}", path),
            Self::List(sources) => write!(f, "list of {} sources", sources.len()),
        }
    }
}

impl<S, A> From<PathBuf> for DataSource<S, A> {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl<S, A> From<&Path> for DataSource<S, A> {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl<S, A> From<&str> for DataSource<S, A> {
    fn from(path: &str) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl<S, A> From<Vec<PathBuf>> for DataSource<S, A> {
    fn from(paths: Vec<PathBuf>) -> Self {
        Self::List(paths.into_iter().map(TrajectorySource::File).collect())
    }
}

impl<S, A> From<Vec<TrajectoryRecord<S, A>>> for DataSource<S, A> {
    fn from(trajectories: Vec<TrajectoryRecord<S, A>>) -> Self {
        Self::List(trajectories.into_iter().map(TrajectorySource::Record).collect())
    }
}

impl<S, A> From<Vec<TrajectorySource<S, A>>> for DataSource<S, A> {
    fn from(sources: Vec<TrajectorySource<S, A>>) -> Self {
        Self::List(sources)
    }
}
