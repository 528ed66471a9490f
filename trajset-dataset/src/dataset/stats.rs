use std::{fmt, ops::Range};

/// Summary of the episodes stored in an [`InMemoryDataset`](super::InMemoryDataset).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DatasetStats {
    /// Number of episodes.
    pub n_episodes: usize,

    /// Number of step records.
    pub n_steps: usize,

    /// Length of the shortest episode.
    pub min_episode_length: usize,

    /// Length of the longest episode.
    pub max_episode_length: usize,

    /// Mean episode length, `0.0` without episodes.
    pub mean_episode_length: f32,
}

impl DatasetStats {
    pub(super) fn from_references(references: &[Range<usize>]) -> Self {
        let lengths = references.iter().map(|r| r.len());
        let n_steps: usize = lengths.clone().sum();
        let n_episodes = references.len();

        Self {
            n_episodes,
            n_steps,
            min_episode_length: lengths.clone().min().unwrap_or(0),
            max_episode_length: lengths.max().unwrap_or(0),
            mean_episode_length: match n_episodes {
                0 => 0.0,
                n => n_steps as f32 / n as f32,
            },
        }
    }
}

impl fmt::Display for DatasetStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} episodes, {} steps, episode length min/mean/max = {}/{:.1}/{}",
            self.n_episodes,
            self.n_steps,
            self.min_episode_length,
            self.mean_episode_length,
            self.max_episode_length
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_references() {
        let stats = DatasetStats::from_references(&[0..3, 3..3, 3..8]);
        assert_eq!(stats.n_episodes, 3);
        assert_eq!(stats.n_steps, 8);
        assert_eq!(stats.min_episode_length, 0);
        assert_eq!(stats.max_episode_length, 5);
        assert!((stats.mean_episode_length - 8.0 / 3.0).abs() < 1e-6);

        assert_eq!(DatasetStats::from_references(&[]), DatasetStats::default());
    }
}
