use super::{DatasetStats, InMemoryDatasetConfig, Subset};
use crate::{
    deserialize_trajectory, DataLoadWorker, DataSource, LoaderMessage, TrajectoryProcessor,
    TrajectoryProcessorConfig, TrajectorySource,
};
use anyhow::{Context, Result};
use crossbeam_channel::bounded;
use log::{debug, info, warn};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::de::DeserializeOwned;
use std::{
    collections::BTreeMap,
    ops::Range,
    sync::{Arc, Mutex},
    thread,
};
use trajset_core::{
    error::TrajsetError,
    record::{ActionType, ObservationType, StepKey, StructuredSpacesRecord, TrajectoryRecord},
    ConversionEnv,
};

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Trajectory dataset kept in memory.
///
/// Step records of all loaded trajectories are stored in a single flat list. Each stored
/// episode is referenced by a range of indices into that list, so that the dataset can be
/// split without separating the steps of an episode.
///
/// # Loading
///
/// With `n_workers == 1` in [`InMemoryDatasetConfig`], trajectories are loaded and converted
/// in the calling thread, using the conversion environment built in [`InMemoryDataset::build`].
/// Otherwise, the sources are distributed round-robin over [`DataLoadWorker`]s, each running in
/// its own thread with its own conversion environment:
///
/// ```mermaid
/// graph LR
///     S[Sources]-->|chunk 0|W0[DataLoadWorker 0]
///     S-->|chunk 1|W1[DataLoadWorker 1]
///     W0-->|LoaderMessage|C[Bounded channel]
///     W1-->|LoaderMessage|C
///     C-->D[InMemoryDataset]
/// ```
///
/// The dataset stores trajectories as they arrive, so that there is no ordering between
/// workers. A failing worker stops the whole load. In both cases the load is all-or-nothing:
/// the dataset is left as it was before the call if an error occurs.
pub struct InMemoryDataset<E, P = TrajectoryProcessorConfig>
where
    E: ConversionEnv,
{
    config: InMemoryDatasetConfig,

    /// Used to build conversion environments in workers.
    env_config: Option<E::Config>,

    /// Used for sequential loading and [`InMemoryDataset::append`].
    conversion_env: Option<E>,

    processor: P,

    step_records: Vec<StructuredSpacesRecord>,

    trajectory_references: Vec<Range<usize>>,
}

impl<E: ConversionEnv> InMemoryDataset<E> {
    /// Builds a dataset with the trajectory processor given in the configuration.
    ///
    /// `env_config` is required to load trajectories of raw state records.
    pub fn build(config: InMemoryDatasetConfig, env_config: Option<E::Config>) -> Result<Self> {
        let processor = config.trajectory_processor.clone();
        Self::build_with_processor(config, env_config, processor)
    }
}

impl<E, P> InMemoryDataset<E, P>
where
    E: ConversionEnv,
    P: TrajectoryProcessor<E::State, E::Action>,
{
    /// Builds a dataset with a custom trajectory processor.
    ///
    /// `config.trajectory_processor` is ignored.
    pub fn build_with_processor(
        config: InMemoryDatasetConfig,
        env_config: Option<E::Config>,
        processor: P,
    ) -> Result<Self> {
        config.validate()?;
        let conversion_env = match &env_config {
            Some(env_config) => {
                Some(E::build(env_config).context("Failed to build conversion env")?)
            }
            None => None,
        };

        Ok(Self {
            config,
            env_config,
            conversion_env,
            processor,
            step_records: vec![],
            trajectory_references: vec![],
        })
    }

    /// Processes a trajectory and stores the result.
    ///
    /// Each trajectory resulting from the processing is stored as an episode.
    /// Returns the number of stored episodes.
    pub fn append(&mut self, trajectory: TrajectoryRecord<E::State, E::Action>) -> Result<usize> {
        let converted = self
            .processor
            .process(trajectory, self.conversion_env.as_mut())?;
        let n = converted.len();
        for step_records in converted {
            self.store_loaded_trajectory(step_records);
        }
        Ok(n)
    }

    fn store_loaded_trajectory(&mut self, step_records: Vec<StructuredSpacesRecord>) {
        let start = self.step_records.len();
        self.step_records.extend(step_records);
        self.trajectory_references.push(start..self.step_records.len());
    }

    fn rollback(&mut self, n_records: usize, n_episodes: usize) {
        self.step_records.truncate(n_records);
        self.trajectory_references.truncate(n_episodes);
    }

    /// Number of step records.
    pub fn len(&self) -> usize {
        self.step_records.len()
    }

    /// Number of step records, same as [`InMemoryDataset::len`].
    pub fn size(&self) -> usize {
        self.len()
    }

    /// Returns `true` if the dataset has no step records.
    pub fn is_empty(&self) -> bool {
        self.step_records.is_empty()
    }

    /// Number of stored episodes.
    pub fn n_episodes(&self) -> usize {
        self.trajectory_references.len()
    }

    /// Ranges of the step records of the episodes, in load order.
    pub fn episode_references(&self) -> &[Range<usize>] {
        &self.trajectory_references
    }

    /// All step records.
    pub fn records(&self) -> &[StructuredSpacesRecord] {
        &self.step_records
    }

    /// Returns the step record at `index`.
    pub fn record(&self, index: usize) -> Option<&StructuredSpacesRecord> {
        self.step_records.get(index)
    }

    /// Returns the observations and actions of the step record at `index`, keyed by sub-step.
    pub fn get(
        &self,
        index: usize,
    ) -> Result<(
        BTreeMap<StepKey, ObservationType>,
        BTreeMap<StepKey, ActionType>,
    )> {
        let record = self.record(index).ok_or(TrajsetError::IndexOutOfRange {
            index,
            len: self.len(),
        })?;
        Ok((record.observations_dict(), record.actions_dict()))
    }

    /// Statistics of the stored episodes.
    pub fn stats(&self) -> DatasetStats {
        DatasetStats::from_references(&self.trajectory_references)
    }

    /// Splits the indices of the step records into subsets of the given lengths.
    ///
    /// Episodes are shuffled with a generator seeded by `seed` and assigned to the subsets
    /// as a whole. Each subset but the last takes episodes while they fit into its length;
    /// the last subset takes the remaining episodes. The resulting lengths can therefore
    /// differ from `lengths`.
    pub fn split_indices(&self, lengths: &[usize], seed: u64) -> Result<Vec<Vec<usize>>> {
        let (last, heads) = lengths.split_last().ok_or(TrajsetError::EmptySplitLengths)?;
        let total = lengths.iter().try_fold(0usize, |acc, &l| acc.checked_add(l));
        if total != Some(self.len()) {
            return Err(TrajsetError::SplitLengthMismatch {
                expected: self.len(),
                // Saturated if the lengths overflow
                actual: total.unwrap_or(usize::MAX),
            }
            .into());
        }
        debug!("Split {} episodes, last subset length {}", self.n_episodes(), last);

        let mut episodes: Vec<usize> = (0..self.n_episodes()).collect();
        episodes.shuffle(&mut StdRng::seed_from_u64(seed));
        let mut episodes = episodes.into_iter().peekable();

        let mut subsets = Vec::with_capacity(lengths.len());
        for &length in heads {
            let mut indices = vec![];
            while let Some(&ix) = episodes.peek() {
                let range = &self.trajectory_references[ix];
                if indices.len() + range.len() > length {
                    break;
                }
                indices.extend(range.clone());
                episodes.next();
            }
            subsets.push(indices);
        }
        subsets.push(
            episodes
                .flat_map(|ix| self.trajectory_references[ix].clone())
                .collect(),
        );

        Ok(subsets)
    }

    /// Randomly splits the dataset into subsets keeping episodes together.
    ///
    /// See [`InMemoryDataset::split_indices`].
    pub fn random_split(&self, lengths: &[usize], seed: u64) -> Result<Vec<Subset>> {
        Ok(self
            .split_indices(lengths, seed)?
            .into_iter()
            .map(|indices| Subset::new(&self.step_records, indices))
            .collect())
    }
}

impl<E, P> InMemoryDataset<E, P>
where
    E: ConversionEnv + 'static,
    E::State: DeserializeOwned + Send + 'static,
    E::Action: DeserializeOwned + Send + 'static,
    E::Config: Send + 'static,
    P: TrajectoryProcessor<E::State, E::Action> + Clone + Send + 'static,
{
    /// Loads trajectories from a file, a directory or a list of sources.
    ///
    /// Returns the number of stored episodes. On failure, no data of this call is kept.
    pub fn load(&mut self, source: impl Into<DataSource<E::State, E::Action>>) -> Result<usize> {
        let source = source.into();
        info!("Start loading trajectories from {}", source);
        let sources = source.into_sources(&self.config.file_suffix)?;

        let (n_records, n_episodes) = (self.step_records.len(), self.trajectory_references.len());
        let result = if self.config.n_workers > 1 {
            self.load_parallel(sources)
        } else {
            self.load_sequential(sources)
        };

        match result {
            Ok(n) => {
                info!("Loaded {} episodes", n);
                info!("Dataset: {}", self.stats());
                Ok(n)
            }
            Err(e) => {
                self.rollback(n_records, n_episodes);
                Err(e)
            }
        }
    }

    fn load_sequential(
        &mut self,
        sources: Vec<TrajectorySource<E::State, E::Action>>,
    ) -> Result<usize> {
        let mut n = 0;
        for source in sources {
            match source {
                TrajectorySource::File(path) => {
                    for trajectory in deserialize_trajectory(&path)? {
                        n += self
                            .append(trajectory?)
                            .with_context(|| format!("Failed to load {:?}", path))?;
                    }
                }
                TrajectorySource::Record(trajectory) => n += self.append(trajectory)?,
            }
        }
        Ok(n)
    }

    fn load_parallel(
        &mut self,
        sources: Vec<TrajectorySource<E::State, E::Action>>,
    ) -> Result<usize> {
        let chunks = assign_round_robin(sources, self.config.n_workers);
        let (sender, receiver) = bounded(self.config.channel_capacity);
        let stop = Arc::new(Mutex::new(false));
        let mut handles = vec![];

        for (id, chunk) in chunks.into_iter().enumerate() {
            if chunk.is_empty() {
                continue;
            }
            let worker = DataLoadWorker::<E, P>::build(
                id,
                self.env_config.clone(),
                self.processor.clone(),
                chunk,
                stop.clone(),
            );
            let sender = sender.clone();
            let spawned = thread::Builder::new()
                .name(format!("data-load-worker-{}", id))
                .spawn(move || worker.run(sender));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    Self::stop_workers(&stop);
                    return Err(e).context("Failed to spawn data load worker");
                }
            }
        }

        // Only workers hold senders from here on
        drop(sender);

        let n_started = handles.len();
        let mut n_done = 0;
        let mut n_episodes = 0;
        info!("Started {} data load workers", n_started);

        while n_done < n_started {
            match receiver.recv() {
                Ok(LoaderMessage::Trajectory(step_records)) => {
                    self.store_loaded_trajectory(step_records);
                    n_episodes += 1;
                }
                Ok(LoaderMessage::Done(id)) => {
                    debug!("Data load worker {} finished", id);
                    n_done += 1;
                }
                Ok(LoaderMessage::Error(report)) => {
                    warn!("Data load worker {} failed, stops loading", report.worker_id);
                    Self::stop_workers(&stop);
                    return Err(report.into_error());
                }
                Err(_) => {
                    Self::stop_workers(&stop);
                    return Err(TrajsetError::WorkerDisconnected {
                        n_done,
                        n_workers: n_started,
                    }
                    .into());
                }
            }
        }

        for handle in handles {
            if handle.join().is_err() {
                warn!("Failed to join a data load worker");
            }
        }

        Ok(n_episodes)
    }

    fn stop_workers(stop: &Arc<Mutex<bool>>) {
        if let Ok(mut stop) = stop.lock() {
            *stop = true;
        }
    }
}

/// Assigns item `i` to worker `i % n_workers`, keeping the order of items within a worker.
fn assign_round_robin<T>(items: Vec<T>, n_workers: usize) -> Vec<Vec<T>> {
    let mut chunks: Vec<Vec<T>> = (0..n_workers).map(|_| vec![]).collect();
    for (i, item) in items.into_iter().enumerate() {
        chunks[i % n_workers].push(item);
    }
    chunks
}
