use super::{LoaderMessage, WorkerErrorReport};
use crate::{deserialize_trajectory, TrajectoryProcessor, TrajectorySource};
use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use log::{debug, info};
use serde::de::DeserializeOwned;
use std::{
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Mutex},
};
use trajset_core::{record::TrajectoryRecord, ConversionEnv};

/// Loads and converts a chunk of trajectory sources, sending the results to the coordinator.
///
/// The worker builds its own [`ConversionEnv`] once and then processes the assigned sources
/// in order. It sends one [`LoaderMessage::Trajectory`] per converted trajectory, followed by
/// [`LoaderMessage::Done`]. Errors and panics are reported with [`LoaderMessage::Error`] and
/// terminate the worker.
pub struct DataLoadWorker<E, P>
where
    E: ConversionEnv,
{
    /// Id of the worker.
    id: usize,

    /// Configuration of the conversion environment, if conversion is required.
    env_config: Option<E::Config>,

    /// Trajectory processor.
    processor: P,

    /// Sources assigned to this worker.
    sources: Vec<TrajectorySource<E::State, E::Action>>,

    /// The worker stops after the current trajectory if this flag is set to `true`.
    stop: Arc<Mutex<bool>>,
}

impl<E, P> DataLoadWorker<E, P>
where
    E: ConversionEnv,
    E::State: DeserializeOwned,
    E::Action: DeserializeOwned,
    P: TrajectoryProcessor<E::State, E::Action>,
{
    /// Builds a worker.
    pub fn build(
        id: usize,
        env_config: Option<E::Config>,
        processor: P,
        sources: Vec<TrajectorySource<E::State, E::Action>>,
        stop: Arc<Mutex<bool>>,
    ) -> Self {
        Self {
            id,
            env_config,
            processor,
            sources,
            stop,
        }
    }

    /// Runs the worker until all sources are processed, a failure occurs or it is stopped.
    pub fn run(self, sender: Sender<LoaderMessage>) {
        let id = self.id;
        info!("Starts data load worker {} with {} sources", id, self.sources.len());

        let msg = match panic::catch_unwind(AssertUnwindSafe(|| self.load(&sender))) {
            Ok(Ok(n_trajectories)) => {
                info!("Data load worker {} loaded {} trajectories", id, n_trajectories);
                LoaderMessage::Done(id)
            }
            Ok(Err(e)) => WorkerErrorReport::new(id, e).into(),
            Err(payload) => WorkerErrorReport::from_panic(id, payload).into(),
        };

        // The coordinator is gone if it stopped loading
        if sender.send(msg).is_err() {
            debug!("Data load worker {} stopped, coordinator disconnected", id);
        }
    }

    fn load(mut self, sender: &Sender<LoaderMessage>) -> Result<usize> {
        let mut env = match &self.env_config {
            Some(config) => Some(E::build(config).context("Failed to build conversion env")?),
            None => None,
        };
        let mut n_trajectories = 0;

        for source in std::mem::take(&mut self.sources) {
            match source {
                TrajectorySource::File(path) => {
                    debug!("Data load worker {} reads {:?}", self.id, path);
                    for trajectory in deserialize_trajectory(&path)? {
                        if self.is_stopped() {
                            return Ok(n_trajectories);
                        }
                        n_trajectories += self
                            .process(trajectory?, env.as_mut(), sender)
                            .with_context(|| format!("Failed to load {:?}", path))?;
                    }
                }
                TrajectorySource::Record(trajectory) => {
                    if self.is_stopped() {
                        return Ok(n_trajectories);
                    }
                    n_trajectories += self.process(trajectory, env.as_mut(), sender)?;
                }
            }
        }

        Ok(n_trajectories)
    }

    /// Converts a trajectory and sends the results, returning the number of sent trajectories.
    fn process(
        &self,
        trajectory: TrajectoryRecord<E::State, E::Action>,
        env: Option<&mut E>,
        sender: &Sender<LoaderMessage>,
    ) -> Result<usize> {
        let id = trajectory.id.clone();
        let converted = self
            .processor
            .process(trajectory, env)
            .with_context(|| format!("Failed to convert trajectory {}", id))?;
        let n = converted.len();

        for step_records in converted {
            sender
                .send(LoaderMessage::Trajectory(step_records))
                .context("Coordinator disconnected")?;
        }

        Ok(n)
    }

    fn is_stopped(&self) -> bool {
        // A poisoned flag means the coordinator panicked
        self.stop.lock().map(|stop| *stop).unwrap_or(true)
    }
}
