use anyhow::Result;
use trajset_core::{
    error::TrajsetError,
    record::{StepRecord, StructuredSpacesRecord, TrajectoryRecord},
    ConversionEnv,
};

/// Result of [`TrajectoryProcessor::pre_process`], one or many trajectories.
#[derive(Clone, Debug, PartialEq)]
pub enum Preprocessed<S, A> {
    /// A single trajectory.
    Single(TrajectoryRecord<S, A>),

    /// Multiple trajectories derived from one, e.g. by data augmentation.
    Multiple(Vec<TrajectoryRecord<S, A>>),
}

impl<S, A> Preprocessed<S, A> {
    /// Returns the trajectories as a list.
    pub fn into_vec(self) -> Vec<TrajectoryRecord<S, A>> {
        match self {
            Self::Single(t) => vec![t],
            Self::Multiple(v) => v,
        }
    }
}

impl<S, A> From<TrajectoryRecord<S, A>> for Preprocessed<S, A> {
    fn from(trajectory: TrajectoryRecord<S, A>) -> Self {
        Self::Single(trajectory)
    }
}

impl<S, A> From<Vec<TrajectoryRecord<S, A>>> for Preprocessed<S, A> {
    fn from(trajectories: Vec<TrajectoryRecord<S, A>>) -> Self {
        Self::Multiple(trajectories)
    }
}

/// Processes individual trajectories with raw states `S` and actions `A`.
///
/// A trajectory is first pre-processed with [`TrajectoryProcessor::pre_process`], which can
/// modify it, drop it or derive several trajectories from it, e.g. for data augmentation.
/// Each resulting trajectory is then converted into [`StructuredSpacesRecord`]s with
/// [`convert_trajectory_with_env`].
///
/// Processors that do not look into states and actions implement the trait for any `S` and
/// `A`; processors that need to, for example to clone them, add bounds in their impl.
pub trait TrajectoryProcessor<S, A> {
    /// Pre-processes a trajectory before conversion.
    fn pre_process(&self, trajectory: TrajectoryRecord<S, A>) -> Preprocessed<S, A>;

    /// Pre-processes and converts a trajectory.
    ///
    /// Returns a list of converted trajectories, each being a list of step records.
    /// `conversion_env` is required only if the trajectory holds raw state records.
    fn process<E>(
        &self,
        trajectory: TrajectoryRecord<S, A>,
        mut conversion_env: Option<&mut E>,
    ) -> Result<Vec<Vec<StructuredSpacesRecord>>>
    where
        E: ConversionEnv<State = S, Action = A>,
        Self: Sized,
    {
        self.pre_process(trajectory)
            .into_vec()
            .into_iter()
            .map(|t| convert_trajectory_with_env(t, conversion_env.as_deref_mut()))
            .collect()
    }
}

/// Converts a trajectory into [`StructuredSpacesRecord`]s using the given environment.
///
/// Raw state records without state or action (e.g. at the end of an episode) are dropped.
/// The record at the start of the trajectory is converted as the first step of the episode.
/// Records that are already converted are passed through.
///
/// Fails with [`TrajsetError::MissingConversionEnv`] if a raw state record is found and
/// `conversion_env` is `None`.
pub fn convert_trajectory_with_env<E: ConversionEnv>(
    trajectory: TrajectoryRecord<E::State, E::Action>,
    mut conversion_env: Option<&mut E>,
) -> Result<Vec<StructuredSpacesRecord>> {
    let mut step_records = Vec::with_capacity(trajectory.len());

    for (step_id, step_record) in trajectory.step_records.into_iter().enumerate() {
        match step_record {
            StepRecord::State(record) => {
                let env = conversion_env
                    .as_deref_mut()
                    .ok_or(TrajsetError::MissingConversionEnv)?;

                // Incomplete records at the end of episodes
                if !record.is_complete() {
                    continue;
                }

                step_records.push(StructuredSpacesRecord::converted_from(
                    &record,
                    env,
                    step_id == 0,
                )?);
            }
            StepRecord::Spaces(record) => step_records.push(record),
        }
    }

    Ok(step_records)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::IdentityTrajectoryProcessor;
    use trajset_core::{
        dummy::{DummyConversionEnv, DummyConversionEnvConfig},
        record::{StateRecord, StructuredSpacesRecord},
    };

    type Trajectory = TrajectoryRecord<Vec<f32>, usize>;

    fn raw_trajectory(n: usize) -> Trajectory {
        let mut t = Trajectory::new("raw");
        for i in 0..n {
            t.push(StateRecord::new(vec![i as f32 + 1.0], i, 1.0, i + 1 == n));
        }
        t
    }

    /// Splits a trajectory into two halves.
    struct Halving;

    impl<S, A> TrajectoryProcessor<S, A> for Halving {
        fn pre_process(&self, mut trajectory: TrajectoryRecord<S, A>) -> Preprocessed<S, A> {
            let tail = trajectory.step_records.split_off(trajectory.len() / 2);
            let second = TrajectoryRecord::with_records(trajectory.id.clone(), tail);
            vec![trajectory, second].into()
        }
    }

    /// Repeats a trajectory, as done by augmentations deriving several episodes from one.
    struct Repeat(usize);

    impl<S: Clone, A: Clone> TrajectoryProcessor<S, A> for Repeat {
        fn pre_process(&self, trajectory: TrajectoryRecord<S, A>) -> Preprocessed<S, A> {
            vec![trajectory; self.0].into()
        }
    }

    #[test]
    fn test_convert_drops_incomplete_records() -> Result<()> {
        let mut env = DummyConversionEnv::build(&DummyConversionEnvConfig::default())?;
        let mut t = raw_trajectory(3);
        t.push(StateRecord::<Vec<f32>, usize> {
            state: Some(vec![9.0]),
            action: None,
            reward: None,
            done: true,
            info: None,
        });

        let records = convert_trajectory_with_env(t, Some(&mut env))?;
        assert_eq!(records.len(), 3);

        // Only the first step is tagged as the first step in the episode
        let first_step = |r: &StructuredSpacesRecord| {
            r.substep_records[0].observation["first_step"][[0]]
        };
        assert_eq!(first_step(&records[0]), 1.0);
        assert_eq!(first_step(&records[1]), 0.0);
        Ok(())
    }

    #[test]
    fn test_convert_passes_through_converted_records() -> Result<()> {
        let mut t = Trajectory::new("converted");
        t.push(StructuredSpacesRecord::default());
        t.push(StructuredSpacesRecord::default());

        let records = convert_trajectory_with_env::<DummyConversionEnv>(t, None)?;
        assert_eq!(records.len(), 2);
        Ok(())
    }

    #[test]
    fn test_convert_without_env() {
        let err = convert_trajectory_with_env::<DummyConversionEnv>(raw_trajectory(2), None)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TrajsetError>(),
            Some(TrajsetError::MissingConversionEnv)
        ));
    }

    #[test]
    fn test_process() -> Result<()> {
        let mut env = DummyConversionEnv::build(&DummyConversionEnvConfig::default())?;

        let converted = IdentityTrajectoryProcessor.process(raw_trajectory(4), Some(&mut env))?;
        assert_eq!(converted.len(), 1);
        assert_eq!(converted[0].len(), 4);

        let converted = Halving.process(raw_trajectory(5), Some(&mut env))?;
        assert_eq!(converted.len(), 2);
        assert_eq!(converted[0].len(), 2);
        assert_eq!(converted[1].len(), 3);
        Ok(())
    }

    #[test]
    fn test_process_repeated_trajectory() -> Result<()> {
        let mut env = DummyConversionEnv::build(&DummyConversionEnvConfig::default())?;

        let converted = Repeat(3).process(raw_trajectory(4), Some(&mut env))?;
        assert_eq!(converted.len(), 3);
        assert!(converted.iter().all(|records| records == &converted[0]));

        // Each copy starts its own episode
        let first_step = converted[2][0].substep_records[0].observation["first_step"][[0]];
        assert_eq!(first_step, 1.0);

        // Usable as a trait object for pre-processing
        let processor: &dyn TrajectoryProcessor<Vec<f32>, usize> = &Repeat(2);
        assert_eq!(processor.pre_process(raw_trajectory(1)).into_vec().len(), 2);
        Ok(())
    }
}
