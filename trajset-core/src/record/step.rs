//! Step records.
use super::{ActionType, ObservationType, StepInfo, StepKey};
use crate::{error::TrajsetError, ConversionEnv};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw state and action of an environment step, as recorded during a rollout.
///
/// The state or the action can be missing, e.g. for the last record of an episode, where
/// the environment reached a terminal state and no action was taken anymore.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StateRecord<S, A> {
    /// Raw environment state.
    pub state: Option<S>,

    /// Raw action taken in the state.
    pub action: Option<A>,

    /// Reward obtained by taking the action.
    pub reward: Option<f32>,

    /// Flag denoting if the episode ended with this step.
    pub done: bool,

    /// Auxiliary information.
    pub info: Option<StepInfo>,
}

impl<S, A> StateRecord<S, A> {
    /// Creates a record of a state and an action.
    pub fn new(state: S, action: A, reward: f32, done: bool) -> Self {
        Self {
            state: Some(state),
            action: Some(action),
            reward: Some(reward),
            done,
            info: None,
        }
    }

    /// Sets auxiliary information.
    pub fn info(mut self, info: StepInfo) -> Self {
        self.info = Some(info);
        self
    }

    /// Returns `true` if both the state and the action are present.
    pub fn is_complete(&self) -> bool {
        self.state.is_some() && self.action.is_some()
    }
}

/// Identifies the actor of a sub-step.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActorId {
    /// Key of the sub-step.
    pub step_key: StepKey,

    /// Id of the agent acting in the sub-step.
    pub agent_id: usize,
}

impl ActorId {
    /// Creates an actor id.
    pub fn new(step_key: impl Into<StepKey>, agent_id: usize) -> Self {
        Self {
            step_key: step_key.into(),
            agent_id,
        }
    }
}

/// Observation and action of a single sub-step.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SpacesRecord {
    /// Actor taking the action.
    pub actor_id: ActorId,

    /// Observation.
    pub observation: ObservationType,

    /// Action.
    pub action: ActionType,

    /// Reward. Only the last sub-step of a converted step carries the reward.
    pub reward: Option<f32>,

    /// Done flag. Only the last sub-step of a converted step carries the flag.
    pub done: Option<bool>,

    /// Auxiliary information.
    pub info: Option<StepInfo>,
}

/// Observations and actions of all sub-steps of one environment step.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct StructuredSpacesRecord {
    /// Records of the sub-steps, in the order they were taken.
    pub substep_records: Vec<SpacesRecord>,
}

impl StructuredSpacesRecord {
    /// Creates a record from sub-step records.
    pub fn new(substep_records: Vec<SpacesRecord>) -> Self {
        Self { substep_records }
    }

    /// Converts a [`StateRecord`] with the given environment.
    ///
    /// Every sub-step gets agent id 0. Reward, done flag and info of the state record are
    /// assigned to the last sub-step.
    pub fn converted_from<E: ConversionEnv>(
        state_record: &StateRecord<E::State, E::Action>,
        conversion_env: &mut E,
        first_step_in_episode: bool,
    ) -> Result<Self> {
        let (state, action) = match (&state_record.state, &state_record.action) {
            (Some(state), Some(action)) => (state, action),
            _ => {
                return Err(TrajsetError::Conversion(
                    "state record without state or action".to_string(),
                )
                .into())
            }
        };

        let (observations, actions) =
            conversion_env.observation_and_action_dicts(state, action, first_step_in_episode)?;
        let mut actions: BTreeMap<StepKey, ActionType> = actions.into_iter().collect();

        let mut substep_records = observations
            .into_iter()
            .map(|(step_key, observation)| {
                let action = actions.remove(&step_key).ok_or_else(|| {
                    TrajsetError::Conversion(format!("no action for sub-step {:?}", step_key))
                })?;
                Ok(SpacesRecord {
                    actor_id: ActorId::new(step_key, 0),
                    observation,
                    action,
                    reward: None,
                    done: None,
                    info: None,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        match substep_records.last_mut() {
            Some(last) => {
                last.reward = state_record.reward;
                last.done = Some(state_record.done);
                last.info = state_record.info.clone();
            }
            None => {
                return Err(
                    TrajsetError::Conversion("no sub-steps in converted record".to_string()).into(),
                )
            }
        }

        Ok(Self { substep_records })
    }

    /// Observations keyed by sub-step.
    pub fn observations_dict(&self) -> BTreeMap<StepKey, ObservationType> {
        self.substep_records
            .iter()
            .map(|r| (r.actor_id.step_key.clone(), r.observation.clone()))
            .collect()
    }

    /// Actions keyed by sub-step.
    pub fn actions_dict(&self) -> BTreeMap<StepKey, ActionType> {
        self.substep_records
            .iter()
            .map(|r| (r.actor_id.step_key.clone(), r.action.clone()))
            .collect()
    }

    /// Actor ids of the sub-steps.
    pub fn actor_ids(&self) -> Vec<&ActorId> {
        self.substep_records.iter().map(|r| &r.actor_id).collect()
    }

    /// Sum of the rewards of the sub-steps.
    pub fn reward(&self) -> f32 {
        self.substep_records.iter().filter_map(|r| r.reward).sum()
    }

    /// Done flag of the last sub-step.
    pub fn is_done(&self) -> bool {
        self.substep_records
            .last()
            .and_then(|r| r.done)
            .unwrap_or(false)
    }

    /// Info of the first sub-step.
    pub fn info(&self) -> Option<&StepInfo> {
        self.substep_records.first().and_then(|r| r.info.as_ref())
    }

    /// Returns `true` if there are no sub-step records.
    pub fn is_empty(&self) -> bool {
        self.substep_records.is_empty()
    }
}

/// A step record, either raw or converted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum StepRecord<S, A> {
    /// Raw state and action.
    State(StateRecord<S, A>),

    /// Converted observations and actions.
    Spaces(StructuredSpacesRecord),
}

impl<S, A> StepRecord<S, A> {
    /// Returns `true` if the record can be used as a training sample.
    ///
    /// Raw records need both state and action, converted records at least one sub-step.
    pub fn is_complete(&self) -> bool {
        match self {
            Self::State(r) => r.is_complete(),
            Self::Spaces(r) => !r.is_empty(),
        }
    }

    /// Done flag of the step.
    pub fn is_done(&self) -> bool {
        match self {
            Self::State(r) => r.done,
            Self::Spaces(r) => r.is_done(),
        }
    }

    /// Auxiliary information of the step.
    pub fn info(&self) -> Option<&StepInfo> {
        match self {
            Self::State(r) => r.info.as_ref(),
            Self::Spaces(r) => r.info(),
        }
    }
}

impl<S, A> From<StateRecord<S, A>> for StepRecord<S, A> {
    fn from(record: StateRecord<S, A>) -> Self {
        Self::State(record)
    }
}

impl<S, A> From<StructuredSpacesRecord> for StepRecord<S, A> {
    fn from(record: StructuredSpacesRecord) -> Self {
        Self::Spaces(record)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dummy::{DummyConversionEnv, DummyConversionEnvConfig};
    use crate::record::TIME_LIMIT_TRUNCATED_KEY;
    use test_log::test;

    #[test]
    fn test_converted_from_assigns_reward_to_last_substep() -> Result<()> {
        let mut env = DummyConversionEnv::build(&DummyConversionEnvConfig::default().n_substeps(3))?;
        let record = StateRecord::new(vec![1.0, 2.0], 1, 0.5, true);
        let converted = StructuredSpacesRecord::converted_from(&record, &mut env, true)?;

        assert_eq!(converted.substep_records.len(), 3);
        assert_eq!(converted.substep_records[0].reward, None);
        assert_eq!(converted.substep_records[0].done, None);
        assert_eq!(converted.substep_records[2].reward, Some(0.5));
        assert!(converted.is_done());
        assert_eq!(converted.reward(), 0.5);
        assert!(converted.actor_ids().iter().all(|id| id.agent_id == 0));
        assert_eq!(converted.observations_dict().len(), 3);
        assert_eq!(converted.actions_dict().len(), 3);
        Ok(())
    }

    #[test]
    fn test_converted_from_incomplete_record() -> Result<()> {
        let mut env = DummyConversionEnv::build(&DummyConversionEnvConfig::default())?;
        let record = StateRecord::<Vec<f32>, usize> {
            state: Some(vec![0.0]),
            action: None,
            reward: None,
            done: true,
            info: None,
        };
        let err = StructuredSpacesRecord::converted_from(&record, &mut env, false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TrajsetError>(),
            Some(TrajsetError::Conversion(_))
        ));
        Ok(())
    }

    #[test]
    fn test_step_record_flags() {
        let info = StepInfo::from([(TIME_LIMIT_TRUNCATED_KEY.to_string(), "true".to_string())]);
        let raw: StepRecord<Vec<f32>, usize> =
            StateRecord::new(vec![0.0], 0, 1.0, true).info(info).into();
        assert!(raw.is_complete());
        assert!(raw.is_done());
        assert!(raw.info().unwrap().contains_key(TIME_LIMIT_TRUNCATED_KEY));

        let empty: StepRecord<Vec<f32>, usize> = StructuredSpacesRecord::default().into();
        assert!(!empty.is_complete());
        assert!(!empty.is_done());
        assert!(empty.info().is_none());
    }
}
