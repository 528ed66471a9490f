//! Conversion environment.
use crate::record::{ActionType, ObservationType, StepKey};
use anyhow::Result;

/// Converts raw recorded states and actions into structured observations and actions.
///
/// A recorded episode keeps the raw environment state and the raw action of every step.
/// Before these can be used for behavioral cloning, they have to be mapped into the
/// observation and action spaces the policy operates on. The environment configuration
/// (space interfaces, wrappers, ...) determines these spaces, so the mapping is delegated
/// to an environment implementing this trait.
///
/// One environment step may be decomposed into several sub-steps, each of them being a
/// separate decision with its own observation and action. Conversion results are therefore
/// ordered lists keyed by [`StepKey`]; the order is the order in which the sub-steps are
/// taken.
///
/// Environments are built from [`Self::Config`] with [`ConversionEnv::build`]. When data is
/// loaded in parallel, every worker builds its own environment once.
pub trait ConversionEnv {
    /// Configuration, used to build an environment in each data load worker.
    type Config: Clone;

    /// Raw state recorded at each step.
    type State;

    /// Raw action recorded at each step.
    type Action;

    /// Builds an environment.
    fn build(config: &Self::Config) -> Result<Self>
    where
        Self: Sized;

    /// Converts a raw state into observations of the sub-steps.
    ///
    /// `first_step_in_episode` is `true` for the first converted step of an episode,
    /// so that the environment can reset its sub-step sequencing.
    fn observation_conversion(
        &mut self,
        state: &Self::State,
        first_step_in_episode: bool,
    ) -> Result<Vec<(StepKey, ObservationType)>>;

    /// Converts a raw action taken in the given state into actions of the sub-steps.
    fn action_conversion(
        &mut self,
        state: &Self::State,
        action: &Self::Action,
        first_step_in_episode: bool,
    ) -> Result<Vec<(StepKey, ActionType)>>;

    /// Converts a state and an action, returning observations and actions of the sub-steps.
    fn observation_and_action_dicts(
        &mut self,
        state: &Self::State,
        action: &Self::Action,
        first_step_in_episode: bool,
    ) -> Result<(Vec<(StepKey, ObservationType)>, Vec<(StepKey, ActionType)>)> {
        let obs = self.observation_conversion(state, first_step_in_episode)?;
        let act = self.action_conversion(state, action, first_step_in_episode)?;
        Ok((obs, act))
    }
}
