//! This module is used for tests.
use crate::{
    record::{ActionType, ObservationType, StepKey},
    ConversionEnv,
};
use anyhow::{bail, Result};
use ndarray::{arr1, ArrayD};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// Configuration of [`DummyConversionEnv`].
#[derive(Clone, Debug)]
pub struct DummyConversionEnvConfig {
    /// Number of sub-steps per environment step.
    pub n_substeps: usize,

    /// Conversion fails when the first element of a state equals this value.
    pub fail_on_state: Option<f32>,

    /// Conversion panics when the first element of a state equals this value.
    pub panic_on_state: Option<f32>,

    /// Incremented every time an environment is built.
    pub build_counter: Option<Arc<AtomicUsize>>,
}

impl Default for DummyConversionEnvConfig {
    fn default() -> Self {
        Self {
            n_substeps: 1,
            fail_on_state: None,
            panic_on_state: None,
            build_counter: None,
        }
    }
}

impl DummyConversionEnvConfig {
    /// Sets the number of sub-steps.
    pub fn n_substeps(mut self, n_substeps: usize) -> Self {
        self.n_substeps = n_substeps;
        self
    }

    /// Makes conversion fail on states starting with `v`.
    pub fn fail_on_state(mut self, v: f32) -> Self {
        self.fail_on_state = Some(v);
        self
    }

    /// Makes conversion panic on states starting with `v`.
    pub fn panic_on_state(mut self, v: f32) -> Self {
        self.panic_on_state = Some(v);
        self
    }

    /// Sets a counter of built environments.
    pub fn build_counter(mut self, counter: Arc<AtomicUsize>) -> Self {
        self.build_counter = Some(counter);
        self
    }
}

/// Dummy conversion environment.
///
/// States are vectors of `f32`, actions are discrete. Each step is split into
/// `n_substeps` sub-steps with keys `substep_0`, `substep_1`, ...; every sub-step observes
/// the whole state and takes the whole action.
pub struct DummyConversionEnv {
    config: DummyConversionEnvConfig,
}

impl DummyConversionEnv {
    fn check(&self, state: &[f32]) -> Result<()> {
        let head = state.first().copied();
        if head.is_some() && head == self.config.panic_on_state {
            panic!("dummy conversion panicked on state {:?}", state);
        }
        if head.is_some() && head == self.config.fail_on_state {
            bail!("dummy conversion failed on state {:?}", state);
        }
        Ok(())
    }

    fn step_keys(&self) -> impl Iterator<Item = StepKey> {
        (0..self.config.n_substeps).map(|i| format!("substep_{}", i))
    }
}

impl ConversionEnv for DummyConversionEnv {
    type Config = DummyConversionEnvConfig;
    type State = Vec<f32>;
    type Action = usize;

    fn build(config: &Self::Config) -> Result<Self> {
        if let Some(counter) = &config.build_counter {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        Ok(Self {
            config: config.clone(),
        })
    }

    fn observation_conversion(
        &mut self,
        state: &Self::State,
        first_step_in_episode: bool,
    ) -> Result<Vec<(StepKey, ObservationType)>> {
        self.check(state)?;
        let first = if first_step_in_episode { 1.0 } else { 0.0 };
        Ok(self
            .step_keys()
            .map(|key| {
                let obs = ObservationType::from([
                    ("observation".to_string(), arr1(state).into_dyn()),
                    ("first_step".to_string(), arr1(&[first]).into_dyn()),
                ]);
                (key, obs)
            })
            .collect())
    }

    fn action_conversion(
        &mut self,
        state: &Self::State,
        action: &Self::Action,
        _first_step_in_episode: bool,
    ) -> Result<Vec<(StepKey, ActionType)>> {
        self.check(state)?;
        Ok(self
            .step_keys()
            .map(|key| {
                let act: ArrayD<f32> = arr1(&[*action as f32]).into_dyn();
                (key, ActionType::from([("action".to_string(), act)]))
            })
            .collect())
    }
}
