#![warn(missing_docs)]
//! Record types and the conversion environment interface for trajectory datasets.
//!
//! Episodes recorded during rollouts are stored as [`TrajectoryRecord`]s. Their step records
//! either hold raw environment states and actions ([`StateRecord`]) or the observations and
//! actions in the spaces a policy operates on ([`StructuredSpacesRecord`]). Raw records are
//! converted with a [`ConversionEnv`].
//!
//! [`TrajectoryRecord`]: record::TrajectoryRecord
//! [`StateRecord`]: record::StateRecord
//! [`StructuredSpacesRecord`]: record::StructuredSpacesRecord
pub mod dummy;
mod env;
pub mod error;
pub mod record;
pub mod writer;

pub use env::ConversionEnv;
