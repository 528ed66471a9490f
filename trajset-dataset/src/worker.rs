//! Workers loading trajectory data in parallel.
//!
//! # Messages
//! * From [`DataLoadWorker`] to the coordinating [`InMemoryDataset`](crate::InMemoryDataset),
//!   see [`LoaderMessage`]:
//!   - `Trajectory`: converted step records of one trajectory
//!   - `Done`: all assigned sources were processed
//!   - `Error`: the worker failed, see [`WorkerErrorReport`]
mod base;
mod message;
pub use base::DataLoadWorker;
pub use message::{LoaderMessage, WorkerErrorReport};
