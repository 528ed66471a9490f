//! Errors in the library.
use std::path::PathBuf;
use thiserror::Error;

/// Errors in the library.
///
/// Functions in this workspace return [`anyhow::Result`]; the variants here are attached to
/// the returned error and can be recovered with `err.downcast_ref::<TrajsetError>()`.
#[derive(Error, Debug)]
pub enum TrajsetError {
    /// The given path does not point to a file.
    #[error("Trajectory file not found: {0:?}")]
    FileNotFound(PathBuf),

    /// The content of a trajectory file has an unexpected shape.
    #[error("Unsupported trajectory data in {path:?}, expected a trajectory record, or list or map thereof: {reason}")]
    Format {
        /// File being read.
        path: PathBuf,
        /// Description of the decoding failure.
        reason: String,
    },

    /// The data source is neither a file nor a directory.
    #[error("Unsupported data source: {0:?}")]
    UnsupportedSource(PathBuf),

    /// A raw state record has to be converted but no conversion environment is available.
    #[error("Conversion from raw states is needed, but no conversion environment is present")]
    MissingConversionEnv,

    /// The conversion environment returned inconsistent data.
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Index into the dataset out of range.
    #[error("Index {index} out of range for dataset of length {len}")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of step records in the dataset.
        len: usize,
    },

    /// The split lengths do not sum up to the dataset length.
    #[error("Sum of split lengths ({actual}) does not equal the length of the dataset ({expected})")]
    SplitLengthMismatch {
        /// Number of step records in the dataset.
        expected: usize,
        /// Sum of the requested lengths.
        actual: usize,
    },

    /// No split lengths were given.
    #[error("At least one split length is required")]
    EmptySplitLengths,

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A data load worker failed. `report` holds the error chain recorded in the worker.
    #[error("Data load worker {worker_id} encountered the following error:\n{report}")]
    WorkerFailed {
        /// Id of the failed worker.
        worker_id: usize,
        /// Formatted error chain of the failure.
        report: String,
    },

    /// Workers went away before all of them reported completion.
    #[error("Data load workers disconnected, {n_done} of {n_workers} finished")]
    WorkerDisconnected {
        /// Number of workers that reported completion.
        n_done: usize,
        /// Number of started workers.
        n_workers: usize,
    },
}
