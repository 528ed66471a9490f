use std::any::Any;
use trajset_core::{error::TrajsetError, record::StructuredSpacesRecord};

/// Messages that the coordinator receives from [`DataLoadWorker`](super::DataLoadWorker)s.
pub enum LoaderMessage {
    /// Converted step records of a single trajectory.
    Trajectory(Vec<StructuredSpacesRecord>),

    /// The worker with the given id processed all its sources.
    Done(usize),

    /// The worker failed.
    Error(WorkerErrorReport),
}

impl From<WorkerErrorReport> for LoaderMessage {
    fn from(report: WorkerErrorReport) -> Self {
        Self::Error(report)
    }
}

/// Failure of a data load worker, shipped to the coordinator.
pub struct WorkerErrorReport {
    /// Id of the worker.
    pub worker_id: usize,

    /// The error.
    pub error: anyhow::Error,

    /// The error with its chain of causes, and a backtrace if one was captured.
    pub trace: String,
}

impl WorkerErrorReport {
    /// Creates a report of an error.
    pub fn new(worker_id: usize, error: anyhow::Error) -> Self {
        let trace = format!("{:?}", error);
        Self {
            worker_id,
            error,
            trace,
        }
    }

    /// Creates a report of a panic, given its payload.
    pub fn from_panic(worker_id: usize, payload: Box<dyn Any + Send>) -> Self {
        let msg = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self::new(worker_id, anyhow::anyhow!("Worker panicked: {}", msg))
    }

    /// Converts the report into an error for the caller of the load.
    ///
    /// The original error is kept as the source of the returned error.
    pub fn into_error(self) -> anyhow::Error {
        let worker_id = self.worker_id;
        let report = self.trace;
        self.error
            .context(TrajsetError::WorkerFailed { worker_id, report })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_into_error_keeps_cause() {
        let report = WorkerErrorReport::new(3, anyhow::anyhow!("broken file"));
        assert!(report.trace.contains("broken file"));

        let err = report.into_error();
        assert!(matches!(
            err.downcast_ref::<TrajsetError>(),
            Some(TrajsetError::WorkerFailed { worker_id: 3, .. })
        ));
        assert_eq!(err.root_cause().to_string(), "broken file");
    }

    #[test]
    fn test_from_panic() {
        let payload = std::panic::catch_unwind(|| panic!("boom {}", 1)).unwrap_err();
        let report = WorkerErrorReport::from_panic(0, payload);
        assert!(report.trace.contains("boom 1"));
    }
}
