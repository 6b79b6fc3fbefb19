use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulerError {
	#[error("Scheduler was already started")]
	AlreadyStarted,
	#[error("Scheduler is not running")]
	NotRunning,
	#[error("Prometheus error: {0}")]
	Metrics(#[from] prometheus::Error),
}
