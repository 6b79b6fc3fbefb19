use task_queue::SchedulerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SttError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("HTTP error: {0}")]
	Http(#[from] reqwest::Error),
	#[error("Unexpected status code {status}: {body}")]
	UnexpectedStatus { status: u16, body: String },
	#[error("Invalid response body: {0}")]
	Decode(#[from] serde_json::Error),
	#[error("Scheduler error: {0}")]
	Scheduler(#[from] SchedulerError),
	#[error("Transcription task {0}")]
	Task(String),
	#[error("Transcription cancelled")]
	Cancelled,
}
