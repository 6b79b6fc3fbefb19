use super::client::SttClient;
use super::error::SttError;
use crate::text::ellipsis;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use task_queue::{NamedWorkerScheduler, TaskOutcome};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Speech-to-text on a pool of backends, one scheduler worker per backend URL.
#[derive(Clone)]
pub struct SttService {
	scheduler: Arc<NamedWorkerScheduler<String>>,
	client: Arc<dyn SttClient>,
	cancellation_token: CancellationToken,
}

impl SttService {
	/// Starts `scheduler` with one worker per entry of `backend_urls`.
	///
	/// # Errors
	/// Fails if the scheduler was already started.
	pub fn start(
		scheduler: Arc<NamedWorkerScheduler<String>>,
		client: Arc<dyn SttClient>,
		backend_urls: Vec<String>,
		cancellation_token: CancellationToken,
	) -> Result<Self, SttError> {
		info!(worker_count = backend_urls.len(), worker_urls = ?backend_urls, "Initializing STT service with scheduler");

		scheduler.start(backend_urls)?;

		Ok(Self {
			scheduler,
			client,
			cancellation_token,
		})
	}

	/// Transcribes the file on whichever backend frees up first.
	pub async fn transform(&self, file_path: &Path) -> Result<String, SttError> {
		let started = Instant::now();
		info!(file_path = %file_path.display(), pending = self.scheduler.pending(), "Scheduling STT task");

		let (result_tx, result_rx) = oneshot::channel();
		let handle = Handle::current();
		let client = Arc::clone(&self.client);
		let path = file_path.to_path_buf();

		// Runs on the blocking pool, so blocking on the runtime handle is allowed here.
		let completion = self.scheduler.schedule(move |worker_url: String| {
			let result = handle.block_on(client.transcribe(&path, &worker_url));
			let _ = result_tx.send((worker_url, result));
		});

		// A finished task wins over a cancellation that arrives at the same time.
		let outcome = tokio::select! {
			biased;
			outcome = completion.wait() => outcome,
			() = self.cancellation_token.cancelled() => {
				info!(file_path = %file_path.display(), "Transcription abandoned, shutting down");
				return Err(SttError::Cancelled);
			}
		};

		if outcome != TaskOutcome::Completed {
			error!(file_path = %file_path.display(), %outcome, "STT task did not complete");
			return Err(SttError::Task(outcome.to_string()));
		}

		let (worker_url, result) = result_rx.await.map_err(|_| SttError::Task("finished without a result".to_string()))?;

		match &result {
			Ok(text) => info!(
				file_path = %file_path.display(),
				worker_url,
				result_sample = %ellipsis(text, 1024),
				total_time_ms = started.elapsed().as_millis(),
				"Speech-to-text transformation succeeded"
			),
			Err(e) => error!(
				file_path = %file_path.display(),
				worker_url,
				error = %e,
				total_time_ms = started.elapsed().as_millis(),
				"Speech-to-text transformation failed"
			),
		}

		result
	}

	/// Stops the workers. Tasks already running finish first.
	pub async fn shutdown(&self) -> Result<(), SttError> {
		self.scheduler.stop().await?;
		Ok(())
	}
}
