use crate::stt::SttService;
use task_queue::ShutdownPolicy;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Two-stage shutdown.
///
/// The first signal closes intake: update loops stop and no new work arrives. The
/// scheduler is then stopped under its configured policy. A second signal cancels
/// the workers outright, abandoning whatever is still queued.
#[derive(Clone, Default)]
pub struct Shutdown {
	intake: CancellationToken,
	workers: CancellationToken,
}

impl Shutdown {
	pub fn new() -> Self {
		Self::default()
	}

	/// Cancelled once intake closes. Drives the update loops.
	pub fn intake(&self) -> CancellationToken {
		self.intake.clone()
	}

	/// Cancelled only on a forced shutdown. Owned by the scheduler.
	pub fn workers(&self) -> CancellationToken {
		self.workers.clone()
	}

	/// Token transcription callers give up on.
	///
	/// Under [`ShutdownPolicy::Drain`] queued transcriptions still run, so callers
	/// keep waiting for them until a forced shutdown.
	pub fn waiters(&self, policy: ShutdownPolicy) -> CancellationToken {
		match policy {
			ShutdownPolicy::Drain => self.workers(),
			ShutdownPolicy::Abandon => self.intake(),
		}
	}

	pub fn close_intake(&self) {
		self.intake.cancel();
	}

	pub fn force(&self) {
		self.workers.cancel();
	}

	/// Maps SIGINT/SIGTERM to the two stages.
	pub async fn listen(self) {
		wait_for_shutdown_signal().await;
		info!("Shutdown signal received (SIGTERM/SIGINT), closing intake");
		self.close_intake();

		wait_for_shutdown_signal().await;
		warn!("Second shutdown signal received, abandoning queued transcriptions");
		self.force();
	}

	/// Stops the STT workers after the update loops have returned.
	pub async fn finish(&self, stt: &SttService) {
		self.close_intake();
		if let Err(e) = stt.shutdown().await {
			warn!(error = %e, "STT service shutdown failed");
		}
		self.force();
	}
}

async fn wait_for_shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = signal::ctrl_c().await {
			error!(error = %e, "Failed to install Ctrl+C handler");
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut sigterm) => {
				sigterm.recv().await;
			}
			Err(e) => {
				error!(error = %e, "Failed to install SIGTERM handler");
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		() = ctrl_c => {},
		() = terminate => {},
	}
}
