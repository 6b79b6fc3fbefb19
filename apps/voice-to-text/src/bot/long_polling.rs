use super::UpdateHandler;
use crate::telegram::BotApi;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const RETRY_DELAY: Duration = Duration::from_secs(3);

/// Pulls updates with `getUpdates` until cancelled.
///
/// Each update is handled on its own task so that slow transcriptions do not
/// hold back the next update and the worker pool can run them side by side.
pub async fn run_long_polling(cancellation_token: CancellationToken, api: BotApi, handler: Arc<dyn UpdateHandler>, timeout_secs: u64) {
	info!(timeout_secs, "Start long polling");

	let mut offset = 0_i64;
	let mut in_flight = JoinSet::new();

	loop {
		while let Some(joined) = in_flight.try_join_next() {
			if let Err(e) = joined {
				error!(error = %e, "Update handler task failed");
			}
		}

		let updates = tokio::select! {
			() = cancellation_token.cancelled() => {
				warn!("Long polling cancelled");
				break;
			}
			updates = api.get_updates(offset, timeout_secs) => updates,
		};

		let updates = match updates {
			Ok(updates) => updates,
			Err(e) => {
				error!(error = %e, retry_in_secs = RETRY_DELAY.as_secs(), "Failed to get updates");
				tokio::select! {
					() = cancellation_token.cancelled() => break,
					() = tokio::time::sleep(RETRY_DELAY) => continue,
				}
			}
		};

		for update in updates {
			offset = offset.max(update.update_id + 1);

			let handler = Arc::clone(&handler);
			in_flight.spawn(async move {
				let update_id = update.update_id;
				info!(update_id, "Start update handle");
				match handler.handle(update).await {
					Ok(()) => info!(update_id, "Done update handle"),
					Err(e) => error!(update_id, error = %e, "Failed update handle"),
				}
			});
		}
	}

	info!(in_flight = in_flight.len(), "Waiting for in-flight updates");
	while let Some(joined) = in_flight.join_next().await {
		if let Err(e) = joined {
			error!(error = %e, "Update handler task failed");
		}
	}
	info!("Long polling stopped");
}
