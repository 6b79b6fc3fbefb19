mod bot;
mod cache;
mod config;
mod observability;
mod shutdown;
mod stt;
mod telegram;
mod text;

use anyhow::{Context, Result};
use bot::{router, run_long_polling, run_webhook, VoiceToTextHandler};
use cache::TranscriptCache;
use clap::Parser;
use config::{Config, Mode};
use prometheus::Registry;
use std::sync::Arc;
use shutdown::Shutdown;
use stt::{HttpSttClient, SttService};
use task_queue::{NamedWorkerScheduler, SchedulerMetrics, UnboundedQueue};
use telegram::BotApi;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
	dotenvy::dotenv().ok();

	let config = Config::parse();
	config.validate().map_err(anyhow::Error::msg)?;

	let _log_guard = observability::init_tracing(&config)?;

	info!(
		name = %config.name,
		mode = %config.mode,
		stt_backends = config.model_instance_urls.len(),
		shutdown_policy = %config.scheduler.shutdown_policy,
		"Starting voice-to-text bot"
	);
	if config.model_instance_urls.is_empty() {
		warn!("No STT backends configured, transcriptions will wait until shutdown");
	}

	let shutdown = Shutdown::new();
	tokio::spawn(shutdown.clone().listen());

	let registry = Registry::new();
	let metrics = SchedulerMetrics::register(&registry).context("failed to register scheduler metrics")?;
	let scheduler = Arc::new(
		NamedWorkerScheduler::new(Arc::new(UnboundedQueue::new()), shutdown.workers(), config.scheduler.clone()).with_metrics(metrics),
	);

	let stt = SttService::start(
		scheduler,
		Arc::new(HttpSttClient::new()),
		config.model_instance_urls.clone(),
		shutdown.waiters(config.scheduler.shutdown_policy),
	)?;

	let api = BotApi::new(&config.api_url, &config.token, config.debug);
	let me = api.get_me().await.context("failed to reach the Bot API")?;
	info!(bot_id = me.id, username = me.username.as_deref().unwrap_or_default(), "Authorized on Bot API");

	let handler = Arc::new(VoiceToTextHandler::new(api.clone(), stt.clone(), TranscriptCache::new(config.cache_size), &config.downloads_dir).await?);

	let served = match config.mode {
		Mode::Webhook => run_webhook(shutdown.intake(), config.listen_addr, router(&config.name, handler, registry)).await,
		Mode::Longpoll => {
			run_long_polling(shutdown.intake(), api, handler, config.timeout).await;
			Ok(())
		}
	};
	if let Err(e) = &served {
		error!(error = %e, "Update loop failed");
	}

	shutdown.finish(&stt).await;

	info!("Application exited gracefully");
	served.context("update loop failed")
}
