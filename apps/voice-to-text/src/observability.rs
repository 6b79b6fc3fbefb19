use crate::config::Config;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::{Format, Json, JsonFields};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt, Layer};

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync>;

/// Install the global subscriber: pretty output for humans, flattened JSON for collectors.
///
/// With a log file configured, JSON lines also go to that file, rotated daily and
/// filtered on their own. Keep the returned guard alive until exit so buffered
/// lines are flushed.
pub fn init_tracing(config: &Config) -> Result<Option<WorkerGuard>> {
	let mut layers = vec![console_layer(config)?];

	let guard = match &config.log_file {
		Some(log_file) => {
			let (layer, guard) = file_layer(log_file, &config.log_file_level)?;
			layers.push(layer);
			Some(guard)
		}
		None => None,
	};

	tracing_subscriber::registry().with(layers).try_init().context("failed to install tracing subscriber")?;

	Ok(guard)
}

fn env_filter(directives: &str) -> Result<EnvFilter> {
	EnvFilter::try_new(directives).with_context(|| format!("invalid log filter '{directives}'"))
}

fn json_layer<S>() -> fmt::Layer<S, JsonFields, Format<Json>>
where
	S: Subscriber + for<'a> LookupSpan<'a>,
{
	fmt::layer()
		.fmt_fields(JsonFields::default())
		.event_format(fmt::format().json().flatten_event(true).with_span_list(false))
}

fn console_layer<S>(config: &Config) -> Result<BoxedLayer<S>>
where
	S: Subscriber + for<'a> LookupSpan<'a> + 'static,
{
	let filter = env_filter(&config.rust_log)?;

	Ok(if config.log_json {
		json_layer().with_filter(filter).boxed()
	} else {
		fmt::layer()
			.with_target(true)
			.event_format(fmt::format().pretty())
			.with_filter(filter)
			.boxed()
	})
}

fn file_layer<S>(log_file: &Path, directives: &str) -> Result<(BoxedLayer<S>, WorkerGuard)>
where
	S: Subscriber + for<'a> LookupSpan<'a> + 'static,
{
	let filter = env_filter(directives)?;
	let file_name = log_file.file_name().with_context(|| format!("log file {} has no file name", log_file.display()))?;
	let dir = log_file.parent().filter(|dir| !dir.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));

	std::fs::create_dir_all(dir).with_context(|| format!("failed to create log directory {}", dir.display()))?;

	let appender = RollingFileAppender::new(Rotation::DAILY, dir, file_name);
	let (writer, guard) = tracing_appender::non_blocking(appender);

	let layer = json_layer().with_writer(writer).with_ansi(false).with_filter(filter).boxed();
	Ok((layer, guard))
}
