use clap::{Parser, ValueEnum};
use reqwest::Url;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
	Longpoll,
	Webhook,
}

impl fmt::Display for Mode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Longpoll => write!(f, "longpoll"),
			Self::Webhook => write!(f, "webhook"),
		}
	}
}

#[derive(Parser, Debug, Clone)]
#[command(name = "voice-to-text")]
#[command(about = "Telegram bot that transcribes voice messages on a pool of STT backends", long_about = None)]
pub struct Config {
	/// Telegram bot API token
	#[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
	pub token: String,

	/// How updates are received
	#[arg(long, env = "BOT_MODE", value_enum, default_value_t = Mode::Longpoll)]
	pub mode: Mode,

	/// Bot name, used in logs and in the webhook path
	#[arg(long, env = "BOT_NAME", default_value = "voice-to-text")]
	pub name: String,

	/// Log raw Bot API traffic
	#[arg(long, env = "BOT_DEBUG")]
	pub debug: bool,

	/// Webhook listen address
	#[arg(long, env = "BOT_LISTEN_ADDR", default_value = "0.0.0.0:8080")]
	pub listen_addr: SocketAddr,

	/// Number of transcripts kept by file id, 0 disables the cache
	#[arg(long, env = "BOT_CACHE_SIZE", default_value = "100")]
	pub cache_size: u64,

	/// Long polling timeout in seconds
	#[arg(long, env = "BOT_TIMEOUT", default_value = "60")]
	pub timeout: u64,

	/// STT backend base URLs, one worker per URL
	#[arg(long, env = "BOT_MODEL_INSTANCE_URLS", value_delimiter = ',')]
	pub model_instance_urls: Vec<String>,

	/// Directory for downloaded audio files
	#[arg(long, env = "BOT_DOWNLOADS_DIR", default_value = "./downloads")]
	pub downloads_dir: PathBuf,

	/// Telegram Bot API base URL
	#[arg(long, env = "BOT_API_URL", default_value = "https://api.telegram.org")]
	pub api_url: String,

	/// Log filter directives
	#[arg(long, env = "RUST_LOG", default_value = "info")]
	pub rust_log: String,

	/// Emit logs as JSON
	#[arg(long, env = "LOG_JSON")]
	pub log_json: bool,

	/// Also write JSON logs to this file, rotated daily
	#[arg(long, env = "LOG_FILE")]
	pub log_file: Option<PathBuf>,

	/// Log filter directives for the log file
	#[arg(long, env = "LOG_FILE_LEVEL", default_value = "info")]
	pub log_file_level: String,

	#[command(flatten)]
	pub scheduler: task_queue::Config,
}

impl Config {
	/// Validate configuration values
	pub fn validate(&self) -> Result<(), String> {
		if self.token.trim().is_empty() {
			return Err("bot token is required".to_string());
		}

		if self.timeout == 0 {
			return Err("timeout must be greater than 0".to_string());
		}

		if let Some(log_file) = self.log_file.as_ref().filter(|path| path.file_name().is_none()) {
			return Err(format!("log file {} has no file name", log_file.display()));
		}

		for url in self.model_instance_urls.iter().chain(std::iter::once(&self.api_url)) {
			match Url::parse(url) {
				Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
				Ok(parsed) => return Err(format!("unsupported scheme '{}' in url {url}", parsed.scheme())),
				Err(e) => return Err(format!("invalid url {url}: {e}")),
			}
		}

		Ok(())
	}
}
