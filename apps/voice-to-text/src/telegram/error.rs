use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelegramError {
	#[error("HTTP error: {0}")]
	Http(reqwest::Error),
	#[error("Bot API error {code:?}: {description}")]
	Api { code: Option<i32>, description: String },
	#[error("File {0} has no download path")]
	MissingFilePath(String),
	#[error("File download failed with status {0}")]
	Download(u16),
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

// Request URLs carry the bot token, keep them out of error messages.
impl From<reqwest::Error> for TelegramError {
	fn from(error: reqwest::Error) -> Self {
		Self::Http(error.without_url())
	}
}
