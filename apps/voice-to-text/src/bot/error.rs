use crate::telegram::TelegramError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
	#[error("Telegram error: {0}")]
	Telegram(#[from] TelegramError),
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}
