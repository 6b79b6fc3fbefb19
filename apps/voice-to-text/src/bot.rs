mod error;
mod handler;
mod long_polling;
mod webhook;

pub use error::BotError;
pub use handler::VoiceToTextHandler;
pub use long_polling::run_long_polling;
pub use webhook::{router, run_webhook};

use crate::telegram::Update;
use async_trait::async_trait;

/// Reaction to a single incoming update.
#[async_trait]
pub trait UpdateHandler: Send + Sync {
	async fn handle(&self, update: Update) -> Result<(), BotError>;
}
