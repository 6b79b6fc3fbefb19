mod client;
mod error;
mod types;

pub use client::BotApi;
pub use error::TelegramError;
pub use types::{Message, Update};
