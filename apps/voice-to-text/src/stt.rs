mod client;
mod error;
mod service;

pub use client::{HttpSttClient, SttClient};
pub use error::SttError;
pub use service::SttService;
