use super::error::SttError;
use crate::text::ellipsis;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info};

const RESPONSE_SAMPLE_CHARS: usize = 1024;

/// Speech-to-text backend.
#[async_trait]
pub trait SttClient: Send + Sync {
	/// Transcribes the audio file at `file_path` on the backend at `backend_url`.
	async fn transcribe(&self, file_path: &Path, backend_url: &str) -> Result<String, SttError>;
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
	transcription: String,
}

/// Posts the file as multipart field `audio` to `{backend_url}/transcriptions`.
#[derive(Clone, Default)]
pub struct HttpSttClient {
	client: reqwest::Client,
}

impl HttpSttClient {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl SttClient for HttpSttClient {
	async fn transcribe(&self, file_path: &Path, backend_url: &str) -> Result<String, SttError> {
		let started = Instant::now();
		info!(worker_url = backend_url, file_path = %file_path.display(), "STT request started");

		let audio = tokio::fs::read(file_path).await?;
		let file_name = file_path
			.file_name()
			.map_or_else(|| "audio".to_string(), |name| name.to_string_lossy().into_owned());
		let body_size = audio.len();

		let form = Form::new().part("audio", Part::bytes(audio).file_name(file_name));
		let url = format!("{}/transcriptions", backend_url.trim_end_matches('/'));

		let response = self.client.post(url).multipart(form).send().await.map_err(|e| {
			error!(worker_url = backend_url, error = %e, elapsed_ms = started.elapsed().as_millis(), "Request failed");
			e
		})?;

		let status = response.status();
		info!(worker_url = backend_url, %status, body_size, elapsed_ms = started.elapsed().as_millis(), "Response received");

		if status != StatusCode::OK {
			let body = response.text().await.unwrap_or_default();
			let body = ellipsis(&body, RESPONSE_SAMPLE_CHARS);
			error!(worker_url = backend_url, status_code = status.as_u16(), response_body = %body, "Unexpected status code");
			return Err(SttError::UnexpectedStatus {
				status: status.as_u16(),
				body,
			});
		}

		let raw = response.bytes().await?;
		let parsed: TranscriptionResponse = serde_json::from_slice(&raw).map_err(|e| {
			error!(
				worker_url = backend_url,
				error = %e,
				response_sample = %ellipsis(&String::from_utf8_lossy(&raw), RESPONSE_SAMPLE_CHARS),
				"Error decoding response"
			);
			e
		})?;

		info!(
			worker_url = backend_url,
			transcription = %ellipsis(&parsed.transcription, RESPONSE_SAMPLE_CHARS),
			total_elapsed_ms = started.elapsed().as_millis(),
			"STT request completed successfully"
		);

		Ok(parsed.transcription)
	}
}
