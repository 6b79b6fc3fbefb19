use super::error::TelegramError;
use super::types::{ApiResponse, File, Message, Update, User};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use tracing::debug;

/// Thin client for the subset of the Telegram Bot API the bot needs.
#[derive(Clone)]
pub struct BotApi {
	client: reqwest::Client,
	base_url: String,
	token: String,
	debug: bool,
}

impl BotApi {
	pub fn new(base_url: &str, token: &str, debug: bool) -> Self {
		Self {
			client: reqwest::Client::new(),
			base_url: base_url.trim_end_matches('/').to_string(),
			token: token.to_string(),
			debug,
		}
	}

	fn method_url(&self, method: &str) -> String {
		format!("{}/bot{}/{method}", self.base_url, self.token)
	}

	fn file_url(&self, file_path: &str) -> String {
		format!("{}/file/bot{}/{file_path}", self.base_url, self.token)
	}

	async fn call<P, R>(&self, method: &str, params: &P) -> Result<R, TelegramError>
	where
		P: Serialize + Sync,
		R: DeserializeOwned,
	{
		let response = self.client.post(self.method_url(method)).json(params).send().await?;
		let status = response.status();
		let body: ApiResponse<R> = response.json().await?;

		if self.debug {
			debug!(method, status = status.as_u16(), ok = body.ok, "Bot API call");
		}

		match body {
			ApiResponse { ok: true, result: Some(result), .. } => Ok(result),
			ApiResponse { description, error_code, .. } => Err(TelegramError::Api {
				code: error_code,
				description: description.unwrap_or_else(|| format!("{method} failed with status {status}")),
			}),
		}
	}

	pub async fn get_me(&self) -> Result<User, TelegramError> {
		self.call("getMe", &json!({})).await
	}

	pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, TelegramError> {
		self.call(
			"getUpdates",
			&json!({
				"offset": offset,
				"timeout": timeout_secs,
				"allowed_updates": ["message"],
			}),
		)
		.await
	}

	pub async fn send_reply(&self, chat_id: i64, reply_to: i64, text: &str) -> Result<Message, TelegramError> {
		self.call(
			"sendMessage",
			&json!({
				"chat_id": chat_id,
				"text": text,
				"reply_parameters": { "message_id": reply_to },
			}),
		)
		.await
	}

	pub async fn edit_message_text(&self, chat_id: i64, message_id: i64, text: &str) -> Result<(), TelegramError> {
		// Bot API answers with the edited message or `true`, neither is needed.
		let _: serde_json::Value = self
			.call(
				"editMessageText",
				&json!({
					"chat_id": chat_id,
					"message_id": message_id,
					"text": text,
				}),
			)
			.await?;
		Ok(())
	}

	pub async fn get_file(&self, file_id: &str) -> Result<File, TelegramError> {
		self.call("getFile", &json!({ "file_id": file_id })).await
	}

	/// Resolves `file_id` and stores its content at `dest`. Returns the number of bytes written.
	pub async fn download_file(&self, file_id: &str, dest: &Path) -> Result<usize, TelegramError> {
		let file = self.get_file(file_id).await?;
		let file_path = file.file_path.ok_or_else(|| TelegramError::MissingFilePath(file_id.to_string()))?;

		let response = self.client.get(self.file_url(&file_path)).send().await?;
		if !response.status().is_success() {
			return Err(TelegramError::Download(response.status().as_u16()));
		}

		let bytes = response.bytes().await?;
		tokio::fs::write(dest, &bytes).await?;

		debug!(file_id, bytes = bytes.len(), dest = %dest.display(), "File downloaded");
		Ok(bytes.len())
	}
}
