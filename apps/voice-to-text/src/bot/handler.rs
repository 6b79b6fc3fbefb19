use super::{BotError, UpdateHandler};
use crate::cache::TranscriptCache;
use crate::stt::SttService;
use crate::telegram::{BotApi, Message, Update};
use crate::text::ellipsis;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn, Instrument, Span};
use uuid::Uuid;

const SKIP_HINT: &str = "Send me a voice message!";
const DOWNLOAD_FAILED: &str = "Failed to download the file";
const TRANSCRIPTION_FAILED: &str = "Failed to transcribe the audio :(";
const NO_SPEECH: &str = "No speech found in the audio.";

/// Telegram rejects longer message texts.
const MAX_MESSAGE_CHARS: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
	Voice,
	Audio,
	VideoNote,
}

impl MediaKind {
	/// Picks the transcribable attachment of `message`, if any, with its file id.
	pub fn classify(message: &Message) -> Option<(Self, &str)> {
		if let Some(audio) = &message.audio {
			return Some((Self::Audio, &audio.file_id));
		}
		if let Some(voice) = &message.voice {
			return Some((Self::Voice, &voice.file_id));
		}
		message.video_note.as_ref().map(|note| (Self::VideoNote, note.file_id.as_str()))
	}

	const fn accepted_text(self) -> &'static str {
		match self {
			Self::Voice => "Voice message received, processing...",
			Self::Audio => "Audio received, processing...",
			Self::VideoNote => "Video message received, processing...",
		}
	}
}

/// Removes the downloaded file however the handler exits.
struct TempFile {
	path: PathBuf,
}

impl Drop for TempFile {
	fn drop(&mut self) {
		match std::fs::remove_file(&self.path) {
			Ok(()) => debug!(file_path = %self.path.display(), "Temp file removed"),
			Err(e) if e.kind() == ErrorKind::NotFound => {}
			Err(e) => warn!(file_path = %self.path.display(), error = %e, "Failed to remove temp file"),
		}
	}
}

/// Replies to voice, audio and video notes with their transcription.
pub struct VoiceToTextHandler {
	api: BotApi,
	stt: SttService,
	cache: TranscriptCache,
	downloads_dir: PathBuf,
}

impl VoiceToTextHandler {
	/// Creates `downloads_dir` if needed.
	pub async fn new(api: BotApi, stt: SttService, cache: TranscriptCache, downloads_dir: &Path) -> Result<Self, BotError> {
		tokio::fs::create_dir_all(downloads_dir).await.map_err(|e| {
			error!(downloads_dir = %downloads_dir.display(), error = %e, "Failed to create downloads directory");
			e
		})?;

		info!(downloads_dir = %downloads_dir.display(), cache_enabled = cache.is_enabled(), "Handler initialized");
		Ok(Self {
			api,
			stt,
			cache,
			downloads_dir: downloads_dir.to_path_buf(),
		})
	}

	async fn process(&self, message: &Message) -> Result<(), BotError> {
		let chat_id = message.chat.id;
		info!("Processing new message");

		let Some((kind, file_id)) = MediaKind::classify(message) else {
			if message.chat.is_private() {
				self.api.send_reply(chat_id, message.message_id, SKIP_HINT).await?;
			}
			info!("Message skipped (not media)");
			return Ok(());
		};
		Span::current().record("file_id", file_id);

		let reply = self.api.send_reply(chat_id, message.message_id, kind.accepted_text()).await?;

		if let Some(text) = self.cache.get(file_id) {
			self.api.edit_message_text(chat_id, reply.message_id, &text).await?;
			info!("Cache hit, returning cached result");
			return Ok(());
		}

		let Some(file) = self.download(chat_id, reply.message_id, file_id).await? else {
			return Ok(());
		};

		let transcription = self.transcribe(chat_id, reply.message_id, &file).await?;
		drop(file);
		let Some(transcription) = transcription else {
			return Ok(());
		};

		let text = ellipsis(&transcription, MAX_MESSAGE_CHARS);
		self.api.edit_message_text(chat_id, reply.message_id, &text).await?;

		self.cache.insert(file_id.to_string(), text);
		info!(transcription = %ellipsis(&transcription, 50), "Transcription completed");

		Ok(())
	}

	async fn download(&self, chat_id: i64, reply_id: i64, file_id: &str) -> Result<Option<TempFile>, BotError> {
		let dest = TempFile {
			path: self.downloads_dir.join(format!("tmp_{}", Uuid::new_v4())),
		};

		match self.api.download_file(file_id, &dest.path).await {
			Ok(bytes) => {
				info!(file_path = %dest.path.display(), bytes, "File downloaded successfully");
				Ok(Some(dest))
			}
			Err(e) => {
				error!(file_id, error = %e, "File download failed");
				self.api.edit_message_text(chat_id, reply_id, DOWNLOAD_FAILED).await?;
				Ok(None)
			}
		}
	}

	async fn transcribe(&self, chat_id: i64, reply_id: i64, file: &TempFile) -> Result<Option<String>, BotError> {
		match self.stt.transform(&file.path).await {
			Ok(text) if text.trim().is_empty() => Ok(Some(NO_SPEECH.to_string())),
			Ok(text) => Ok(Some(text)),
			Err(e) => {
				error!(file_path = %file.path.display(), error = %e, "Transcription failed");
				self.api.edit_message_text(chat_id, reply_id, TRANSCRIPTION_FAILED).await?;
				Ok(None)
			}
		}
	}
}

#[async_trait]
impl UpdateHandler for VoiceToTextHandler {
	async fn handle(&self, update: Update) -> Result<(), BotError> {
		let Some(message) = update.message else {
			return Ok(());
		};

		let span = tracing::info_span!(
			"vtt-handler",
			chat_id = message.chat.id,
			message_id = message.message_id,
			user = message.from.as_ref().and_then(|user| user.username.as_deref()).unwrap_or_default(),
			file_id = tracing::field::Empty,
		);

		self.process(&message).instrument(span).await
	}
}
