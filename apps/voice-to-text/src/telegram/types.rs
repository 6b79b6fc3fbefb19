use serde::{Deserialize, Serialize};

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
	pub ok: bool,
	pub result: Option<T>,
	pub description: Option<String>,
	pub error_code: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
	pub update_id: i64,
	pub message: Option<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
	pub message_id: i64,
	pub chat: Chat,
	pub from: Option<User>,
	pub text: Option<String>,
	pub voice: Option<Voice>,
	pub audio: Option<Audio>,
	pub video_note: Option<VideoNote>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
	pub id: i64,
	#[serde(rename = "type")]
	pub kind: String,
}

impl Chat {
	pub fn is_private(&self) -> bool {
		self.kind == "private"
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
	pub id: i64,
	pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voice {
	pub file_id: String,
	pub duration: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Audio {
	pub file_id: String,
	pub duration: Option<u32>,
	pub file_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoNote {
	pub file_id: String,
	pub duration: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
	pub file_id: String,
	pub file_size: Option<u64>,
	pub file_path: Option<String>,
}
