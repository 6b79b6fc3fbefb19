use moka::sync::Cache;

/// Transcripts of already processed files, keyed by Telegram file id.
///
/// Holds the reply text as sent, so transcripts longer than a Telegram message are
/// stored already shortened.
#[derive(Clone)]
pub struct TranscriptCache {
	inner: Option<Cache<String, String>>,
}

impl TranscriptCache {
	/// A capacity of 0 disables caching.
	pub fn new(capacity: u64) -> Self {
		Self {
			inner: (capacity > 0).then(|| Cache::new(capacity)),
		}
	}

	pub fn get(&self, file_id: &str) -> Option<String> {
		self.inner.as_ref()?.get(file_id)
	}

	/// Returns `false` when caching is disabled.
	pub fn insert(&self, file_id: String, transcript: String) -> bool {
		match &self.inner {
			Some(cache) => {
				cache.insert(file_id, transcript);
				true
			}
			None => false,
		}
	}

	pub const fn is_enabled(&self) -> bool {
		self.inner.is_some()
	}
}
