/// Shortens `text` to at most `max_chars` characters, marking the cut with "...".
pub fn ellipsis(text: &str, max_chars: usize) -> String {
	if text.chars().count() <= max_chars {
		return text.to_string();
	}

	let keep = max_chars.saturating_sub(3);
	let mut shortened: String = text.chars().take(keep).collect();
	shortened.push_str(&"..."[..max_chars.min(3)]);
	shortened
}
