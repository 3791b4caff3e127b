//! Editor buffer holding the operator's rule script.

/// Raw rule-script text as last typed. No validation happens here.
#[derive(Debug, Clone, Default)]
pub struct EditorBuffer {
	text: String,
	revision: u64,
}

impl EditorBuffer {
	/// Seeds the buffer with server-provided source.
	pub fn new(text: impl Into<String>) -> Self {
		Self {
			text: text.into(),
			revision: 0,
		}
	}

	pub fn value(&self) -> &str {
		&self.text
	}

	/// Replaces the text and bumps the revision.
	pub fn set(&mut self, text: String) -> u64 {
		self.text = text;
		self.revision += 1;
		self.revision
	}

	/// Number of edits since the buffer was seeded.
	pub fn revision(&self) -> u64 {
		self.revision
	}
}
