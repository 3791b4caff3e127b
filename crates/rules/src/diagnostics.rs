//! Most recent compile failure.

use crate::types::Diagnostic;

/// Holds at most one diagnostic; a newer one replaces the previous.
///
/// Its presence is the only thing that blocks saving.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticStore {
	current: Option<Diagnostic>,
}

impl DiagnosticStore {
	pub fn set(&mut self, diag: Diagnostic) {
		self.current = Some(diag);
	}

	pub fn clear(&mut self) {
		self.current = None;
	}

	pub fn current(&self) -> Option<&Diagnostic> {
		self.current.as_ref()
	}

	pub fn is_empty(&self) -> bool {
		self.current.is_none()
	}

	/// `[line:column] message`, or `None` when the last compile succeeded.
	pub fn render(&self) -> Option<String> {
		self.current.as_ref().map(ToString::to_string)
	}
}
