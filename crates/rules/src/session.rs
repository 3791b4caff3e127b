//! Rule editing session.
//!
//! [`RuleEditorSession`] is the single owner of the editor buffer, compiler
//! adapter, config store, diagnostic store and persistence gate for one open
//! rule editor. All mutation happens on the caller's task:
//!
//! ```text
//! edit() ──► debounce timer ─┐
//! submit() ──► save task ────┼──► SessionMsg ──► next_event()/drain() ──► state update
//! save ack ──► banner timer ─┘
//! ```
//!
//! Spawned work only posts messages, so there is exactly one writer for the
//! store and the diagnostic. Dropping the session aborts pending timers; an
//! in-flight save runs to completion but its result is discarded.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::buffer::EditorBuffer;
use crate::compiler::{CompilerAdapter, RuleCompiler};
use crate::config::EditorConfig;
use crate::diagnostics::DiagnosticStore;
use crate::error::{ApiError, SubmitError};
use crate::msg::{self, MsgReceiver, MsgSender, SessionMsg};
use crate::network::NetworkSeed;
use crate::persist::{NetworkApi, NetworkId, PersistenceGate, SaveAck};
use crate::store::{ConfigSnapshot, ConfigStore};
use crate::types::Diagnostic;

/// Coarse session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
	Editing { diagnostic: bool },
	Submitting,
}

/// What the save area shows: the button, or the diagnostic in its place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveAction {
	Save,
	Diagnostic(String),
}

/// Observable outcome of applying one bus message.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
	/// A compile succeeded and the store now holds this snapshot.
	Compiled(Arc<ConfigSnapshot>),
	/// A compile failed; the store is unchanged.
	CompileFailed(Diagnostic),
	Saved(SaveAck),
	SaveFailed(ApiError),
	BannerDismissed,
}

pub struct RuleEditorSession {
	buffer: EditorBuffer,
	compiler: CompilerAdapter,
	store: Arc<ConfigStore>,
	diagnostics: DiagnosticStore,
	gate: PersistenceGate,
	tx: MsgSender,
	rx: MsgReceiver,
}

impl std::fmt::Debug for RuleEditorSession {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RuleEditorSession")
			.field("revision", &self.buffer.revision())
			.field("compiler", &self.compiler)
			.field("diagnostic", &self.diagnostics.current())
			.field("gate", &self.gate)
			.finish()
	}
}

impl RuleEditorSession {
	/// Opens a session seeded from server data.
	pub fn new(
		seed: NetworkSeed,
		compiler: Arc<dyn RuleCompiler>,
		api: Arc<dyn NetworkApi>,
		config: &EditorConfig,
	) -> Self {
		let (tx, rx) = msg::channel();
		debug!(
			network = %seed.network_id,
			rules = seed.config.rules.len(),
			source_bytes = seed.source.len(),
			"rules.session.open"
		);
		Self {
			buffer: EditorBuffer::new(seed.source),
			compiler: CompilerAdapter::new(compiler, config.debounce()),
			store: Arc::new(ConfigStore::seeded(seed.config, seed.index)),
			diagnostics: DiagnosticStore::default(),
			gate: PersistenceGate::new(api, seed.network_id, config.banner()),
			tx,
			rx,
		}
	}

	/// Registers the callback run after every acknowledged save.
	pub fn on_saved(mut self, callback: impl FnMut(&SaveAck) + Send + 'static) -> Self {
		self.gate.set_on_saved(Box::new(callback));
		self
	}

	/// Operator changed the text. Restarts the compile debounce window.
	///
	/// Panics outside a Tokio runtime: the debounce timer is a spawned task.
	pub fn edit(&mut self, text: impl Into<String>) {
		let revision = self.buffer.set(text.into());
		trace!(revision, bytes = self.buffer.value().len(), "rules.session.edit");
		self.compiler.on_edit(&self.tx);
	}

	/// Current buffer text, independent of compile timing.
	pub fn value(&self) -> &str {
		self.buffer.value()
	}

	pub fn snapshot(&self) -> Arc<ConfigSnapshot> {
		self.store.load()
	}

	/// Shared handle for read-only consumers such as a preview pane.
	pub fn store(&self) -> Arc<ConfigStore> {
		self.store.clone()
	}

	pub fn diagnostic(&self) -> Option<&Diagnostic> {
		self.diagnostics.current()
	}

	pub fn action(&self) -> SaveAction {
		match self.diagnostics.render() {
			Some(rendered) => SaveAction::Diagnostic(rendered),
			None => SaveAction::Save,
		}
	}

	pub fn state(&self) -> SessionState {
		if self.gate.is_in_flight() {
			SessionState::Submitting
		} else {
			SessionState::Editing {
				diagnostic: !self.diagnostics.is_empty(),
			}
		}
	}

	pub fn network_id(&self) -> &NetworkId {
		self.gate.network_id()
	}

	pub fn banner_visible(&self) -> bool {
		self.gate.banner_visible()
	}

	pub fn compile_pending(&self) -> bool {
		self.compiler.is_pending()
	}

	pub fn compile_count(&self) -> u64 {
		self.compiler.compile_count()
	}

	/// Pretty-printed current config for the read-only preview.
	pub fn preview(&self) -> serde_json::Result<String> {
		serde_json::to_string_pretty(&self.store.load().config)
	}

	/// Saves the last compiled config together with the live buffer text.
	///
	/// A compile still inside its debounce window is not forced; the structured
	/// part of the payload may lag `rulesSource`.
	///
	/// Panics outside a Tokio runtime: the save runs as a spawned task.
	pub fn submit(&mut self) -> Result<(), SubmitError> {
		let snapshot = self.store.load();
		self.gate
			.submit(&self.diagnostics, &snapshot, self.buffer.value(), &self.tx)
	}

	/// Waits for the next event. Returns `None` once no timer or save is outstanding.
	pub async fn next_event(&mut self) -> Option<SessionEvent> {
		loop {
			if !self.has_outstanding() && self.rx.is_empty() {
				return None;
			}
			let msg = self.rx.recv().await?;
			if let Some(event) = self.apply(msg) {
				return Some(event);
			}
		}
	}

	/// Applies every message already queued without waiting.
	pub fn drain(&mut self) -> Vec<SessionEvent> {
		let mut events = Vec::new();
		while let Ok(msg) = self.rx.try_recv() {
			events.extend(self.apply(msg));
		}
		events
	}

	fn has_outstanding(&self) -> bool {
		self.compiler.is_pending() || self.gate.has_outstanding()
	}

	fn apply(&mut self, msg: SessionMsg) -> Option<SessionEvent> {
		match msg {
			SessionMsg::CompileDue { token } => {
				match self.compiler.on_due(token, self.buffer.value())? {
					Ok(config) => {
						let snapshot = self.store.replace(config);
						self.diagnostics.clear();
						Some(SessionEvent::Compiled(snapshot))
					}
					Err(diag) => {
						self.diagnostics.set(diag.clone());
						Some(SessionEvent::CompileFailed(diag))
					}
				}
			}
			SessionMsg::SaveDone { result } => {
				self.gate.complete(&result, &self.tx);
				Some(match result {
					Ok(ack) => SessionEvent::Saved(ack),
					Err(err) => SessionEvent::SaveFailed(err),
				})
			}
			SessionMsg::BannerExpired { token } => self
				.gate
				.banner_expired(token)
				.then_some(SessionEvent::BannerDismissed),
		}
	}
}

impl Drop for RuleEditorSession {
	fn drop(&mut self) {
		self.compiler.cancel();
		self.gate.shutdown();
		trace!(network = %self.gate.network_id(), "rules.session.close");
	}
}

#[cfg(test)]
mod tests;
