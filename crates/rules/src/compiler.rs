//! Compiler adapter: debounced invocation of the external rule compiler.
//!
//! Edits arm a single reschedulable timer. When it fires, the adapter compiles
//! the buffer as it is at that moment and normalizes the compiler's name-keyed
//! maps into insertion-ordered sequences.

use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::msg::{MsgSender, SessionMsg};
use crate::timer::SingleTimer;
use crate::types::{Capability, Diagnostic, FlowConfig, Rule, Tag};

/// Default debounce window between the last edit and a compile.
pub const COMPILE_DEBOUNCE: Duration = Duration::from_millis(100);

/// Output of a successful compile, keyed by name in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledRules {
	pub rules: Vec<Rule>,
	pub capabilities: IndexMap<String, Capability>,
	pub tags: IndexMap<String, Tag>,
}

impl CompiledRules {
	/// Flattens the name-keyed maps into sequences.
	///
	/// The map key is the authoritative name and overwrites whatever the
	/// compiler put in the entry itself.
	pub fn into_config(self) -> FlowConfig {
		let capabilities = self
			.capabilities
			.into_iter()
			.map(|(name, mut cap)| {
				cap.name = name;
				cap
			})
			.collect();
		let tags = self
			.tags
			.into_iter()
			.map(|(name, mut tag)| {
				tag.name = name;
				tag
			})
			.collect();
		FlowConfig {
			rules: self.rules,
			capabilities,
			tags,
		}
	}
}

/// Result of one compile. A failure is an ordinary outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum CompileOutcome {
	Success(CompiledRules),
	Failure(Diagnostic),
}

/// External rule-script compiler.
pub trait RuleCompiler: Send + Sync {
	fn compile(&self, source: &str) -> CompileOutcome;
}

impl<F> RuleCompiler for F
where
	F: Fn(&str) -> CompileOutcome + Send + Sync,
{
	fn compile(&self, source: &str) -> CompileOutcome {
		self(source)
	}
}

/// Debounces edits and runs the compiler on the settled text.
pub(crate) struct CompilerAdapter {
	compiler: Arc<dyn RuleCompiler>,
	window: Duration,
	timer: SingleTimer,
	compiles: u64,
}

impl std::fmt::Debug for CompilerAdapter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CompilerAdapter")
			.field("window", &self.window)
			.field("pending", &self.timer.is_armed())
			.field("compiles", &self.compiles)
			.finish()
	}
}

impl CompilerAdapter {
	pub fn new(compiler: Arc<dyn RuleCompiler>, window: Duration) -> Self {
		Self {
			compiler,
			window,
			timer: SingleTimer::default(),
			compiles: 0,
		}
	}

	/// Restarts the debounce window. Any compile not yet fired is dropped.
	pub(crate) fn on_edit(&mut self, tx: &MsgSender) {
		let token = self.timer.arm(self.window, tx, |token| SessionMsg::CompileDue { token });
		trace!(token, window_ms = self.window.as_millis() as u64, "rules.compile.scheduled");
	}

	/// Handles a fired timer. Returns `None` when `token` was superseded.
	pub(crate) fn on_due(&mut self, token: u64, source: &str) -> Option<Result<FlowConfig, Diagnostic>> {
		if !self.timer.settle(token) {
			trace!(token, "rules.compile.stale_timer");
			return None;
		}
		Some(self.compile_now(source))
	}

	fn compile_now(&mut self, source: &str) -> Result<FlowConfig, Diagnostic> {
		self.compiles += 1;
		match self.compiler.compile(source) {
			CompileOutcome::Success(compiled) => {
				let config = compiled.into_config();
				debug!(
					rules = config.rules.len(),
					capabilities = config.capabilities.len(),
					tags = config.tags.len(),
					"rules.compile.done"
				);
				Ok(config)
			}
			CompileOutcome::Failure(diag) => {
				debug!(line = diag.line, column = diag.column, error = %diag.message, "rules.compile.failed");
				Err(diag)
			}
		}
	}

	/// Whether an edit is waiting for its debounce window to elapse.
	pub fn is_pending(&self) -> bool {
		self.timer.is_armed()
	}

	/// Number of compiles actually run.
	pub fn compile_count(&self) -> u64 {
		self.compiles
	}

	pub(crate) fn cancel(&mut self) {
		self.timer.cancel();
	}
}
