//! Shared fakes for the editing session integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use zeroui_rules::{ApiError, Capability, CompileOutcome, CompiledRules, Diagnostic, NetworkApi, NetworkId, Rule, RuleCompiler, SaveAck, SavePayload, Tag};

/// Line-oriented stand-in for the flow-rule compiler.
///
/// ```text
/// accept | drop          -> rule
/// cap <name> <id>        -> capability
/// tag <name> <id> <def>  -> tag
/// ```
///
/// Blank lines and `#` comments are skipped. Anything else fails with
/// `unexpected token` at the first non-blank column of that line.
#[derive(Default)]
pub struct ScriptCompiler {
	pub sources: Mutex<Vec<String>>,
}

impl ScriptCompiler {
	pub fn compiled_sources(&self) -> Vec<String> {
		self.sources.lock().clone()
	}
}

impl RuleCompiler for ScriptCompiler {
	fn compile(&self, source: &str) -> CompileOutcome {
		self.sources.lock().push(source.to_string());

		let mut out = CompiledRules::default();
		for (idx, line) in source.lines().enumerate() {
			let trimmed = line.trim_start();
			let column = (line.len() - trimmed.len()) as u32 + 1;
			let words: Vec<&str> = trimmed.split_whitespace().collect();
			let fail = || CompileOutcome::Failure(Diagnostic::new(idx as u32 + 1, column, "unexpected token"));

			match words.as_slice() {
				[] => {}
				[first, ..] if first.starts_with('#') => {}
				["accept"] => out.rules.push(Rule::new(json!({ "type": "ACTION_ACCEPT" }))),
				["drop"] => out.rules.push(Rule::new(json!({ "type": "ACTION_DROP" }))),
				["cap", name, id] => {
					let Ok(id) = id.parse::<u64>() else { return fail() };
					out.capabilities.insert(name.to_string(), Capability::new(id, *name));
				}
				["tag", name, id, default] => {
					let (Ok(id), Ok(default)) = (id.parse::<u64>(), default.parse::<i64>()) else {
						return fail();
					};
					out.tags.insert(name.to_string(), Tag::new(id, *name, default));
				}
				_ => return fail(),
			}
		}
		CompileOutcome::Success(out)
	}
}

/// Records every save and answers with a configurable result.
#[derive(Default)]
pub struct RecordingApi {
	pub saved: Mutex<Vec<(NetworkId, SavePayload)>>,
	pub fail_with: Mutex<Option<ApiError>>,
}

impl RecordingApi {
	pub fn payloads(&self) -> Vec<SavePayload> {
		self.saved.lock().iter().map(|(_, p)| p.clone()).collect()
	}
}

#[async_trait]
impl NetworkApi for RecordingApi {
	async fn save(&self, network_id: &NetworkId, payload: &SavePayload) -> Result<SaveAck, ApiError> {
		self.saved.lock().push((network_id.clone(), payload.clone()));
		if let Some(err) = self.fail_with.lock().clone() {
			return Err(err);
		}
		Ok(SaveAck {
			network_id: network_id.clone(),
		})
	}
}

pub fn fakes() -> (Arc<ScriptCompiler>, Arc<RecordingApi>) {
	(Arc::new(ScriptCompiler::default()), Arc::new(RecordingApi::default()))
}

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_test_writer()
		.with_max_level(tracing::Level::TRACE)
		.try_init();
}
