use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::time::Instant;

use super::*;
use crate::compiler::{CompileOutcome, CompiledRules};
use crate::persist::SavePayload;
use crate::types::{Capability, Rule};

/// `ok` compiles to one rule with capability `A`; anything else fails at line 1.
fn toy_compiler() -> Arc<dyn RuleCompiler> {
	Arc::new(|src: &str| {
		if src.trim() == "ok" {
			let mut compiled = CompiledRules {
				rules: vec![Rule::new(json!({ "type": "ACTION_ACCEPT" }))],
				..Default::default()
			};
			compiled.capabilities.insert("A".into(), Capability::new(1, "A"));
			CompileOutcome::Success(compiled)
		} else {
			CompileOutcome::Failure(Diagnostic::new(1, 1, "unexpected token"))
		}
	})
}

#[derive(Default)]
struct FakeApi {
	saved: Mutex<Vec<(NetworkId, SavePayload)>>,
	fail_with: Mutex<Option<ApiError>>,
}

#[async_trait]
impl NetworkApi for FakeApi {
	async fn save(&self, network_id: &NetworkId, payload: &SavePayload) -> Result<SaveAck, ApiError> {
		self.saved.lock().push((network_id.clone(), payload.clone()));
		match self.fail_with.lock().clone() {
			Some(err) => Err(err),
			None => Ok(SaveAck {
				network_id: network_id.clone(),
			}),
		}
	}
}

fn open(api: Arc<FakeApi>) -> RuleEditorSession {
	RuleEditorSession::new(
		NetworkSeed::empty(NetworkId::new("net1")),
		toy_compiler(),
		api,
		&EditorConfig::default(),
	)
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn seeded_session_starts_editing_without_diagnostic() {
	let mut session = open(Arc::new(FakeApi::default()));
	assert_eq!(session.state(), SessionState::Editing { diagnostic: false });
	assert_eq!(session.action(), SaveAction::Save);
	assert_eq!(session.value(), "");
	assert!(!session.compile_pending());
	assert_eq!(session.next_event().await, None);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn compile_lags_edit_by_one_window() {
	let mut session = open(Arc::new(FakeApi::default()));
	let start = Instant::now();

	session.edit("ok");
	assert_eq!(session.value(), "ok");
	assert!(session.drain().is_empty());
	assert!(session.snapshot().config.rules.is_empty());

	let event = session.next_event().await;
	assert!(matches!(event, Some(SessionEvent::Compiled(_))));
	assert!(start.elapsed() >= Duration::from_millis(100));
	assert_eq!(session.snapshot().index.capabilities_by_name["A"], 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn failure_keeps_last_good_snapshot() {
	let mut session = open(Arc::new(FakeApi::default()));
	session.edit("ok");
	session.next_event().await;
	let good = session.snapshot();

	session.edit("ok\n  garbage");
	let event = session.next_event().await;

	assert_eq!(event, Some(SessionEvent::CompileFailed(Diagnostic::new(1, 1, "unexpected token"))));
	assert!(Arc::ptr_eq(&good, &session.snapshot()));
	assert_eq!(session.state(), SessionState::Editing { diagnostic: true });
	assert_eq!(session.action(), SaveAction::Diagnostic("[1:1] unexpected token".into()));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn submit_refused_while_diagnostic_present() {
	let api = Arc::new(FakeApi::default());
	let mut session = open(api.clone());
	session.edit("nope");
	session.next_event().await;

	let err = session.submit().unwrap_err();
	assert_eq!(err, SubmitError::DiagnosticPending(Diagnostic::new(1, 1, "unexpected token")));
	assert!(api.saved.lock().is_empty());
	assert_eq!(session.next_event().await, None);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn second_submit_while_in_flight_is_refused() {
	let api = Arc::new(FakeApi::default());
	let mut session = open(api.clone());

	session.submit().unwrap();
	assert_eq!(session.state(), SessionState::Submitting);
	assert_eq!(session.submit(), Err(SubmitError::AlreadySubmitting));

	let event = session.next_event().await;
	assert!(matches!(event, Some(SessionEvent::Saved(_))));
	assert_eq!(api.saved.lock().len(), 1);
	assert_eq!(session.state(), SessionState::Editing { diagnostic: false });
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn submit_during_debounce_sends_live_text_with_last_compiled_config() {
	let api = Arc::new(FakeApi::default());
	let mut session = open(api.clone());
	session.edit("ok");
	session.next_event().await;

	session.edit("ok\n# not compiled yet");
	assert!(session.compile_pending());
	session.submit().unwrap();

	let saved = loop {
		if let Some(SessionEvent::Saved(ack)) = session.next_event().await {
			break ack;
		}
	};
	assert_eq!(saved.network_id, NetworkId::new("net1"));

	let (_, payload) = api.saved.lock()[0].clone();
	assert_eq!(payload.rules_source, "ok\n# not compiled yet");
	assert_eq!(payload.config.rules.len(), 1);
	assert_eq!(payload.capabilities_by_name["A"], 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn banner_shows_after_ack_and_dismisses() {
	let api = Arc::new(FakeApi::default());
	let calls = Arc::new(AtomicUsize::new(0));
	let seen = calls.clone();
	let mut session = open(api).on_saved(move |ack| {
		assert_eq!(ack.network_id.as_str(), "net1");
		seen.fetch_add(1, Ordering::SeqCst);
	});

	session.submit().unwrap();
	assert!(matches!(session.next_event().await, Some(SessionEvent::Saved(_))));
	assert!(session.banner_visible());
	assert_eq!(calls.load(Ordering::SeqCst), 1);

	let shown_at = Instant::now();
	assert_eq!(session.next_event().await, Some(SessionEvent::BannerDismissed));
	assert!(shown_at.elapsed() >= Duration::from_millis(1500));
	assert!(!session.banner_visible());
	assert_eq!(session.next_event().await, None);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn save_failure_is_surfaced_without_callback() {
	let api = Arc::new(FakeApi::default());
	*api.fail_with.lock() = Some(ApiError::Status {
		status: 500,
		body: "boom".into(),
	});
	let calls = Arc::new(AtomicUsize::new(0));
	let seen = calls.clone();
	let mut session = open(api.clone()).on_saved(move |_| {
		seen.fetch_add(1, Ordering::SeqCst);
	});

	session.submit().unwrap();
	let event = session.next_event().await;

	assert_eq!(
		event,
		Some(SessionEvent::SaveFailed(ApiError::Status {
			status: 500,
			body: "boom".into()
		}))
	);
	assert_eq!(calls.load(Ordering::SeqCst), 0);
	assert!(!session.banner_visible());
	assert_eq!(session.state(), SessionState::Editing { diagnostic: false });

	// No automatic retry.
	assert_eq!(session.next_event().await, None);
	assert_eq!(api.saved.lock().len(), 1);
}

struct PanickingApi;

#[async_trait]
impl NetworkApi for PanickingApi {
	async fn save(&self, _: &NetworkId, _: &SavePayload) -> Result<SaveAck, ApiError> {
		panic!("controller client blew up");
	}
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn panicking_api_releases_the_gate() {
	let mut session = RuleEditorSession::new(
		NetworkSeed::empty(NetworkId::new("net1")),
		toy_compiler(),
		Arc::new(PanickingApi),
		&EditorConfig::default(),
	);

	session.submit().unwrap();
	assert_eq!(session.state(), SessionState::Submitting);

	match session.next_event().await {
		Some(SessionEvent::SaveFailed(ApiError::Transport(msg))) => assert!(msg.contains("panicked"), "{msg}"),
		other => panic!("expected a transport failure, got {other:?}"),
	}
	assert_eq!(session.state(), SessionState::Editing { diagnostic: false });
	assert_eq!(session.next_event().await, None);

	// The gate is open again.
	session.submit().unwrap();
	assert!(matches!(session.next_event().await, Some(SessionEvent::SaveFailed(_))));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn preview_renders_current_config() {
	let mut session = open(Arc::new(FakeApi::default()));
	session.edit("ok");
	session.next_event().await;

	let preview = session.preview().unwrap();
	let parsed: serde_json::Value = serde_json::from_str(&preview).unwrap();
	assert_eq!(
		parsed,
		json!({
			"rules": [{ "type": "ACTION_ACCEPT" }],
			"capabilities": [{ "id": 1, "name": "A" }],
			"tags": [],
		})
	);
	assert!(preview.contains("\n  \"rules\""));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn store_handle_observes_replacements() {
	let mut session = open(Arc::new(FakeApi::default()));
	let store = session.store();

	session.edit("ok");
	session.next_event().await;

	assert_eq!(store.load().config.capabilities, vec![Capability::new(1, "A")]);
}
