//! Persistence gate.
//!
//! Builds the save payload from the current store snapshot and the live buffer
//! text, hands it to a [`NetworkApi`], and runs the success banner.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::diagnostics::DiagnosticStore;
use crate::error::{ApiError, SubmitError};
use crate::msg::{MsgSender, SessionMsg};
use crate::store::ConfigSnapshot;
use crate::timer::SingleTimer;
use crate::types::{FlowConfig, TagRef};

/// How long the "Saved" banner stays up.
pub const SAVE_BANNER: Duration = Duration::from_millis(1500);

/// Controller network identifier (`config.id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(pub String);

impl NetworkId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for NetworkId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Body of `POST /network/{networkId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePayload {
	pub config: FlowConfig,
	/// Buffer text at submission time, which may be newer than `config`.
	pub rules_source: String,
	pub tags_by_name: IndexMap<String, TagRef>,
	pub capabilities_by_name: IndexMap<String, u64>,
}

impl SavePayload {
	pub fn new(snapshot: &ConfigSnapshot, rules_source: impl Into<String>) -> Self {
		Self {
			config: snapshot.config.clone(),
			rules_source: rules_source.into(),
			tags_by_name: snapshot.index.tags_by_name.clone(),
			capabilities_by_name: snapshot.index.capabilities_by_name.clone(),
		}
	}
}

/// Controller acknowledgment of a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveAck {
	pub network_id: NetworkId,
}

/// Network configuration write API.
#[async_trait]
pub trait NetworkApi: Send + Sync {
	async fn save(&self, network_id: &NetworkId, payload: &SavePayload) -> Result<SaveAck, ApiError>;
}

/// Invoked after every acknowledged save, typically to refresh the network view.
pub type SaveCallback = Box<dyn FnMut(&SaveAck) + Send>;

/// Submits payloads and tracks the in-flight save and success banner.
pub(crate) struct PersistenceGate {
	api: Arc<dyn NetworkApi>,
	network_id: NetworkId,
	in_flight: bool,
	banner: SingleTimer,
	banner_window: Duration,
	banner_visible: bool,
	on_saved: Option<SaveCallback>,
}

impl fmt::Debug for PersistenceGate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PersistenceGate")
			.field("network_id", &self.network_id)
			.field("in_flight", &self.in_flight)
			.field("banner_visible", &self.banner_visible)
			.finish()
	}
}

impl PersistenceGate {
	pub fn new(api: Arc<dyn NetworkApi>, network_id: NetworkId, banner_window: Duration) -> Self {
		Self {
			api,
			network_id,
			in_flight: false,
			banner: SingleTimer::default(),
			banner_window,
			banner_visible: false,
			on_saved: None,
		}
	}

	pub(crate) fn set_on_saved(&mut self, callback: SaveCallback) {
		self.on_saved = Some(callback);
	}

	/// Starts a save of `snapshot` plus `source`. Spawns onto the current
	/// Tokio runtime.
	///
	/// The payload is fixed here; compiles landing while the request is in
	/// flight do not change what is sent.
	pub(crate) fn submit(
		&mut self,
		diagnostics: &DiagnosticStore,
		snapshot: &ConfigSnapshot,
		source: &str,
		tx: &MsgSender,
	) -> Result<(), SubmitError> {
		if let Some(diag) = diagnostics.current() {
			return Err(SubmitError::DiagnosticPending(diag.clone()));
		}
		if self.in_flight {
			return Err(SubmitError::AlreadySubmitting);
		}

		let payload = SavePayload::new(snapshot, source);
		debug!(
			network = %self.network_id,
			rules = payload.config.rules.len(),
			source_bytes = payload.rules_source.len(),
			"rules.persist.save_start"
		);

		self.in_flight = true;
		let api = self.api.clone();
		let network_id = self.network_id.clone();
		let tx = tx.clone();
		let save = tokio::spawn(async move { api.save(&network_id, &payload).await });
		tokio::spawn(async move {
			// A panicking API must still release the gate.
			let result = save
				.await
				.unwrap_or_else(|err| Err(ApiError::Transport(format!("save task failed: {err}"))));
			let _ = tx.send(SessionMsg::SaveDone { result });
		});
		Ok(())
	}

	/// Applies a finished save. On success the callback runs and the banner is
	/// (re)armed.
	pub(crate) fn complete(&mut self, result: &Result<SaveAck, ApiError>, tx: &MsgSender) {
		self.in_flight = false;
		match result {
			Ok(ack) => {
				debug!(network = %ack.network_id, "rules.persist.save_done");
				if let Some(callback) = self.on_saved.as_mut() {
					callback(ack);
				}
				self.banner_visible = true;
				self.banner
					.arm(self.banner_window, tx, |token| SessionMsg::BannerExpired { token });
			}
			Err(err) => {
				warn!(network = %self.network_id, error = %err, "rules.persist.save_failed");
			}
		}
	}

	/// Hides the banner if `token` belongs to the latest arm.
	pub(crate) fn banner_expired(&mut self, token: u64) -> bool {
		if !self.banner.settle(token) {
			return false;
		}
		self.banner_visible = false;
		true
	}

	pub fn network_id(&self) -> &NetworkId {
		&self.network_id
	}

	pub fn is_in_flight(&self) -> bool {
		self.in_flight
	}

	pub fn banner_visible(&self) -> bool {
		self.banner_visible
	}

	pub(crate) fn has_outstanding(&self) -> bool {
		self.in_flight || self.banner.is_armed()
	}

	pub(crate) fn shutdown(&mut self) {
		self.banner.cancel();
		self.banner_visible = false;
	}
}
