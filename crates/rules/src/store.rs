//! Structured config store.
//!
//! The compiled config and its name index live in one immutable
//! [`ConfigSnapshot`] behind an [`ArcSwap`]. A replace publishes a new
//! snapshot in a single pointer swap, so a reader holding an `Arc` never sees
//! rules from one compile paired with a name index from another.

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;
use tracing::trace;

use crate::types::{FlowConfig, NameIndex};

/// One consistent `{config, index}` pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigSnapshot {
	pub config: FlowConfig,
	pub index: NameIndex,
}

impl ConfigSnapshot {
	/// Builds a snapshot whose index is derived from `config`.
	pub fn derived(config: FlowConfig) -> Self {
		let index = NameIndex::derive(&config.capabilities, &config.tags);
		Self { config, index }
	}
}

/// Shared, read-mostly holder of the current [`ConfigSnapshot`].
///
/// Only the session's compile-success path writes; previews and the save
/// path read.
#[derive(Debug, Default)]
pub struct ConfigStore {
	snap: ArcSwap<ConfigSnapshot>,
}

impl ConfigStore {
	/// Seeds the store with server data as-is. The server index is trusted
	/// rather than re-derived.
	pub fn seeded(config: FlowConfig, index: NameIndex) -> Self {
		Self {
			snap: ArcSwap::from_pointee(ConfigSnapshot { config, index }),
		}
	}

	/// Publishes a freshly compiled config together with its derived index.
	pub fn replace(&self, config: FlowConfig) -> Arc<ConfigSnapshot> {
		let next = Arc::new(ConfigSnapshot::derived(config));
		trace!(
			rules = next.config.rules.len(),
			capabilities = next.index.capabilities_by_name.len(),
			tags = next.index.tags_by_name.len(),
			"rules.store.replace"
		);
		self.snap.store(next.clone());
		next
	}

	#[inline]
	pub fn load(&self) -> Arc<ConfigSnapshot> {
		self.snap.load_full()
	}
}
