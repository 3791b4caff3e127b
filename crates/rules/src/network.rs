//! Server network document used to seed an editing session.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::SeedError;
use crate::persist::NetworkId;
use crate::types::{Capability, FlowConfig, NameIndex, Rule, Tag, TagRef};

/// The parts of `GET /network/{id}` the rule editor reads.
///
/// Older controllers omit `rulesSource` and the by-name tables, or send them
/// as `null`; both read as empty.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDocument {
	pub config: NetworkConfig,
	#[serde(default)]
	pub rules_source: Option<String>,
	#[serde(default)]
	pub tags_by_name: Option<IndexMap<String, TagRef>>,
	#[serde(default)]
	pub capabilities_by_name: Option<IndexMap<String, u64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
	pub id: NetworkId,
	#[serde(default)]
	pub rules: Vec<Rule>,
	#[serde(default)]
	pub capabilities: Vec<Capability>,
	#[serde(default)]
	pub tags: Vec<Tag>,
}

impl NetworkDocument {
	pub fn from_json(json: &str) -> Result<Self, SeedError> {
		Ok(serde_json::from_str(json)?)
	}

	pub fn from_value(value: serde_json::Value) -> Result<Self, SeedError> {
		Ok(serde_json::from_value(value)?)
	}

	/// Splits the document into the pieces a session is seeded with.
	pub fn into_seed(self) -> NetworkSeed {
		NetworkSeed {
			network_id: self.config.id,
			source: self.rules_source.unwrap_or_default(),
			config: FlowConfig {
				rules: self.config.rules,
				capabilities: self.config.capabilities,
				tags: self.config.tags,
			},
			index: NameIndex {
				capabilities_by_name: self.capabilities_by_name.unwrap_or_default(),
				tags_by_name: self.tags_by_name.unwrap_or_default(),
			},
		}
	}
}

/// Initial session state, assumed consistent and not validated.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSeed {
	pub network_id: NetworkId,
	pub source: String,
	pub config: FlowConfig,
	pub index: NameIndex,
}

impl NetworkSeed {
	/// A network with no rules yet.
	pub fn empty(network_id: NetworkId) -> Self {
		Self {
			network_id,
			source: String::new(),
			config: FlowConfig::default(),
			index: NameIndex::default(),
		}
	}
}
