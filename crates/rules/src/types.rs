//! Structured flow configuration produced by the rule compiler.
//!
//! Everything here is plain data with the JSON shape the controller API
//! speaks: `config.{rules,capabilities,tags}` plus the `capabilitiesByName`
//! and `tagsByName` lookup tables.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Compiled flow rule. Opaque to the editor; order within a rule list is significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rule(pub Value);

impl Rule {
	pub fn new(value: impl Into<Value>) -> Self {
		Self(value.into())
	}
}

/// Named capability referenced by rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capability {
	pub id: u64,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub name: String,
	/// Remaining compiler fields (`rules`, `default`, ...), carried verbatim.
	#[serde(flatten)]
	pub fields: Map<String, Value>,
}

impl Capability {
	pub fn new(id: u64, name: impl Into<String>) -> Self {
		Self {
			id,
			name: name.into(),
			fields: Map::new(),
		}
	}
}

/// Named tag with a default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
	pub id: u64,
	#[serde(rename = "default", default)]
	pub default_value: Value,
	#[serde(default, skip_serializing_if = "String::is_empty")]
	pub name: String,
}

impl Tag {
	pub fn new(id: u64, name: impl Into<String>, default_value: impl Into<Value>) -> Self {
		Self {
			id,
			default_value: default_value.into(),
			name: name.into(),
		}
	}
}

/// The `{rules, capabilities, tags}` triple sent as `config`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowConfig {
	#[serde(default)]
	pub rules: Vec<Rule>,
	#[serde(default)]
	pub capabilities: Vec<Capability>,
	#[serde(default)]
	pub tags: Vec<Tag>,
}

/// `tagsByName` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRef {
	pub id: u64,
	#[serde(rename = "default", default)]
	pub default_value: Value,
}

/// Name lookup tables derived from a [`FlowConfig`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameIndex {
	#[serde(default)]
	pub capabilities_by_name: IndexMap<String, u64>,
	#[serde(default)]
	pub tags_by_name: IndexMap<String, TagRef>,
}

impl NameIndex {
	/// Rebuilds both tables from the capability and tag sequences.
	///
	/// A later entry with a duplicate name overwrites an earlier one.
	pub fn derive(capabilities: &[Capability], tags: &[Tag]) -> Self {
		let capabilities_by_name = capabilities
			.iter()
			.map(|cap| (cap.name.clone(), cap.id))
			.collect();
		let tags_by_name = tags
			.iter()
			.map(|tag| {
				(
					tag.name.clone(),
					TagRef {
						id: tag.id,
						default_value: tag.default_value.clone(),
					},
				)
			})
			.collect();
		Self {
			capabilities_by_name,
			tags_by_name,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.capabilities_by_name.is_empty() && self.tags_by_name.is_empty()
	}
}

/// Single compile failure, serialized as the `[line, column, message]` triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u32, u32, String)", into = "(u32, u32, String)")]
pub struct Diagnostic {
	pub line: u32,
	pub column: u32,
	pub message: String,
}

impl Diagnostic {
	pub fn new(line: u32, column: u32, message: impl Into<String>) -> Self {
		Self {
			line,
			column,
			message: message.into(),
		}
	}
}

impl From<(u32, u32, String)> for Diagnostic {
	fn from((line, column, message): (u32, u32, String)) -> Self {
		Self { line, column, message }
	}
}

impl From<Diagnostic> for (u32, u32, String) {
	fn from(diag: Diagnostic) -> Self {
		(diag.line, diag.column, diag.message)
	}
}

impl fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}:{}] {}", self.line, self.column, self.message)
	}
}
