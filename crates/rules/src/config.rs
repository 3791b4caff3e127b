//! Editor and controller API configuration.
//!
//! Loaded from TOML; every key is optional.
//!
//! ```toml
//! [editor]
//! debounce_ms = 100
//! banner_ms = 1500
//!
//! [api]
//! base_url = "http://localhost:4000/api"
//! token = "..."
//! timeout_ms = 10000
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::compiler::COMPILE_DEBOUNCE;
use crate::error::{ConfigError, Result};
use crate::persist::SAVE_BANNER;

/// Default controller API root.
pub const DEFAULT_BASE_URL: &str = "http://localhost:4000/api";

/// Default controller request timeout.
pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RulesConfig {
	pub editor: EditorConfig,
	pub api: ApiConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
	pub debounce_ms: u64,
	pub banner_ms: u64,
}

impl Default for EditorConfig {
	fn default() -> Self {
		Self {
			debounce_ms: COMPILE_DEBOUNCE.as_millis() as u64,
			banner_ms: SAVE_BANNER.as_millis() as u64,
		}
	}
}

impl EditorConfig {
	pub fn debounce(&self) -> Duration {
		Duration::from_millis(self.debounce_ms)
	}

	pub fn banner(&self) -> Duration {
		Duration::from_millis(self.banner_ms)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
	pub base_url: String,
	pub token: Option<String>,
	pub timeout_ms: u64,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			base_url: DEFAULT_BASE_URL.to_string(),
			token: None,
			timeout_ms: DEFAULT_API_TIMEOUT.as_millis() as u64,
		}
	}
}

impl ApiConfig {
	pub fn timeout(&self) -> Duration {
		Duration::from_millis(self.timeout_ms)
	}
}

impl RulesConfig {
	pub fn from_toml_str(s: &str) -> Result<Self> {
		let config: Self = toml::from_str(s)?;
		config.validate()?;
		Ok(config)
	}

	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&text)
	}

	fn validate(&self) -> Result<()> {
		if self.editor.debounce_ms == 0 {
			return Err(ConfigError::Invalid("editor.debounce_ms must be positive".into()));
		}
		if self.editor.banner_ms == 0 {
			return Err(ConfigError::Invalid("editor.banner_ms must be positive".into()));
		}
		if self.api.timeout_ms == 0 {
			return Err(ConfigError::Invalid("api.timeout_ms must be positive".into()));
		}
		if self.api.base_url.trim().is_empty() {
			return Err(ConfigError::Invalid("api.base_url must not be empty".into()));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use super::*;

	#[test]
	fn empty_document_uses_defaults() {
		let config = RulesConfig::from_toml_str("").unwrap();
		assert_eq!(config, RulesConfig::default());
		assert_eq!(config.editor.debounce(), Duration::from_millis(100));
		assert_eq!(config.editor.banner(), Duration::from_millis(1500));
		assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
	}

	#[test]
	fn partial_sections_keep_other_defaults() {
		let config = RulesConfig::from_toml_str(
			r#"
[editor]
debounce_ms = 250

[api]
token = "secret"
"#,
		)
		.unwrap();
		assert_eq!(config.editor.debounce_ms, 250);
		assert_eq!(config.editor.banner_ms, 1500);
		assert_eq!(config.api.token.as_deref(), Some("secret"));
		assert_eq!(config.api.timeout(), DEFAULT_API_TIMEOUT);
	}

	#[test]
	fn zero_debounce_is_rejected() {
		let err = RulesConfig::from_toml_str("[editor]\ndebounce_ms = 0\n").unwrap_err();
		assert!(matches!(err, ConfigError::Invalid(_)));
	}

	#[test]
	fn unknown_keys_are_rejected() {
		let err = RulesConfig::from_toml_str("[editor]\ndebounse_ms = 10\n").unwrap_err();
		assert!(matches!(err, ConfigError::Parse(_)));
	}

	#[test]
	fn load_reads_file_and_reports_missing_path() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[api]\nbase_url = \"https://zt.example/api\"").unwrap();

		let config = RulesConfig::load(file.path()).unwrap();
		assert_eq!(config.api.base_url, "https://zt.example/api");

		let missing = file.path().with_extension("missing");
		assert!(matches!(RulesConfig::load(&missing), Err(ConfigError::Io { .. })));
	}
}
