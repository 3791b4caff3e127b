//! Flow-rule editor core for the ZeroUI controller front end.
//!
//! Keeps three things in step for one open rule editor: the operator's rule
//! script, the structured `{rules, capabilities, tags}` config compiled from
//! it, and the `capabilitiesByName`/`tagsByName` tables derived from that
//! config. Compiles are debounced; a failed compile leaves the last good
//! config in place and blocks saving until the script compiles again.
//!
//! The rule compiler and the controller API are collaborators behind
//! [`RuleCompiler`] and [`NetworkApi`]; this crate performs no I/O itself.

pub mod buffer;
pub mod compiler;
pub mod config;
pub mod diagnostics;
pub mod error;
mod msg;
pub mod network;
pub mod persist;
pub mod session;
pub mod store;
mod timer;
pub mod types;

pub use compiler::{CompileOutcome, CompiledRules, RuleCompiler};
pub use config::{ApiConfig, EditorConfig, RulesConfig};
pub use error::{ApiError, ConfigError, SeedError, SubmitError};
pub use network::{NetworkDocument, NetworkSeed};
pub use persist::{NetworkApi, NetworkId, SaveAck, SavePayload};
pub use session::{RuleEditorSession, SaveAction, SessionEvent, SessionState};
pub use store::{ConfigSnapshot, ConfigStore};
pub use types::{Capability, Diagnostic, FlowConfig, NameIndex, Rule, Tag, TagRef};
