//! Session message bus.
//!
//! Timers and save tasks never touch session state directly; they post a
//! [`SessionMsg`] and the session applies it when it drains the bus.

use tokio::sync::mpsc;

use crate::error::ApiError;
use crate::persist::SaveAck;

pub(crate) type MsgSender = mpsc::UnboundedSender<SessionMsg>;
pub(crate) type MsgReceiver = mpsc::UnboundedReceiver<SessionMsg>;

pub(crate) fn channel() -> (MsgSender, MsgReceiver) {
	mpsc::unbounded_channel()
}

#[derive(Debug)]
pub(crate) enum SessionMsg {
	/// Debounce window elapsed for the edit armed with `token`.
	CompileDue { token: u64 },
	/// The persistence call returned.
	SaveDone { result: Result<SaveAck, ApiError> },
	/// Success banner lifetime elapsed.
	BannerExpired { token: u64 },
}
