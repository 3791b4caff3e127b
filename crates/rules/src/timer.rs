//! Single reschedulable timer posting into the session bus.

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::msg::{MsgSender, SessionMsg};

struct Armed {
	token: u64,
	handle: JoinHandle<()>,
}

/// At most one outstanding deferred message; re-arming aborts the previous one.
///
/// A fired message carries the token it was armed with. Only the token of the
/// latest arm settles, so a message already queued by an aborted timer is
/// recognised as stale and dropped by the receiver.
#[derive(Default)]
pub(crate) struct SingleTimer {
	seq: u64,
	armed: Option<Armed>,
}

impl SingleTimer {
	/// Arms the timer, replacing any outstanding one, and returns its token.
	pub(crate) fn arm(&mut self, delay: Duration, tx: &MsgSender, msg: fn(u64) -> SessionMsg) -> u64 {
		self.cancel();
		self.seq = self.seq.wrapping_add(1);
		let token = self.seq;
		let tx = tx.clone();
		let handle = tokio::spawn(async move {
			tokio::time::sleep(delay).await;
			let _ = tx.send(msg(token));
		});
		self.armed = Some(Armed { token, handle });
		token
	}

	/// Consumes the armed state if `token` is current.
	pub(crate) fn settle(&mut self, token: u64) -> bool {
		match self.armed {
			Some(ref armed) if armed.token == token => {
				self.armed = None;
				true
			}
			_ => false,
		}
	}

	pub(crate) fn cancel(&mut self) {
		if let Some(armed) = self.armed.take() {
			armed.handle.abort();
		}
	}

	pub(crate) fn is_armed(&self) -> bool {
		self.armed.is_some()
	}
}

impl Drop for SingleTimer {
	fn drop(&mut self) {
		self.cancel();
	}
}
