//! Pluggable tracing of command/reply exchanges.
//!
//! A session only reports to its observer when `SessionConfig::verbose` is
//! set. The default [`TracingObserver`] forwards to `tracing`; harnesses that
//! want to assert on or dump the conversation can install a
//! [`TranscriptObserver`].

use parking_lot::Mutex;
use tracing::info;

use crate::error::Error;

/// Receives every command before it is written and its outcome after.
pub trait CommandObserver: Send + Sync {
	fn on_command(&self, peer: &str, command: &str);

	fn on_reply(&self, peer: &str, command: &str, outcome: Result<&str, &Error>);
}

/// Emits `info` events on the `art.session` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl CommandObserver for TracingObserver {
	fn on_command(&self, peer: &str, command: &str) {
		info!(target: "art.session", %peer, "--> {command}");
	}

	fn on_reply(&self, peer: &str, _command: &str, outcome: Result<&str, &Error>) {
		match outcome {
			Ok(payload) => info!(target: "art.session", %peer, "<-- OK {payload}"),
			Err(Error::Remote { message, .. }) => {
				info!(target: "art.session", %peer, "<-- ERROR {message}")
			}
			Err(err) => info!(target: "art.session", %peer, error = %err, "<-- failed"),
		}
	}
}

/// Records the conversation as `-->` / `<--` lines.
#[derive(Debug, Default)]
pub struct TranscriptObserver {
	lines: Mutex<Vec<String>>,
}

impl TranscriptObserver {
	pub fn new() -> Self {
		Self::default()
	}

	/// Snapshot of the recorded lines.
	pub fn lines(&self) -> Vec<String> {
		self.lines.lock().clone()
	}

	/// Only the commands, in the order they were sent.
	pub fn commands(&self) -> Vec<String> {
		self.lines
			.lock()
			.iter()
			.filter_map(|l| l.strip_prefix("--> ").map(str::to_string))
			.collect()
	}

	pub fn clear(&self) {
		self.lines.lock().clear();
	}
}

impl CommandObserver for TranscriptObserver {
	fn on_command(&self, _peer: &str, command: &str) {
		self.lines.lock().push(format!("--> {command}"));
	}

	fn on_reply(&self, _peer: &str, _command: &str, outcome: Result<&str, &Error>) {
		let line = match outcome {
			Ok(payload) => format!("<-- OK {payload}"),
			Err(Error::Remote { message, .. }) => format!("<-- ERROR {message}"),
			Err(err) => format!("<-- failed: {err}"),
		};
		self.lines.lock().push(line);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn transcript_records_both_directions() {
		let t = TranscriptObserver::new();
		t.on_command("n1", "ENABLE a");
		t.on_reply("n1", "ENABLE a", Ok("enabled"));
		t.on_command("n1", "ENABLE b");
		let err = Error::Remote {
			command: "ENABLE b".into(),
			message: "no such actor".into(),
		};
		t.on_reply("n1", "ENABLE b", Err(&err));

		assert_eq!(
			t.lines(),
			vec![
				"--> ENABLE a",
				"<-- OK enabled",
				"--> ENABLE b",
				"<-- ERROR no such actor",
			]
		);
		assert_eq!(t.commands(), vec!["ENABLE a", "ENABLE b"]);
	}
}
