use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::observer::{CommandObserver, TracingObserver};

/// Per-session settings.
///
/// Defaults reproduce the plain protocol behavior: no timeouts, no version
/// check, node-reported address, every link negotiated through `LISTEN`.
#[derive(Clone)]
pub struct SessionConfig {
	/// Report every command and reply to the observer.
	pub verbose: bool,
	/// Upper bound for establishing the TCP connection.
	pub connect_timeout: Option<Duration>,
	/// Upper bound for each reply line. A timed-out session is unusable afterwards.
	pub read_timeout: Option<Duration>,
	/// Required greeting version (e.g. `"1.0"`); mismatches fail the open.
	pub expected_version: Option<String>,
	/// Address peers should use to reach this node, overriding `ADDRESS`.
	pub advertised_address: Option<String>,
	/// Use single-command `CONNECT a.p b.q` for links within this node.
	///
	/// Off by default: not every node build accepts local references.
	pub local_links: bool,
	/// Receiver of verbose command traces.
	pub observer: Arc<dyn CommandObserver>,
}

impl Default for SessionConfig {
	fn default() -> Self {
		Self {
			verbose: false,
			connect_timeout: None,
			read_timeout: None,
			expected_version: None,
			advertised_address: None,
			local_links: false,
			observer: Arc::new(TracingObserver),
		}
	}
}

impl SessionConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn verbose(mut self, verbose: bool) -> Self {
		self.verbose = verbose;
		self
	}

	pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
		self.connect_timeout = Some(timeout);
		self
	}

	pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
		self.read_timeout = Some(timeout);
		self
	}

	pub fn with_expected_version(mut self, version: impl Into<String>) -> Self {
		self.expected_version = Some(version.into());
		self
	}

	pub fn with_advertised_address(mut self, address: impl Into<String>) -> Self {
		self.advertised_address = Some(address.into());
		self
	}

	pub fn with_local_links(mut self, enabled: bool) -> Self {
		self.local_links = enabled;
		self
	}

	pub fn with_observer(mut self, observer: Arc<dyn CommandObserver>) -> Self {
		self.observer = observer;
		self
	}
}

impl fmt::Debug for SessionConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SessionConfig")
			.field("verbose", &self.verbose)
			.field("connect_timeout", &self.connect_timeout)
			.field("read_timeout", &self.read_timeout)
			.field("expected_version", &self.expected_version)
			.field("advertised_address", &self.advertised_address)
			.field("local_links", &self.local_links)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_are_plain_protocol() {
		let cfg = SessionConfig::default();
		assert!(!cfg.verbose);
		assert!(cfg.read_timeout.is_none());
		assert!(cfg.expected_version.is_none());
		assert!(!cfg.local_links);
	}

	#[test]
	fn builder_sets_hardening_options() {
		let cfg = SessionConfig::new()
			.verbose(true)
			.with_read_timeout(Duration::from_secs(5))
			.with_expected_version("1.0");
		assert!(cfg.verbose);
		assert_eq!(cfg.read_timeout, Some(Duration::from_secs(5)));
		assert_eq!(cfg.expected_version.as_deref(), Some("1.0"));
	}
}
