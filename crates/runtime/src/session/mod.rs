//! Control session with one art node.
//!
//! A [`Session`] owns a single stream connection and exchanges exactly one
//! command line for exactly one reply line at a time.
//!
//! # Message Flow
//!
//! 1. `open()` dials the node and reads the unsolicited greeting line
//! 2. `ADDRESS` is queried once to learn how other nodes reach this one
//! 3. Each `execute()` locks the stream, writes the command, reads the reply
//! 4. `OK <payload>` yields the payload, `ERROR <message>` becomes
//!    [`Error::Remote`], anything else [`Error::ProtocolError`]

use std::fmt;

use art_protocol::{Command, Greeting, Reply};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::transport::{ControlStream, LineTransport};

/// Name used for the greeting in error messages; it has no command line.
const GREETING: &str = "<greeting>";

/// One control connection to a node.
///
/// Share it behind an `Arc`; concurrent callers are serialized so only one
/// command is ever outstanding.
pub struct Session {
	peer: String,
	address: String,
	greeting: Greeting,
	config: SessionConfig,
	transport: Mutex<LineTransport>,
}

impl Session {
	/// Connects to `address` (`host:port`) and performs the handshake.
	///
	/// # Errors
	///
	/// - [`Error::ConnectionFailed`] if the TCP connection cannot be made
	/// - [`Error::Timeout`] if `connect_timeout` elapses
	/// - any error of [`Session::from_stream`]
	pub async fn open(address: &str, config: SessionConfig) -> Result<Self> {
		debug!(target: "art.session", %address, "connecting to node");
		let connect = TcpStream::connect(address);
		let connected = match config.connect_timeout {
			Some(limit) => tokio::time::timeout(limit, connect).await.map_err(|_| {
				Error::Timeout(format!("connecting to {address} took longer than {limit:?}"))
			})?,
			None => connect.await,
		};
		let stream = connected.map_err(|source| Error::ConnectionFailed {
			address: address.to_string(),
			source,
		})?;
		stream.set_nodelay(true)?;

		Self::from_stream(stream, address, config).await
	}

	/// Runs the handshake over an already-connected stream.
	///
	/// The stream is dropped (and so closed) if any step fails.
	pub async fn from_stream<S>(
		stream: S,
		peer: impl Into<String>,
		config: SessionConfig,
	) -> Result<Self>
	where
		S: ControlStream + 'static,
	{
		let peer = peer.into();
		let mut transport = LineTransport::new(stream, config.read_timeout);

		let line = transport.read_line().await?;
		let greeting = match Reply::parse(&line)? {
			Reply::Ok(payload) => Greeting::parse(&payload),
			Reply::Error(message) => {
				return Err(Error::Remote {
					command: GREETING.to_string(),
					message,
				});
			}
		};
		debug!(target: "art.session", %peer, greeting = %greeting.raw, "node greeted");

		if let Some(expected) = &config.expected_version {
			if greeting.version.as_deref() != Some(expected.as_str()) {
				return Err(Error::ProtocolError(format!(
					"node at {peer} speaks {:?}, expected version {expected}",
					greeting.raw
				)));
			}
		}

		let payload = exchange(&mut transport, &config, &peer, &Command::Address.to_string()).await?;
		let address = resolve_address(&peer, &payload, &config);
		debug!(target: "art.session", %peer, %address, "node address resolved");

		Ok(Self {
			peer,
			address,
			greeting,
			config,
			transport: Mutex::new(transport),
		})
	}

	/// Sends one raw command line and returns the reply payload.
	///
	/// `command` must not contain a newline; use [`Session::send`] for
	/// validated, typed commands.
	pub async fn execute(&self, command: &str) -> Result<String> {
		if command.contains(['\n', '\r']) {
			return Err(Error::InvalidArgument(format!(
				"command must be a single line: {command:?}"
			)));
		}
		let mut transport = self.transport.lock().await;
		exchange(&mut transport, &self.config, &self.peer, command).await
	}

	/// Validates and sends a typed command.
	pub async fn send(&self, command: Command<'_>) -> Result<String> {
		command.validate()?;
		self.execute(&command.to_string()).await
	}

	/// Address this session dialed.
	pub fn peer(&self) -> &str {
		&self.peer
	}

	/// Address other nodes use to reach this node.
	pub fn address(&self) -> &str {
		&self.address
	}

	pub fn greeting(&self) -> &Greeting {
		&self.greeting
	}

	pub fn config(&self) -> &SessionConfig {
		&self.config
	}
}

impl fmt::Debug for Session {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Session")
			.field("peer", &self.peer)
			.field("address", &self.address)
			.field("greeting", &self.greeting.raw)
			.finish_non_exhaustive()
	}
}

async fn exchange(
	transport: &mut LineTransport,
	config: &SessionConfig,
	peer: &str,
	command: &str,
) -> Result<String> {
	if config.verbose {
		config.observer.on_command(peer, command);
	}
	debug!(target: "art.session", %peer, %command, "sending command");

	let outcome = round_trip(transport, command).await;

	if config.verbose {
		config.observer.on_reply(peer, command, outcome.as_deref());
	}
	if let Err(err) = &outcome {
		debug!(target: "art.session", %peer, %command, error = %err, "command failed");
	}
	outcome
}

async fn round_trip(transport: &mut LineTransport, command: &str) -> Result<String> {
	transport.send_line(command).await?;
	let line = transport.read_line().await?;
	match Reply::parse(&line)? {
		Reply::Ok(payload) => Ok(payload),
		Reply::Error(message) => Err(Error::Remote {
			command: command.to_string(),
			message,
		}),
	}
}

/// Picks the address peers should dial: explicit override, then the first
/// address the node reports, then the host we dialed ourselves.
fn resolve_address(peer: &str, payload: &str, config: &SessionConfig) -> String {
	if let Some(advertised) = &config.advertised_address {
		return advertised.clone();
	}
	if let Some(reported) = payload.split_whitespace().next() {
		return reported.to_string();
	}
	let host = peer_host(peer);
	warn!(
		target: "art.session",
		%peer,
		%host,
		"node reported no external address; using the dialed host"
	);
	host.to_string()
}

/// Host part of `host:port`. IPv6 literals keep their brackets so the host
/// can be joined with another port later.
fn peer_host(peer: &str) -> &str {
	if peer.starts_with('[') {
		return match peer.find(']') {
			Some(end) => &peer[..=end],
			None => peer,
		};
	}
	match peer.rsplit_once(':') {
		// More than one ':' without brackets is a bare IPv6 literal, not a port.
		Some((host, port)) if !host.contains(':') && port.chars().all(|c| c.is_ascii_digit()) => {
			host
		}
		_ => peer,
	}
}
