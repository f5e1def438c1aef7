//! [`Port`] handles and link negotiation between them.
//!
//! Links always run from an output port to an input port. Two paths exist:
//!
//! ```text
//! local (same session, local_links on)      cross (default)
//!
//!   CONNECT p.out q.in                        B: LISTEN q.in      -> OK <n>
//!                                             A: CONNECT p.out <B address>:<n>
//! ```
//!
//! The cross path touches two sessions one after another and is not atomic:
//! if `CONNECT` fails the destination stays `Listening` on the remote node.

use std::fmt;
use std::sync::Arc;

use art_protocol::{Command, Direction, Endpoint, PortCount, PortDescriptor, PortRef};
use art_runtime::{Error, Result, Session};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

/// Client-side view of a port's link.
///
/// Authoritative state lives on the node; this only records what this
/// client negotiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LinkState {
	Unconnected,
	/// `LISTEN` succeeded but no `CONNECT` has completed yet.
	Listening { port: u16 },
	/// Linked. Inputs reached over the network keep their listening port.
	Connected { listening: Option<u16> },
}

/// A named, directional endpoint of an actor.
///
/// Cheap to clone; clones share link state.
#[derive(Clone)]
pub struct Port {
	inner: Arc<PortInner>,
}

struct PortInner {
	name: String,
	actor: Arc<str>,
	direction: Direction,
	initial_count: PortCount,
	session: Arc<Session>,
	link: Mutex<LinkState>,
}

impl Port {
	pub(crate) fn from_descriptor(
		descriptor: PortDescriptor,
		actor: Arc<str>,
		session: Arc<Session>,
	) -> Self {
		Self {
			inner: Arc::new(PortInner {
				name: descriptor.name,
				actor,
				direction: descriptor.direction,
				initial_count: descriptor.count,
				session,
				link: Mutex::new(LinkState::Unconnected),
			}),
		}
	}

	pub fn name(&self) -> &str {
		&self.inner.name
	}

	/// Instance name of the owning actor.
	pub fn actor(&self) -> &str {
		&self.inner.actor
	}

	pub fn direction(&self) -> Direction {
		self.inner.direction
	}

	pub fn is_input(&self) -> bool {
		self.inner.direction == Direction::Input
	}

	pub fn is_output(&self) -> bool {
		self.inner.direction == Direction::Output
	}

	/// Count reported by `SHOW` when the actor was created.
	///
	/// Queued tokens for inputs, free slots for outputs. Use
	/// [`Actor::status`](crate::Actor::status) for live values.
	pub fn initial_count(&self) -> PortCount {
		self.inner.initial_count
	}

	pub fn session(&self) -> &Arc<Session> {
		&self.inner.session
	}

	pub fn link_state(&self) -> LinkState {
		*self.inner.link.lock()
	}

	/// Listening port allocated for this input by its node, if any.
	pub fn listening_port(&self) -> Option<u16> {
		match self.link_state() {
			LinkState::Listening { port } => Some(port),
			LinkState::Connected { listening } => listening,
			LinkState::Unconnected => None,
		}
	}

	/// `self` is the output, `input` the destination.
	pub async fn connect_to(&self, input: &Port) -> Result<()> {
		connect(self, input).await
	}

	/// `self` is the input, `output` the source.
	pub async fn connect_from(&self, output: &Port) -> Result<()> {
		connect(output, self).await
	}

	pub async fn disconnect_to(&self, input: &Port) -> Result<()> {
		disconnect(self, input).await
	}

	pub async fn disconnect_from(&self, output: &Port) -> Result<()> {
		disconnect(output, self).await
	}

	fn port_ref(&self) -> PortRef<'_> {
		PortRef::new(&self.inner.actor, &self.inner.name)
	}

	fn set_link(&self, state: LinkState) {
		*self.inner.link.lock() = state;
	}

	fn shares_session_with(&self, other: &Port) -> bool {
		Arc::ptr_eq(&self.inner.session, &other.inner.session)
	}
}

impl fmt::Display for Port {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}", self.inner.actor, self.inner.name)
	}
}

impl fmt::Debug for Port {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Port")
			.field("actor", &self.inner.actor)
			.field("name", &self.inner.name)
			.field("direction", &self.inner.direction)
			.field("link", &self.link_state())
			.finish()
	}
}

/// Links output `source` to input `destination`.
///
/// # Errors
///
/// - [`Error::InvalidArgument`] if the directions are wrong; nothing is sent
/// - [`Error::Remote`] if either node rejects a step
/// - [`Error::ProtocolError`] if `LISTEN` does not return a port number
pub async fn connect(source: &Port, destination: &Port) -> Result<()> {
	check_directions(source, destination)?;

	if uses_local_path(source, destination) {
		debug!(target: "art.port", %source, %destination, "connecting within node");
		source
			.session()
			.send(Command::ConnectLocal {
				source: source.port_ref(),
				destination: destination.port_ref(),
			})
			.await?;
		source.set_link(LinkState::Connected { listening: None });
		destination.set_link(LinkState::Connected { listening: None });
		return Ok(());
	}

	let payload = destination
		.session()
		.send(Command::Listen {
			port: destination.port_ref(),
		})
		.await?;
	let listening = parse_listening_port(&payload)?;
	destination.set_link(LinkState::Listening { port: listening });

	let host = destination.session().address();
	debug!(
		target: "art.port",
		%source,
		%destination,
		%host,
		listening,
		"input listening, connecting output"
	);
	source
		.session()
		.send(Command::ConnectRemote {
			source: source.port_ref(),
			destination: Endpoint::new(host, listening),
		})
		.await?;

	source.set_link(LinkState::Connected { listening: None });
	destination.set_link(LinkState::Connected {
		listening: Some(listening),
	});
	Ok(())
}

/// Tears down a link made by [`connect`].
///
/// Cross-node links are addressed through the listening port stored on
/// `destination`; without one this fails with [`Error::InvalidArgument`]
/// and sends nothing.
pub async fn disconnect(source: &Port, destination: &Port) -> Result<()> {
	check_directions(source, destination)?;

	if uses_local_path(source, destination) {
		debug!(target: "art.port", %source, %destination, "disconnecting within node");
		source
			.session()
			.send(Command::DisconnectLocal {
				source: source.port_ref(),
				destination: destination.port_ref(),
			})
			.await?;
	} else {
		let Some(listening) = destination.listening_port() else {
			return Err(Error::InvalidArgument(format!(
				"{destination} has no listening port; it was not connected through this client"
			)));
		};
		let host = destination.session().address();
		debug!(target: "art.port", %source, %destination, %host, listening, "disconnecting");
		source
			.session()
			.send(Command::DisconnectRemote {
				source: source.port_ref(),
				destination: Endpoint::new(host, listening),
			})
			.await?;
	}

	source.set_link(LinkState::Unconnected);
	destination.set_link(LinkState::Unconnected);
	Ok(())
}

fn check_directions(source: &Port, destination: &Port) -> Result<()> {
	if !source.is_output() {
		return Err(Error::InvalidArgument(format!(
			"link source {source} is an {} port, expected an output",
			source.direction()
		)));
	}
	if !destination.is_input() {
		return Err(Error::InvalidArgument(format!(
			"link destination {destination} is an {} port, expected an input",
			destination.direction()
		)));
	}
	Ok(())
}

fn uses_local_path(source: &Port, destination: &Port) -> bool {
	source.shares_session_with(destination) && source.session().config().local_links
}

fn parse_listening_port(payload: &str) -> Result<u16> {
	payload
		.split_whitespace()
		.next()
		.and_then(|token| token.parse().ok())
		.ok_or_else(|| {
			Error::ProtocolError(format!(
				"LISTEN returned {payload:?}, expected a port number"
			))
		})
}
