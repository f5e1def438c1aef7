//! Wire grammar for the art node control protocol.
//!
//! The control channel is line-oriented ASCII: the client writes one command
//! per line and the node answers with exactly one reply line.
//!
//! ```text
//! client                          node
//!   │ ◄──────── OK streamblocks 1.0   (greeting, unsolicited)
//!   │ ADDRESS ─────────────────────►
//!   │ ◄──────── OK 10.0.0.1
//!   │ NEW Foo bar a="1" ───────────►
//!   │ ◄──────── OK created actor bar
//!   │ SHOW bar ────────────────────►
//!   │ ◄──────── OK Foo i:in:- o:out:64
//! ```
//!
//! # Main Types
//!
//! - [`Command`] - Every request the client can issue, rendered via `Display`
//! - [`Reply`] - A parsed `OK <payload>` / `ERROR <message>` line
//! - [`PortDescriptor`] - One `<i|o>:<name>:<count|->` entry of a `SHOW` reply
//! - [`Greeting`] - The version banner a node sends on connect

mod command;
mod descriptor;
mod greeting;
mod reply;

pub use command::{ActorArgs, Command, Endpoint, PortRef};
pub use descriptor::{Direction, PortCount, PortDescriptor, ShowReply};
pub use greeting::Greeting;
pub use reply::Reply;

use thiserror::Error;

/// Number of slots a node allocates per output port.
///
/// An output port reporting this many free slots has nothing in flight.
pub const DEFAULT_PORT_CAPACITY: u32 = 64;

/// Status token of a successful reply.
pub const STATUS_OK: &str = "OK";

/// Status token of a rejected command.
pub const STATUS_ERROR: &str = "ERROR";

/// Errors raised while building or parsing protocol lines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
	/// The reply line was empty.
	#[error("empty reply line")]
	EmptyReply,

	/// The reply did not start with `OK` or `ERROR`.
	#[error("unrecognized reply status {status:?} in {line:?}")]
	UnknownStatus { status: String, line: String },

	/// A `SHOW` port descriptor did not match `<i|o>:<name>:<count|->`.
	#[error("malformed port descriptor {0:?}")]
	MalformedDescriptor(String),

	/// A numeric payload (listening port, token count) did not parse.
	#[error("expected a number, got {0:?}")]
	InvalidNumber(String),

	/// A command token would corrupt the line framing.
	#[error("invalid {what} {value:?}: {reason}")]
	InvalidToken {
		what: &'static str,
		value: String,
		reason: &'static str,
	},
}
