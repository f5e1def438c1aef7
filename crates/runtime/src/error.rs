//! Error types for art node control sessions.

use thiserror::Error;

/// Result type alias for control operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while supervising a node.
#[derive(Debug, Error)]
pub enum Error {
	/// The control connection could not be established.
	#[error("Failed to connect to node at {address}: {source}")]
	ConnectionFailed {
		address: String,
		#[source]
		source: std::io::Error,
	},

	/// The control stream broke or closed mid-exchange.
	#[error("Transport error: {0}")]
	TransportError(String),

	/// The node sent something that is not a valid reply.
	#[error("Protocol error: {0}")]
	ProtocolError(String),

	/// The node answered `ERROR <message>`.
	#[error("node rejected `{command}`: {message}")]
	Remote {
		/// Command line that was rejected
		command: String,
		/// Message from the node, verbatim
		message: String,
	},

	/// I/O error.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// No reply within the configured read timeout.
	#[error("Timeout: {0}")]
	Timeout(String),

	/// Invalid argument provided to a method; nothing was sent.
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),

	/// Port name not present on the actor.
	#[error("Port not found: {actor}.{port}")]
	PortNotFound { actor: String, port: String },
}

impl Error {
	/// Returns true if the control stream itself failed.
	pub fn is_transport(&self) -> bool {
		matches!(
			self,
			Error::ConnectionFailed { .. }
				| Error::TransportError(_)
				| Error::Io(_)
				| Error::Timeout(_)
		)
	}

	/// Returns true if the node's reply was malformed.
	pub fn is_protocol(&self) -> bool {
		matches!(self, Error::ProtocolError(_))
	}

	/// Returns true if the node rejected the command.
	pub fn is_remote(&self) -> bool {
		matches!(self, Error::Remote { .. })
	}

	/// Returns true if this is a timeout error.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Error::Timeout(_))
	}

	/// Returns the node's message if this is a rejection.
	pub fn remote_message(&self) -> Option<&str> {
		match self {
			Error::Remote { message, .. } => Some(message),
			_ => None,
		}
	}
}

impl From<art_protocol::ParseError> for Error {
	fn from(err: art_protocol::ParseError) -> Self {
		match err {
			art_protocol::ParseError::InvalidToken { .. } => Error::InvalidArgument(err.to_string()),
			other => Error::ProtocolError(other.to_string()),
		}
	}
}
