//! Newline-framed byte transport.
//!
//! Every command is one line and every reply is one line, both terminated by
//! `\n`. Reads consume bytes up to and including the newline; nothing else
//! (such as an interactive prompt) is expected or consumed after it.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::{Error, Result};

/// Any bidirectional byte stream a session can run over.
pub trait ControlStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> ControlStream for T {}

/// Line reader/writer over a [`ControlStream`].
///
/// Once a write fails, the stream closes, a read times out, or a command is
/// abandoned before its reply was read, the transport is poisoned: a late
/// reply could otherwise be mistaken for the answer to the next command.
pub struct LineTransport {
	stream: BufReader<Box<dyn ControlStream>>,
	read_timeout: Option<Duration>,
	poisoned: Option<String>,
	/// Set from the start of `send_line` until `read_line` returns.
	awaiting_reply: bool,
}

impl LineTransport {
	pub fn new<S: ControlStream + 'static>(stream: S, read_timeout: Option<Duration>) -> Self {
		Self {
			stream: BufReader::new(Box::new(stream)),
			read_timeout,
			poisoned: None,
			awaiting_reply: false,
		}
	}

	/// Returns the reason this transport stopped being usable, if it has.
	pub fn poisoned(&self) -> Option<&str> {
		self.poisoned.as_deref()
	}

	/// Writes `line` followed by `\n` and flushes.
	///
	/// Fails and poisons the transport if the previous command's reply was
	/// never read, which happens when a caller drops an in-flight exchange.
	pub async fn send_line(&mut self, line: &str) -> Result<()> {
		self.ensure_usable()?;
		if self.awaiting_reply {
			return Err(self.poison(
				"previous command was cancelled before its reply was read".to_string(),
			));
		}
		self.awaiting_reply = true;
		let result = async {
			let writer = self.stream.get_mut();
			writer.write_all(line.as_bytes()).await?;
			writer.write_all(b"\n").await?;
			writer.flush().await
		}
		.await;

		result.map_err(|e| self.poison(format!("failed writing command: {e}")))
	}

	/// Reads one reply line. The returned string still ends in `\n`.
	pub async fn read_line(&mut self) -> Result<String> {
		self.ensure_usable()?;
		let mut buf = Vec::new();

		let read = self.stream.read_until(b'\n', &mut buf);
		let outcome = match self.read_timeout {
			Some(limit) => match tokio::time::timeout(limit, read).await {
				Ok(outcome) => outcome,
				Err(_) => {
					self.poisoned = Some(format!("no reply within {limit:?}"));
					return Err(Error::Timeout(format!("no reply from node within {limit:?}")));
				}
			},
			None => read.await,
		};
		self.awaiting_reply = false;

		match outcome {
			Ok(0) => Err(self.poison("connection closed by node".to_string())),
			Ok(_) if buf.last() != Some(&b'\n') => {
				Err(self.poison("connection closed in the middle of a reply".to_string()))
			}
			Ok(_) => String::from_utf8(buf)
				.map_err(|e| Error::ProtocolError(format!("reply is not valid UTF-8: {e}"))),
			Err(e) => Err(self.poison(format!("failed reading reply: {e}"))),
		}
	}

	fn ensure_usable(&self) -> Result<()> {
		match &self.poisoned {
			Some(reason) => Err(Error::TransportError(format!(
				"session is no longer usable ({reason})"
			))),
			None => Ok(()),
		}
	}

	fn poison(&mut self, reason: String) -> Error {
		tracing::debug!(target: "art.session", %reason, "transport poisoned");
		self.poisoned = Some(reason.clone());
		Error::TransportError(reason)
	}
}
