//! Node-to-client reply lines.

use crate::{ParseError, STATUS_ERROR, STATUS_OK};

/// A parsed reply line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
	/// `OK <payload>`, payload trimmed of surrounding whitespace.
	Ok(String),
	/// `ERROR <message>`, message passed through unchanged.
	Error(String),
}

impl Reply {
	/// Parses one reply line.
	///
	/// The line terminator (`\n` or `\r\n`) is stripped first. The status is
	/// the first whitespace-delimited token; everything after the single
	/// separating character is the payload or error message.
	pub fn parse(line: &str) -> Result<Self, ParseError> {
		let line = line
			.strip_suffix('\n')
			.map(|l| l.strip_suffix('\r').unwrap_or(l))
			.unwrap_or(line);
		let body = line.trim_start();
		if body.trim_end().is_empty() {
			return Err(ParseError::EmptyReply);
		}

		let (status, rest) = match body.find(char::is_whitespace) {
			Some(idx) => {
				let sep_len = body[idx..].chars().next().map_or(1, char::len_utf8);
				(&body[..idx], &body[idx + sep_len..])
			}
			None => (body, ""),
		};

		match status {
			STATUS_OK => Ok(Reply::Ok(rest.trim().to_string())),
			STATUS_ERROR => Ok(Reply::Error(rest.to_string())),
			other => Err(ParseError::UnknownStatus {
				status: other.to_string(),
				line: line.to_string(),
			}),
		}
	}
}
