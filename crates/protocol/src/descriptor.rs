//! Port descriptors reported by `SHOW`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParseError;

/// Direction of a port relative to its actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
	Input,
	Output,
}

impl Direction {
	/// Wire tag: `i` or `o`.
	pub fn tag(self) -> char {
		match self {
			Direction::Input => 'i',
			Direction::Output => 'o',
		}
	}
}

impl fmt::Display for Direction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Direction::Input => "input",
			Direction::Output => "output",
		})
	}
}

/// Occupancy count of a port.
///
/// For inputs this is the number of queued tokens, for outputs the number of
/// free slots. Unconnected ports report `-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortCount {
	Unconnected,
	Count(u32),
}

impl PortCount {
	pub fn is_connected(self) -> bool {
		matches!(self, PortCount::Count(_))
	}

	pub fn value(self) -> Option<u32> {
		match self {
			PortCount::Count(n) => Some(n),
			PortCount::Unconnected => None,
		}
	}
}

impl fmt::Display for PortCount {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PortCount::Unconnected => f.write_str("-"),
			PortCount::Count(n) => write!(f, "{n}"),
		}
	}
}

/// One `<i|o>:<name>:<count|->` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDescriptor {
	pub direction: Direction,
	pub name: String,
	pub count: PortCount,
}

impl PortDescriptor {
	pub fn parse(token: &str) -> Result<Self, ParseError> {
		let malformed = || ParseError::MalformedDescriptor(token.to_string());

		let mut parts = token.split(':');
		let (Some(dir), Some(name), Some(count), None) =
			(parts.next(), parts.next(), parts.next(), parts.next())
		else {
			return Err(malformed());
		};

		let direction = match dir {
			"i" => Direction::Input,
			"o" => Direction::Output,
			_ => return Err(malformed()),
		};
		if name.is_empty() {
			return Err(malformed());
		}
		let count = match count {
			"-" => PortCount::Unconnected,
			n => PortCount::Count(
				n.parse()
					.map_err(|_| ParseError::InvalidNumber(n.to_string()))?,
			),
		};

		Ok(Self {
			direction,
			name: name.to_string(),
			count,
		})
	}
}

impl FromStr for PortDescriptor {
	type Err = ParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl fmt::Display for PortDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}:{}", self.direction.tag(), self.name, self.count)
	}
}

/// Payload of a `SHOW <instance>` reply: the class name, then one
/// descriptor per port (inputs first, in declaration order).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowReply {
	pub class_name: String,
	pub ports: Vec<PortDescriptor>,
}

impl ShowReply {
	pub fn parse(payload: &str) -> Result<Self, ParseError> {
		let mut tokens = payload.split_whitespace();
		let class_name = tokens
			.next()
			.ok_or_else(|| ParseError::MalformedDescriptor(payload.to_string()))?
			.to_string();
		let ports = tokens
			.map(PortDescriptor::parse)
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Self { class_name, ports })
	}
}
