//! Steady-state diagnostics for an actor's ports.

use std::fmt;

use art_protocol::{DEFAULT_PORT_CAPACITY, Direction, PortCount, PortDescriptor};
use serde::{Deserialize, Serialize};

/// Something [`Actor::check`](crate::Actor::check) noticed about one port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum PortIssue {
	NotConnected,
	InputNotEmpty { tokens: u32 },
	OutputNotEmpty { free_slots: u32 },
}

impl PortIssue {
	/// Classifies one descriptor; `None` means the port is idle and linked.
	pub fn of(descriptor: &PortDescriptor) -> Option<Self> {
		match (descriptor.direction, descriptor.count) {
			(_, PortCount::Unconnected) => Some(PortIssue::NotConnected),
			(Direction::Input, PortCount::Count(0)) => None,
			(Direction::Input, PortCount::Count(tokens)) => Some(PortIssue::InputNotEmpty { tokens }),
			(Direction::Output, PortCount::Count(DEFAULT_PORT_CAPACITY)) => None,
			(Direction::Output, PortCount::Count(free_slots)) => {
				Some(PortIssue::OutputNotEmpty { free_slots })
			}
		}
	}
}

impl fmt::Display for PortIssue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PortIssue::NotConnected => f.write_str("not connected"),
			PortIssue::InputNotEmpty { tokens } => {
				write!(f, "input not empty ({tokens} tokens queued)")
			}
			PortIssue::OutputNotEmpty { free_slots } => write!(
				f,
				"output not empty ({free_slots} of {DEFAULT_PORT_CAPACITY} slots free)"
			),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortFinding {
	pub port: String,
	pub direction: Direction,
	#[serde(flatten)]
	pub issue: PortIssue,
}

/// Result of an advisory port check. Findings never fail the check itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
	pub actor: String,
	pub findings: Vec<PortFinding>,
}

impl CheckReport {
	pub fn from_descriptors<'a>(
		actor: impl Into<String>,
		descriptors: impl IntoIterator<Item = &'a PortDescriptor>,
	) -> Self {
		let findings = descriptors
			.into_iter()
			.filter_map(|d| {
				PortIssue::of(d).map(|issue| PortFinding {
					port: d.name.clone(),
					direction: d.direction,
					issue,
				})
			})
			.collect();
		Self {
			actor: actor.into(),
			findings,
		}
	}

	/// True when every port is linked and idle.
	pub fn is_clean(&self) -> bool {
		self.findings.is_empty()
	}

	pub fn issue_for(&self, port: &str) -> Option<PortIssue> {
		self.findings.iter().find(|f| f.port == port).map(|f| f.issue)
	}
}
