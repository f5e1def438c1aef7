//! Client-to-node commands.

use std::fmt;

use indexmap::IndexMap;

use crate::ParseError;

/// Actor constructor arguments, rendered in insertion order.
pub type ActorArgs = IndexMap<String, String>;

/// A port addressed on the node that receives the command: `<actor>.<port>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRef<'a> {
	pub actor: &'a str,
	pub port: &'a str,
}

impl<'a> PortRef<'a> {
	pub fn new(actor: &'a str, port: &'a str) -> Self {
		Self { actor, port }
	}

	fn validate(&self) -> Result<(), ParseError> {
		check_word("actor name", self.actor)?;
		check_word("port name", self.port)?;
		// The node splits a port reference on the first '.', and treats any ':' as host:port.
		if self.actor.contains(['.', ':']) {
			return Err(invalid("actor name", self.actor, "must not contain '.' or ':'"));
		}
		if self.port.contains(':') {
			return Err(invalid("port name", self.port, "must not contain ':'"));
		}
		Ok(())
	}
}

impl fmt::Display for PortRef<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}", self.actor, self.port)
	}
}

/// A listening socket on another node: `<host>:<port>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint<'a> {
	pub host: &'a str,
	pub port: u16,
}

impl<'a> Endpoint<'a> {
	pub fn new(host: &'a str, port: u16) -> Self {
		Self { host, port }
	}
}

impl fmt::Display for Endpoint<'_> {
	/// Bare IPv6 hosts are bracketed so the trailing `:port` stays unambiguous.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.host.contains(':') && !self.host.starts_with('[') {
			write!(f, "[{}]:{}", self.host, self.port)
		} else {
			write!(f, "{}:{}", self.host, self.port)
		}
	}
}

/// A single control command.
///
/// `Display` renders the exact wire text, without the terminating newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
	/// `LOAD <file>`: load an actor class library on the node.
	Load { file: &'a str },
	/// `NEW <class> <instance> [<key>="<value>" ...]`
	New {
		class: &'a str,
		instance: &'a str,
		args: &'a ActorArgs,
	},
	/// `SHOW <instance>`: class name followed by port descriptors.
	Show { instance: &'a str },
	Enable { instance: &'a str },
	Disable { instance: &'a str },
	/// `SERIALIZE <instance>`: returns an opaque closure token.
	Serialize { instance: &'a str },
	Deserialize { instance: &'a str, closure: &'a str },
	Destroy { instance: &'a str },
	/// `CONNECT <actor>.<port> <actor>.<port>` between two actors of one node.
	ConnectLocal {
		source: PortRef<'a>,
		destination: PortRef<'a>,
	},
	/// `CONNECT <actor>.<port> <host>:<port>` to a listening input on another node.
	ConnectRemote {
		source: PortRef<'a>,
		destination: Endpoint<'a>,
	},
	DisconnectLocal {
		source: PortRef<'a>,
		destination: PortRef<'a>,
	},
	DisconnectRemote {
		source: PortRef<'a>,
		destination: Endpoint<'a>,
	},
	/// `LISTEN <actor>.<port>`: returns the allocated listening port number.
	Listen { port: PortRef<'a> },
	/// `ADDRESS`: the node's externally reachable addresses.
	Address,
	/// `JOIN`: blocks until the node's network is idle.
	Join,
	/// `ACTORS`: instance names currently on the node.
	Actors,
	/// `CLASSES`: loaded actor class names.
	Classes,
	/// `QUIT`: ends the control connection.
	Quit,
}

impl Command<'_> {
	/// Returns the leading keyword of the command.
	pub fn keyword(&self) -> &'static str {
		match self {
			Command::Load { .. } => "LOAD",
			Command::New { .. } => "NEW",
			Command::Show { .. } => "SHOW",
			Command::Enable { .. } => "ENABLE",
			Command::Disable { .. } => "DISABLE",
			Command::Serialize { .. } => "SERIALIZE",
			Command::Deserialize { .. } => "DESERIALIZE",
			Command::Destroy { .. } => "DESTROY",
			Command::ConnectLocal { .. } | Command::ConnectRemote { .. } => "CONNECT",
			Command::DisconnectLocal { .. } | Command::DisconnectRemote { .. } => "DISCONNECT",
			Command::Listen { .. } => "LISTEN",
			Command::Address => "ADDRESS",
			Command::Join => "JOIN",
			Command::Actors => "ACTORS",
			Command::Classes => "CLASSES",
			Command::Quit => "QUIT",
		}
	}

	/// Checks that every token survives the node's whitespace tokenizer.
	///
	/// Argument values are sent inside double quotes with no escaping, so a
	/// value containing `"` is rejected rather than silently truncated.
	pub fn validate(&self) -> Result<(), ParseError> {
		match self {
			Command::Load { file } => check_word("file name", file),
			Command::New {
				class,
				instance,
				args,
			} => {
				check_word("class name", class)?;
				check_word("instance name", instance)?;
				for (key, value) in args.iter() {
					check_word("argument name", key)?;
					if key.contains('=') {
						return Err(invalid("argument name", key, "must not contain '='"));
					}
					if value.contains('"') {
						return Err(invalid("argument value", value, "must not contain '\"'"));
					}
					check_single_line("argument value", value)?;
				}
				Ok(())
			}
			Command::Show { instance }
			| Command::Enable { instance }
			| Command::Disable { instance }
			| Command::Serialize { instance }
			| Command::Destroy { instance } => check_word("instance name", instance),
			Command::Deserialize { instance, closure } => {
				check_word("instance name", instance)?;
				// Any single-line token is forwarded; the node judges its content.
				check_single_line("closure", closure)
			}
			Command::ConnectLocal {
				source,
				destination,
			}
			| Command::DisconnectLocal {
				source,
				destination,
			} => {
				source.validate()?;
				destination.validate()
			}
			Command::ConnectRemote {
				source,
				destination,
			}
			| Command::DisconnectRemote {
				source,
				destination,
			} => {
				source.validate()?;
				check_word("host", destination.host)
			}
			Command::Listen { port } => port.validate(),
			Command::Address
			| Command::Join
			| Command::Actors
			| Command::Classes
			| Command::Quit => Ok(()),
		}
	}
}

impl fmt::Display for Command<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let keyword = self.keyword();
		match self {
			Command::Load { file } => write!(f, "{keyword} {file}"),
			Command::New {
				class,
				instance,
				args,
			} => {
				write!(f, "{keyword} {class} {instance}")?;
				for (key, value) in args.iter() {
					write!(f, " {key}=\"{value}\"")?;
				}
				Ok(())
			}
			Command::Show { instance }
			| Command::Enable { instance }
			| Command::Disable { instance }
			| Command::Serialize { instance }
			| Command::Destroy { instance } => write!(f, "{keyword} {instance}"),
			Command::Deserialize { instance, closure } => {
				write!(f, "{keyword} {instance} {closure}")
			}
			Command::ConnectLocal {
				source,
				destination,
			}
			| Command::DisconnectLocal {
				source,
				destination,
			} => write!(f, "{keyword} {source} {destination}"),
			Command::ConnectRemote {
				source,
				destination,
			}
			| Command::DisconnectRemote {
				source,
				destination,
			} => write!(f, "{keyword} {source} {destination}"),
			Command::Listen { port } => write!(f, "{keyword} {port}"),
			Command::Address
			| Command::Join
			| Command::Actors
			| Command::Classes
			| Command::Quit => f.write_str(keyword),
		}
	}
}

fn invalid(what: &'static str, value: &str, reason: &'static str) -> ParseError {
	ParseError::InvalidToken {
		what,
		value: value.to_string(),
		reason,
	}
}

fn check_word(what: &'static str, value: &str) -> Result<(), ParseError> {
	if value.is_empty() {
		return Err(invalid(what, value, "must not be empty"));
	}
	if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
		return Err(invalid(what, value, "must not contain whitespace"));
	}
	check_single_line(what, value)
}

fn check_single_line(what: &'static str, value: &str) -> Result<(), ParseError> {
	if value.contains(['\n', '\r']) {
		return Err(invalid(what, value, "must not contain line breaks"));
	}
	// The node discards everything after '#' as a comment.
	if value.contains('#') {
		return Err(invalid(what, value, "must not contain '#'"));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn args(pairs: &[(&str, &str)]) -> ActorArgs {
		pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect()
	}

	#[test]
	fn new_renders_arguments_in_insertion_order() {
		let args = args(&[("b", "2"), ("a", "1")]);
		let cmd = Command::New {
			class: "Foo",
			instance: "bar",
			args: &args,
		};
		assert_eq!(cmd.to_string(), r#"NEW Foo bar b="2" a="1""#);
	}

	#[test]
	fn new_without_arguments_has_no_trailing_space() {
		let args = ActorArgs::new();
		let cmd = Command::New {
			class: "Foo",
			instance: "Foo",
			args: &args,
		};
		assert_eq!(cmd.to_string(), "NEW Foo Foo");
	}

	#[test]
	fn connect_variants_render_peer_forms() {
		let local = Command::ConnectLocal {
			source: PortRef::new("p", "out"),
			destination: PortRef::new("q", "in"),
		};
		assert_eq!(local.to_string(), "CONNECT p.out q.in");

		let remote = Command::ConnectRemote {
			source: PortRef::new("p", "out"),
			destination: Endpoint::new("10.0.0.1", 4711),
		};
		assert_eq!(remote.to_string(), "CONNECT p.out 10.0.0.1:4711");

		let undo = Command::DisconnectRemote {
			source: PortRef::new("p", "out"),
			destination: Endpoint::new("10.0.0.1", 4711),
		};
		assert_eq!(undo.to_string(), "DISCONNECT p.out 10.0.0.1:4711");
	}

	#[test]
	fn bare_commands_render_keyword_only() {
		assert_eq!(Command::Address.to_string(), "ADDRESS");
		assert_eq!(Command::Join.to_string(), "JOIN");
		assert_eq!(Command::Quit.to_string(), "QUIT");
	}

	#[test]
	fn quote_in_argument_value_is_rejected() {
		let args = args(&[("msg", "say \"hi\"")]);
		let cmd = Command::New {
			class: "Foo",
			instance: "bar",
			args: &args,
		};
		let err = cmd.validate().unwrap_err();
		assert!(err.to_string().contains("argument value"));
	}

	#[test]
	fn spaces_in_argument_value_are_allowed() {
		let args = args(&[("msg", "hello world")]);
		let cmd = Command::New {
			class: "Foo",
			instance: "bar",
			args: &args,
		};
		assert!(cmd.validate().is_ok());
	}

	#[test]
	fn whitespace_in_instance_name_is_rejected() {
		let cmd = Command::Enable { instance: "two words" };
		assert!(matches!(
			cmd.validate(),
			Err(ParseError::InvalidToken { what: "instance name", .. })
		));
	}

	#[test]
	fn dotted_actor_name_is_rejected_in_port_ref() {
		let cmd = Command::Listen {
			port: PortRef::new("a.b", "in"),
		};
		assert!(cmd.validate().is_err());
	}

	#[test]
	fn comment_marker_in_argument_value_is_rejected() {
		let args = args(&[("color", "#ff0000")]);
		let cmd = Command::New {
			class: "Foo",
			instance: "bar",
			args: &args,
		};
		assert!(cmd.validate().is_err());
	}

	#[test]
	fn multiline_closure_is_rejected() {
		let cmd = Command::Deserialize {
			instance: "bar",
			closure: "{\n}",
		};
		assert!(cmd.validate().is_err());
	}

	#[test]
	fn empty_closure_is_forwarded() {
		let cmd = Command::Deserialize {
			instance: "bar",
			closure: "",
		};
		assert!(cmd.validate().is_ok());
		assert_eq!(cmd.to_string(), "DESERIALIZE bar ");
	}

	#[test]
	fn ipv6_endpoint_host_is_bracketed() {
		assert_eq!(Endpoint::new("::1", 4711).to_string(), "[::1]:4711");
		assert_eq!(Endpoint::new("[fe80::2]", 4711).to_string(), "[fe80::2]:4711");
		assert_eq!(Endpoint::new("node-b", 4711).to_string(), "node-b:4711");
	}
}
