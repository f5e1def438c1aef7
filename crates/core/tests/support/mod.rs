//! In-process fake art node for integration tests.
//!
//! Listens on an ephemeral localhost port, greets every connection, records
//! each command line and answers from a small rule table.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use art::{Node, SessionConfig};
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

/// Routes `art.*` events to the test output; `RUST_LOG` overrides the filter.
pub fn init_tracing() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,art=debug"));
	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_test_writer()
		.with_target(true)
		.compact()
		.try_init();
}

/// Command lines seen by one or more fake nodes, in arrival order.
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
	Journal::default()
}

pub struct FakeNodeBuilder {
	greeting: String,
	address: String,
	rules: Vec<(String, String)>,
	close_after: Vec<String>,
	shared: Option<(Journal, String)>,
}

impl FakeNodeBuilder {
	pub fn greeting(mut self, line: &str) -> Self {
		self.greeting = line.to_string();
		self
	}

	/// Payload of the `ADDRESS` reply.
	pub fn address(mut self, address: &str) -> Self {
		self.address = address.to_string();
		self
	}

	/// Replies `reply` to commands equal to `pattern` or starting with
	/// `pattern` followed by a space. Earlier rules win.
	pub fn reply(mut self, pattern: &str, reply: &str) -> Self {
		self.rules.push((pattern.to_string(), reply.to_string()));
		self
	}

	/// Closes the connection after answering a matching command.
	pub fn close_after(mut self, pattern: &str) -> Self {
		self.close_after.push(pattern.to_string());
		self
	}

	/// Also records commands into `journal`, prefixed with `label: `.
	pub fn journal(mut self, journal: &Journal, label: &str) -> Self {
		self.shared = Some((journal.clone(), label.to_string()));
		self
	}

	pub async fn spawn(self) -> anyhow::Result<FakeNode> {
		let listener = TcpListener::bind("127.0.0.1:0").await?;
		let addr = listener.local_addr()?;
		let commands = journal();
		let script = Arc::new(Script {
			greeting: self.greeting,
			address: self.address,
			rules: self.rules,
			close_after: self.close_after,
			own: commands.clone(),
			shared: self.shared,
		});

		let task = tokio::spawn(async move {
			while let Ok((stream, _)) = listener.accept().await {
				tokio::spawn(serve(stream, script.clone()));
			}
		});

		Ok(FakeNode {
			addr,
			commands,
			task,
		})
	}
}

pub struct FakeNode {
	addr: SocketAddr,
	commands: Journal,
	task: JoinHandle<()>,
}

impl FakeNode {
	pub fn builder() -> FakeNodeBuilder {
		FakeNodeBuilder {
			greeting: "OK streamblocks 1.0".to_string(),
			address: "127.0.0.1".to_string(),
			rules: Vec::new(),
			close_after: Vec::new(),
			shared: None,
		}
	}

	/// `host:port` to dial.
	pub fn dial(&self) -> String {
		self.addr.to_string()
	}

	pub async fn node(&self) -> anyhow::Result<Node> {
		self.node_with(SessionConfig::default()).await
	}

	pub async fn node_with(&self, config: SessionConfig) -> anyhow::Result<Node> {
		Ok(Node::connect(&self.dial(), config).await?)
	}

	/// Commands received so far, without the handshake's `ADDRESS`.
	pub fn commands(&self) -> Vec<String> {
		self.commands
			.lock()
			.iter()
			.filter(|c| c.as_str() != "ADDRESS")
			.cloned()
			.collect()
	}

	pub fn all_commands(&self) -> Vec<String> {
		self.commands.lock().clone()
	}

	pub fn clear(&self) {
		self.commands.lock().clear();
	}
}

impl Drop for FakeNode {
	fn drop(&mut self) {
		self.task.abort();
	}
}

struct Script {
	greeting: String,
	address: String,
	rules: Vec<(String, String)>,
	close_after: Vec<String>,
	own: Journal,
	shared: Option<(Journal, String)>,
}

impl Script {
	fn reply_to(&self, command: &str) -> String {
		if let Some((_, reply)) = self.rules.iter().find(|(p, _)| matches(p, command)) {
			return reply.clone();
		}
		if command == "ADDRESS" {
			return format!("OK {}", self.address);
		}
		"OK".to_string()
	}

	fn record(&self, command: &str) {
		self.own.lock().push(command.to_string());
		if let Some((journal, label)) = &self.shared {
			journal.lock().push(format!("{label}: {command}"));
		}
	}

	fn closes_after(&self, command: &str) -> bool {
		self.close_after.iter().any(|p| matches(p, command))
	}
}

fn matches(pattern: &str, command: &str) -> bool {
	command == pattern
		|| command
			.strip_prefix(pattern)
			.is_some_and(|rest| rest.starts_with(' '))
}

async fn serve(stream: TcpStream, script: Arc<Script>) -> std::io::Result<()> {
	let (read, mut write) = stream.into_split();
	let mut lines = BufReader::new(read).lines();
	write
		.write_all(format!("{}\n", script.greeting).as_bytes())
		.await?;

	while let Some(line) = lines.next_line().await? {
		script.record(&line);
		let reply = script.reply_to(&line);
		write.write_all(format!("{reply}\n").as_bytes()).await?;
		if script.closes_after(&line) {
			break;
		}
	}
	Ok(())
}
