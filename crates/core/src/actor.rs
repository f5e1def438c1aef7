//! [`Actor`] handles.

use std::fmt;
use std::sync::Arc;

use art_protocol::{ActorArgs, Command, ShowReply};
use art_runtime::{Error, Result, Session};
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::check::CheckReport;
use crate::port::Port;

/// A remote actor instance, addressed by its instance name.
///
/// Ports are discovered once, at creation, and are not resynchronized.
/// Cheap to clone.
#[derive(Clone)]
pub struct Actor {
	inner: Arc<ActorInner>,
}

struct ActorInner {
	name: Arc<str>,
	class_name: String,
	reported_class: String,
	session: Arc<Session>,
	ports: IndexMap<String, Port>,
}

impl Actor {
	/// Sends `NEW` followed by `SHOW` and builds one [`Port`] per reported
	/// descriptor, in wire order.
	///
	/// Instance names are not checked for uniqueness here; the node rejects
	/// duplicates.
	pub async fn create(
		session: Arc<Session>,
		class_name: &str,
		instance_name: &str,
		args: &ActorArgs,
	) -> Result<Self> {
		Self::instantiate(&session, class_name, instance_name, args).await?;
		Self::discover(session, class_name, instance_name).await
	}

	/// Sends `NEW` only. Once this succeeds the instance exists on the node,
	/// whatever happens to the `SHOW` that follows.
	pub(crate) async fn instantiate(
		session: &Session,
		class_name: &str,
		instance_name: &str,
		args: &ActorArgs,
	) -> Result<()> {
		session
			.send(Command::New {
				class: class_name,
				instance: instance_name,
				args,
			})
			.await
			.map(drop)
	}

	/// Sends `SHOW` for an existing instance and builds its port map.
	pub(crate) async fn discover(
		session: Arc<Session>,
		class_name: &str,
		instance_name: &str,
	) -> Result<Self> {
		let payload = session
			.send(Command::Show {
				instance: instance_name,
			})
			.await?;
		let show = ShowReply::parse(&payload)?;

		let name: Arc<str> = Arc::from(instance_name);
		let ports = show
			.ports
			.into_iter()
			.map(|d| {
				let port = Port::from_descriptor(d, name.clone(), session.clone());
				(port.name().to_string(), port)
			})
			.collect::<IndexMap<_, _>>();
		debug!(
			target: "art.actor",
			actor = %name,
			class = class_name,
			ports = ports.len(),
			"actor created"
		);

		Ok(Self {
			inner: Arc::new(ActorInner {
				name,
				class_name: class_name.to_string(),
				reported_class: show.class_name,
				session,
				ports,
			}),
		})
	}

	pub fn name(&self) -> &str {
		&self.inner.name
	}

	/// Class name passed to `NEW`.
	pub fn class_name(&self) -> &str {
		&self.inner.class_name
	}

	/// Class name the node reported in `SHOW`.
	pub fn reported_class(&self) -> &str {
		&self.inner.reported_class
	}

	pub fn session(&self) -> &Arc<Session> {
		&self.inner.session
	}

	pub fn ports(&self) -> impl Iterator<Item = &Port> {
		self.inner.ports.values()
	}

	pub fn port(&self, name: &str) -> Result<&Port> {
		self.inner
			.ports
			.get(name)
			.ok_or_else(|| Error::PortNotFound {
				actor: self.name().to_string(),
				port: name.to_string(),
			})
	}

	pub fn inputs(&self) -> impl Iterator<Item = &Port> {
		self.ports().filter(|p| p.is_input())
	}

	pub fn outputs(&self) -> impl Iterator<Item = &Port> {
		self.ports().filter(|p| p.is_output())
	}

	/// Live `SHOW` of this actor.
	pub async fn status(&self) -> Result<ShowReply> {
		let payload = self
			.inner
			.session
			.send(Command::Show {
				instance: self.name(),
			})
			.await?;
		Ok(ShowReply::parse(&payload)?)
	}

	/// Reports ports that are unlinked or hold tokens.
	///
	/// Findings are logged and returned, never raised as errors; only a
	/// failed `SHOW` makes this return `Err`.
	pub async fn check(&self) -> Result<CheckReport> {
		let show = self.status().await?;
		let report = CheckReport::from_descriptors(self.name(), &show.ports);
		for finding in &report.findings {
			warn!(
				target: "art.actor",
				actor = self.name(),
				port = %finding.port,
				"{}",
				finding.issue
			);
		}
		Ok(report)
	}

	pub async fn enable(&self) -> Result<()> {
		self.send(Command::Enable {
			instance: self.name(),
		})
		.await
		.map(drop)
	}

	pub async fn disable(&self) -> Result<()> {
		self.send(Command::Disable {
			instance: self.name(),
		})
		.await
		.map(drop)
	}

	/// Returns the actor's checkpoint as an opaque closure token.
	pub async fn serialize(&self) -> Result<String> {
		self.send(Command::Serialize {
			instance: self.name(),
		})
		.await
	}

	pub async fn deserialize(&self, closure: &str) -> Result<()> {
		self.send(Command::Deserialize {
			instance: self.name(),
			closure,
		})
		.await
		.map(drop)
	}

	/// Sends `DESTROY`. Repeated calls are forwarded as-is.
	pub async fn destroy(&self) -> Result<()> {
		debug!(target: "art.actor", actor = self.name(), "destroying actor");
		self.send(Command::Destroy {
			instance: self.name(),
		})
		.await
		.map(drop)
	}

	async fn send(&self, command: Command<'_>) -> Result<String> {
		self.inner.session.send(command).await
	}
}

impl fmt::Debug for Actor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Actor")
			.field("name", &self.inner.name)
			.field("class_name", &self.inner.class_name)
			.field("ports", &self.inner.ports.keys().collect::<Vec<_>>())
			.finish_non_exhaustive()
	}
}
