//! [`Node`], the entry point for supervising one runtime node.

use std::sync::Arc;

use art_protocol::{ActorArgs, Command};
use art_runtime::{Result, Session, SessionConfig};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::actor::Actor;

/// One control session plus the actors created through it.
///
/// # Example
///
/// ```ignore
/// use art::{ActorArgs, Node, SessionConfig};
///
/// #[tokio::main]
/// async fn main() -> art::Result<()> {
///     let a = Node::connect("10.0.0.1:9000", SessionConfig::default()).await?;
///     let b = Node::connect("10.0.0.2:9000", SessionConfig::default()).await?;
///
///     let source = a.new_actor("Source", None, &ActorArgs::new()).await?;
///     let sink = b.new_actor("Sink", None, &ActorArgs::new()).await?;
///     source.port("out")?.connect_to(sink.port("in")?).await?;
///
///     source.enable().await?;
///     sink.enable().await?;
///     a.join().await?;
///
///     a.destroy_all().await?;
///     b.destroy_all().await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Node {
	session: Arc<Session>,
	/// Every instance whose `NEW` succeeded, in creation order.
	instances: Mutex<Vec<String>>,
	actors: Mutex<Vec<Actor>>,
}

impl Node {
	/// Opens a session to `address` (`host:port`).
	pub async fn connect(address: &str, config: SessionConfig) -> Result<Self> {
		let session = Session::open(address, config).await?;
		info!(
			target: "art.node",
			peer = address,
			address = session.address(),
			greeting = %session.greeting().raw,
			"connected to node"
		);
		Ok(Self::from_session(session))
	}

	/// Wraps an already-open session.
	pub fn from_session(session: impl Into<Arc<Session>>) -> Self {
		Self {
			session: session.into(),
			instances: Mutex::new(Vec::new()),
			actors: Mutex::new(Vec::new()),
		}
	}

	/// Creates an actor and tracks it for [`Node::destroy_all`].
	///
	/// `instance` defaults to the class name. The instance is tracked as soon
	/// as `NEW` succeeds, so it is still destroyed by [`Node::destroy_all`]
	/// when the following `SHOW` fails.
	pub async fn new_actor(
		&self,
		class_name: &str,
		instance: Option<&str>,
		args: &ActorArgs,
	) -> Result<Actor> {
		let instance = instance.unwrap_or(class_name);
		Actor::instantiate(&self.session, class_name, instance, args).await?;
		self.instances.lock().push(instance.to_string());
		let actor = Actor::discover(self.session.clone(), class_name, instance)
			.await
			.inspect_err(|err| {
				warn!(
					target: "art.node",
					actor = instance,
					error = %err,
					"port discovery failed; instance stays tracked"
				)
			})?;
		self.actors.lock().push(actor.clone());
		Ok(actor)
	}

	/// Destroys every tracked instance in creation order.
	///
	/// Stops at the first failure. Tracked instances are kept either way, so
	/// a second call re-sends `DESTROY` for all of them.
	pub async fn destroy_all(&self) -> Result<()> {
		let instances = self.tracked_instances();
		debug!(target: "art.node", count = instances.len(), "destroying tracked actors");
		for instance in &instances {
			debug!(target: "art.actor", actor = %instance, "destroying actor");
			let instance = instance.as_str();
			self.session.send(Command::Destroy { instance }).await?;
		}
		Ok(())
	}

	/// Loads an actor class library; returns the node's reply payload.
	pub async fn load(&self, file: &str) -> Result<String> {
		self.session.send(Command::Load { file }).await
	}

	/// Blocks until the node reports its network idle.
	pub async fn join(&self) -> Result<()> {
		self.session.send(Command::Join).await.map(drop)
	}

	/// Instance names currently on the node, including ones not created here.
	pub async fn actors(&self) -> Result<Vec<String>> {
		self.session.send(Command::Actors).await.map(split_names)
	}

	/// Actor classes the node has loaded.
	pub async fn classes(&self) -> Result<Vec<String>> {
		self.session.send(Command::Classes).await.map(split_names)
	}

	/// Asks the node to end this control connection.
	///
	/// The node closes the stream after replying; later commands fail with a
	/// transport error.
	pub async fn quit(&self) -> Result<()> {
		self.session.send(Command::Quit).await.map(drop)
	}

	/// Address other nodes use to reach this one.
	pub fn address(&self) -> &str {
		self.session.address()
	}

	pub fn session(&self) -> &Arc<Session> {
		&self.session
	}

	/// Snapshot of the actors created through this node, oldest first.
	///
	/// Only actors whose ports were discovered appear here; see
	/// [`Node::tracked_instances`] for everything `destroy_all` covers.
	pub fn tracked_actors(&self) -> Vec<Actor> {
		self.actors.lock().clone()
	}

	/// Names of every instance this node created, oldest first.
	pub fn tracked_instances(&self) -> Vec<String> {
		self.instances.lock().clone()
	}
}

fn split_names(payload: String) -> Vec<String> {
	payload.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn names_split_on_whitespace() {
		assert_eq!(split_names("a  b\tc".into()), vec!["a", "b", "c"]);
		assert!(split_names(String::new()).is_empty());
	}
}
