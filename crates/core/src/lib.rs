//! art: remote supervision of dataflow actor runtime nodes
//!
//! This crate drives one or more art nodes over their text control channel:
//! create actor instances, wire their ports (also across nodes), enable and
//! disable execution, checkpoint state and tear everything down again.
//!
//! # Examples
//!
//! ## Linking actors on two nodes
//!
//! ```ignore
//! use art::{ActorArgs, Node, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> art::Result<()> {
//!     let a = Node::connect("10.0.0.1:9000", SessionConfig::default()).await?;
//!     let b = Node::connect("10.0.0.2:9000", SessionConfig::default()).await?;
//!
//!     let mut args = ActorArgs::new();
//!     args.insert("count".into(), "100".into());
//!     let src = a.new_actor("Counter", Some("src"), &args).await?;
//!     let dst = b.new_actor("Printer", Some("dst"), &ActorArgs::new()).await?;
//!
//!     // LISTEN dst.in on b, then CONNECT src.out <b>:<n> on a
//!     src.port("out")?.connect_to(dst.port("in")?).await?;
//!
//!     let report = dst.check().await?;
//!     assert!(report.is_clean());
//!     Ok(())
//! }
//! ```
//!
//! ## Checkpointing
//!
//! ```ignore
//! let closure = actor.serialize().await?;
//! actor.destroy().await?;
//! let again = node.new_actor("Counter", Some("src"), &ActorArgs::new()).await?;
//! again.deserialize(&closure).await?;
//! ```
//!
//! # Logging
//!
//! Events are emitted through `tracing` under the `art.session`, `art.port`,
//! `art.actor` and `art.node` targets. Installing a subscriber is up to the
//! application.

mod actor;
mod check;
mod node;
mod port;

pub use actor::Actor;
pub use art_protocol::{ActorArgs, Direction, Greeting, PortCount, PortDescriptor, ShowReply};
pub use art_runtime::{
	CommandObserver, Error, Result, Session, SessionConfig, TracingObserver, TranscriptObserver,
};
pub use check::{CheckReport, PortFinding, PortIssue};
pub use node::Node;
pub use port::{LinkState, Port, connect, disconnect};
