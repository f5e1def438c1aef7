//! Art Runtime - Control sessions, transport, and error model
//!
//! This crate provides the low-level plumbing for supervising an art node
//! over its text control channel:
//!
//! - **Transport**: Newline-framed reads and writes over any async stream
//! - **Session**: Greeting handshake, address discovery, one command at a time
//! - **Observer**: Optional tracing of every command and reply
//! - **Errors**: Transport, protocol and node-rejection failures kept distinct
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │    art-rs    │  Node, Actor, Port handles
//! └──────┬───────┘
//!        │ Arc<Session>
//! ┌──────▼───────┐
//! │ art-runtime  │  This crate
//! │  ┌─────────┐ │
//! │  │ Session │ │  Request/reply exchange
//! │  └─────────┘ │
//! │  ┌─────────┐ │
//! │  │  Trans  │ │  Line framing over TCP
//! │  └─────────┘ │
//! └──────┬───────┘
//!        │ Command / Reply
//! ┌──────▼───────┐
//! │ art-protocol │  Wire grammar
//! └──────────────┘
//! ```

pub mod config;
pub mod error;
pub mod observer;
pub mod session;
pub mod transport;

// Re-export key types at crate root
pub use config::SessionConfig;
pub use error::{Error, Result};
pub use observer::{CommandObserver, TracingObserver, TranscriptObserver};
pub use session::Session;
pub use transport::{ControlStream, LineTransport};
