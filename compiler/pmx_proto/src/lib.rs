//! Talking to an out-of-process proc-macro expander.
//!
//! - [`Request`] / [`Response`]: the messages, serialized as JSON
//! - [`write_message`] / [`read_message`]: one message per line
//! - [`Transport`]: the seam to whatever owns the expander process
//! - [`ProcMacroServer`]: one expander instance and its negotiated [`ExpanderVersion`]
//!
//! Spawning, pooling and restarting expander processes is the transport's
//! business. This crate only needs `send(request, timeout)`.
//!
//! [`ExpanderVersion`]: pmx_tt::ExpanderVersion

mod framing;
mod msg;
mod server;
mod transport;

pub use framing::{read_message, write_message, CodecError};
pub use msg::{ExpandMacro, ExpnGlobals, PanicMessage, Request, Response};
pub use server::ProcMacroServer;
pub use transport::{Transport, TransportError};
