//! One expander instance and its negotiated protocol version.

use std::io;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use pmx_tt::ExpanderVersion;
use tracing::{debug, trace};

use crate::{Request, Response, Transport, TransportError};

/// Not negotiated yet. Outside the range of [`ExpanderVersion`].
const UNKNOWN: u8 = u8::MAX;

/// A handle to an expander instance.
///
/// Shared by reference between concurrent expansions. The only mutable state
/// is the negotiated version, published once.
pub struct ProcMacroServer {
    transport: Box<dyn Transport>,
    needs_version_check: bool,
    version: AtomicU8,
}

impl ProcMacroServer {
    /// `needs_version_check` is false for expanders too old to answer
    /// [`Request::ApiVersionCheck`]. Those speak [`ExpanderVersion::NoVersionCheck`].
    pub fn new(transport: impl Transport + 'static, needs_version_check: bool) -> Self {
        ProcMacroServer {
            transport: Box::new(transport),
            needs_version_check,
            version: AtomicU8::new(UNKNOWN),
        }
    }

    /// The negotiated version, if negotiation has happened.
    pub fn version(&self) -> Option<ExpanderVersion> {
        decode_version(self.version.load(Ordering::Acquire))
    }

    /// The negotiated version, asking the expander on first use.
    ///
    /// Racing callers may both ask. The first answer published wins and
    /// every caller returns it.
    pub fn request_version(&self, timeout: Duration) -> Result<ExpanderVersion, TransportError> {
        if let Some(version) = self.version() {
            return Ok(version);
        }

        let resolved = if self.needs_version_check {
            match self.transport.send(&Request::ApiVersionCheck {}, timeout)? {
                Response::ApiVersionCheck(reported) => {
                    let version = ExpanderVersion::negotiate(reported);
                    debug!(reported, ?version, "negotiated expander version");
                    version
                }
                Response::ExpandMacro(_) => {
                    return Err(TransportError::Io(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "expander answered a version check with an expansion",
                    )));
                }
            }
        } else {
            ExpanderVersion::NoVersionCheck
        };

        match self.version.compare_exchange(
            UNKNOWN,
            resolved as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => Ok(resolved),
            Err(published) => {
                trace!(published, "version already published by another caller");
                Ok(decode_version(published).unwrap_or(resolved))
            }
        }
    }

    /// Send one request. No retries.
    pub fn send(&self, request: &Request, timeout: Duration) -> Result<Response, TransportError> {
        trace!(?timeout, "sending request to expander");
        self.transport.send(request, timeout)
    }
}

fn decode_version(raw: u8) -> Option<ExpanderVersion> {
    ExpanderVersion::from_u32(u32::from(raw))
}
