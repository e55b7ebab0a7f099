//! The seam between this crate and whatever runs the expander process.

use std::io;
use std::time::Duration;

use crate::{CodecError, Request, Response};

/// One request/response exchange with an expander instance.
///
/// Implementations enforce `timeout` themselves. Callers never retry.
pub trait Transport: Send + Sync {
    fn send(&self, request: &Request, timeout: Duration) -> Result<Response, TransportError>;
}

/// Why a request got no response.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("failed to start expander process: {0}")]
    ProcessCreation(#[source] io::Error),
    #[error("i/o error talking to expander: {0}")]
    Io(#[source] io::Error),
    #[error("expander process exited{}", exit_suffix(*.exit_code))]
    ProcessAborted { exit_code: Option<i32> },
    #[error("expander does not support protocol version {0}")]
    UnknownProtocolVersion(u32),
}

impl From<CodecError> for TransportError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Io(err) => TransportError::Io(err),
            CodecError::Json(err) => {
                TransportError::Io(io::Error::new(io::ErrorKind::InvalidData, err))
            }
            CodecError::UnexpectedEof => TransportError::Io(io::ErrorKind::UnexpectedEof.into()),
        }
    }
}

fn exit_suffix(exit_code: Option<i32>) -> String {
    exit_code.map(|code| format!(" with code {code}")).unwrap_or_default()
}
