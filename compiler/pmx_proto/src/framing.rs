//! Newline-delimited JSON framing.
//!
//! JSON string escaping never produces a raw `\n`, so one line is exactly
//! one message.

use std::io::{self, BufRead, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Failure to frame or parse a message.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("stream closed before a message arrived")]
    UnexpectedEof,
}

/// Write `message` followed by a newline and flush.
pub fn write_message<W: Write, M: Serialize>(out: &mut W, message: &M) -> Result<(), CodecError> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    out.write_all(line.as_bytes())?;
    out.flush()?;
    Ok(())
}

/// Read one message line.
pub fn read_message<R: BufRead, M: DeserializeOwned>(input: &mut R) -> Result<M, CodecError> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(CodecError::UnexpectedEof);
    }
    Ok(serde_json::from_str(line.trim_end())?)
}
