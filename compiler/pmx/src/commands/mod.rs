//! Command handlers for the pmx CLI.
//!
//! Handlers return their output as a string so tests can check it without
//! capturing stdout.

mod config;
mod decode;
mod inspect;

pub use config::show_config;
pub use decode::decode_file;
pub use inspect::inspect_file;

use pmx_proto::CodecError;
use pmx_tt::{ExpanderVersion, FlatTreeError};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("cannot read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid flat tree JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed flat tree: {0}")]
    FlatTree(#[from] FlatTreeError),
    #[error("{0}")]
    Codec(#[from] CodecError),
    #[error("unknown protocol version '{0}' (expected 0..={max})", max = ExpanderVersion::LATEST.as_u32())]
    BadVersion(String),
    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),
}

/// Parse the trailing options of `decode` and `inspect`.
pub fn parse_version_flag(args: &[String]) -> Result<ExpanderVersion, CliError> {
    let mut version = ExpanderVersion::LATEST;
    for arg in args {
        let Some(value) = arg.strip_prefix("--version=") else {
            return Err(CliError::UnexpectedArgument(arg.clone()));
        };
        version = value
            .parse::<u32>()
            .ok()
            .and_then(ExpanderVersion::from_u32)
            .ok_or_else(|| CliError::BadVersion(value.to_owned()))?;
    }
    Ok(version)
}

fn read_file(path: &str) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_owned(),
        source,
    })
}
