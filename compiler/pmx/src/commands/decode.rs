//! `pmx decode`: flat tree JSON to a tree dump and rendered text.

use pmx_expand::to_mapped_text;
use pmx_tt::{ExpanderVersion, FlatTree, TokenMap};

use super::{read_file, CliError};

pub fn decode_file(path: &str, version: ExpanderVersion) -> Result<String, CliError> {
    decode_flat(&read_file(path)?, version)
}

/// Decode `json` at `version`.
///
/// No token map is available offline, so the text is rendered with
/// synthesized spacing only.
pub fn decode_flat(json: &str, version: ExpanderVersion) -> Result<String, CliError> {
    let flat: FlatTree = serde_json::from_str(json)?;
    let subtree = flat.to_subtree(version)?;
    tracing::debug!(?version, tokens = flat.token_tree.len(), "decoded flat tree");

    let (text, _) = to_mapped_text(&subtree, &TokenMap::default());
    let mut out = subtree.to_debug_string();
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("---\n");
    out.push_str(&text);
    out.push('\n');
    Ok(out)
}
