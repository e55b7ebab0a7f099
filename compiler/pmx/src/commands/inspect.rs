//! `pmx inspect`: summarize a recorded stream of expander requests.

use std::io::{BufRead, BufReader};

use pmx_expand::to_mapped_text;
use pmx_proto::{read_message, CodecError, ExpandMacro, Request};
use pmx_tt::{ExpanderVersion, FlatTree, TokenMap};

use super::CliError;

pub fn inspect_file(path: &str, version: ExpanderVersion) -> Result<String, CliError> {
    let file = std::fs::File::open(path).map_err(|source| CliError::Read {
        path: path.to_owned(),
        source,
    })?;
    inspect_stream(&mut BufReader::new(file), version)
}

/// One summary block per request line, until the stream ends.
pub fn inspect_stream<R: BufRead>(
    input: &mut R,
    version: ExpanderVersion,
) -> Result<String, CliError> {
    let mut out = String::new();
    for index in 0.. {
        let request = match read_message::<_, Request>(input) {
            Ok(request) => request,
            Err(CodecError::UnexpectedEof) => break,
            Err(err) => return Err(err.into()),
        };
        out.push_str(&format!("#{index} "));
        match request {
            Request::ApiVersionCheck {} => out.push_str("ApiVersionCheck\n"),
            Request::ExpandMacro(expand) => summarize(&expand, version, &mut out)?,
        }
    }
    Ok(out)
}

fn summarize(expand: &ExpandMacro, version: ExpanderVersion, out: &mut String) -> Result<(), CliError> {
    out.push_str(&format!("ExpandMacro {} from {}\n", expand.macro_name, expand.lib));
    if let Some(dir) = &expand.current_dir {
        out.push_str(&format!("  current_dir: {dir}\n"));
    }
    out.push_str(&format!("  env: {} variables\n", expand.env.len()));
    out.push_str(&format!("  body: {}\n", render(&expand.macro_body, version)?));
    if let Some(attributes) = &expand.attributes {
        out.push_str(&format!("  attributes: {}\n", render(attributes, version)?));
    }
    Ok(())
}

fn render(flat: &FlatTree, version: ExpanderVersion) -> Result<String, CliError> {
    let subtree = flat.to_subtree(version)?;
    Ok(to_mapped_text(&subtree, &TokenMap::default()).0)
}
