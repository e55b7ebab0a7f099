//! Protocol messages.
//!
//! Serialized with serde's externally tagged enum representation, which is
//! what the expander reads: `{"ExpandMacro":{...}}`, `{"ApiVersionCheck":{}}`.

use std::collections::BTreeMap;

use pmx_tt::FlatTree;
use serde::{Deserialize, Serialize};

/// A message to the expander.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Request {
    ExpandMacro(ExpandMacro),
    /// Ask which protocol version the expander speaks.
    ApiVersionCheck {},
}

/// Expand one macro call.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ExpandMacro {
    pub macro_body: FlatTree,
    pub macro_name: String,
    /// Attribute arguments, attribute macros only.
    pub attributes: Option<FlatTree>,
    /// Path of the proc-macro dylib.
    pub lib: String,
    pub env: Vec<(String, String)>,
    pub current_dir: Option<String>,
    pub has_global_spans: ExpnGlobals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_data_table: Option<Vec<u32>>,
}

impl ExpandMacro {
    /// Build a request with token-id spans.
    ///
    /// `current_dir` is taken from `CARGO_MANIFEST_DIR` in `env`.
    pub fn new(
        macro_body: FlatTree,
        macro_name: impl Into<String>,
        attributes: Option<FlatTree>,
        lib: impl Into<String>,
        env: &BTreeMap<String, String>,
    ) -> Self {
        ExpandMacro {
            macro_body,
            macro_name: macro_name.into(),
            attributes,
            lib: lib.into(),
            env: env
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            current_dir: env.get("CARGO_MANIFEST_DIR").cloned(),
            has_global_spans: ExpnGlobals::default(),
            span_data_table: None,
        }
    }
}

/// Token ids of the def-site, call-site and mixed-site spans.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ExpnGlobals {
    pub def_site: u32,
    pub call_site: u32,
    pub mixed_site: u32,
}

impl Default for ExpnGlobals {
    /// Call site is the unmapped token id.
    fn default() -> Self {
        ExpnGlobals {
            def_site: 0,
            call_site: u32::MAX,
            mixed_site: 0,
        }
    }
}

/// A message from the expander.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Response {
    ExpandMacro(Result<FlatTree, PanicMessage>),
    ApiVersionCheck(u32),
}

/// The macro panicked or reported a compile error.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PanicMessage(pub String);
