//! The expansion orchestrator.
//!
//! One call runs through these phases, each logged at `trace`:
//!
//! ```text
//! encoding_input -> awaiting_version -> awaiting_response -> decoding_output -> done
//! ```
//!
//! `awaiting_version` is free once the server's version is cached. Any phase
//! can fail; the failure is classified into an [`ExpansionError`] and nothing
//! partial is returned.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use pmx_proto::{ExpandMacro, PanicMessage, ProcMacroServer, Request, Response, TransportError};
use pmx_tt::{FlatTree, MappedSubtree, MappedText, RangeMap, Subtree};
use tracing::{debug, debug_span, error, trace, warn};

use crate::fixup::{fixup_syntax_errors, SyntaxNode};
use crate::{recover, to_mapped_text, CancellationFlag, ExpanderConfig, ExpansionError};

/// Turns source text into token trees and syntax trees.
///
/// Lexing and parsing live outside this crate.
pub trait SyntaxProducer: Send + Sync {
    /// Lower `text` to a token tree.
    ///
    /// Ids are assigned left to right starting at `first_id`. Token map
    /// offsets are `start_offset` plus the offset in `text`.
    fn token_tree(&self, text: &str, start_offset: usize, first_id: usize) -> MappedSubtree;

    /// Parse `text` as an item, for the syntax-error fixup. `None` if it
    /// isn't one.
    fn parse_item(&self, text: &str) -> Option<SyntaxNode>;
}

/// A proc macro exported by a compiled proc-macro crate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProcMacroDef {
    pub name: String,
    /// Path of the proc-macro dylib.
    pub lib: String,
}

/// Input of a proc-macro invocation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MacroCallBody {
    /// `foo!(...)`. The text is the contents of the delimiters.
    FunctionLike { text: String },
    /// `#[derive(Foo)]` on `item`.
    Derive { item: MappedText },
    /// `#[foo(attr)]` on `item`.
    Attribute { item: MappedText, attr: MappedText },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MacroCall {
    pub body: MacroCallBody,
    /// Environment of the crate being expanded.
    pub env: BTreeMap<String, String>,
}

/// Expands proc-macro calls through an out-of-process expander.
///
/// Holds no per-call state; one instance can serve concurrent callers.
pub struct ProcMacroExpander<P> {
    server: Option<Arc<ProcMacroServer>>,
    producer: P,
    config: ExpanderConfig,
}

/// Transport failures worth an `error!` are reported once per process.
static TRANSPORT_FAILURE_REPORTED: AtomicBool = AtomicBool::new(false);

impl<P: SyntaxProducer> ProcMacroExpander<P> {
    /// `server` is `None` when no expander executable is available.
    pub fn new(server: Option<Arc<ProcMacroServer>>, producer: P, config: ExpanderConfig) -> Self {
        ProcMacroExpander {
            server,
            producer,
            config,
        }
    }

    pub fn config(&self) -> &ExpanderConfig {
        &self.config
    }

    /// Expand `call` to source text, with ranges mapping the text back to the
    /// offsets of the call's input.
    pub fn expand(
        &self,
        def: &ProcMacroDef,
        call: &MacroCall,
    ) -> Result<(String, RangeMap), ExpansionError> {
        self.expand_with(def, call, None)
    }

    /// [`Self::expand`], discarding the result if `cancel` is set by the
    /// time the expander answers.
    pub fn expand_cancellable(
        &self,
        def: &ProcMacroDef,
        call: &MacroCall,
        cancel: &CancellationFlag,
    ) -> Result<(String, RangeMap), ExpansionError> {
        self.expand_with(def, call, Some(cancel))
    }

    /// Expand already-lowered token trees. The result is decoded but not
    /// span-recovered.
    pub fn expand_as_tt(
        &self,
        body: &Subtree,
        attributes: Option<&Subtree>,
        macro_name: &str,
        lib: &str,
        env: &BTreeMap<String, String>,
    ) -> Result<Subtree, ExpansionError> {
        let span = debug_span!("proc_macro_expand", macro_name);
        let _guard = span.enter();
        let result = self
            .server()
            .and_then(|server| self.expand_tt(server, body, attributes, macro_name, lib, env));
        log_outcome(&result);
        result
    }

    fn expand_with(
        &self,
        def: &ProcMacroDef,
        call: &MacroCall,
        cancel: Option<&CancellationFlag>,
    ) -> Result<(String, RangeMap), ExpansionError> {
        let span = debug_span!("proc_macro_expand", macro_name = %def.name);
        let _guard = span.enter();
        let result = self.run(def, call, cancel);
        log_outcome(&result);
        result
    }

    fn run(
        &self,
        def: &ProcMacroDef,
        call: &MacroCall,
        cancel: Option<&CancellationFlag>,
    ) -> Result<(String, RangeMap), ExpansionError> {
        let server = self.server()?;
        if matches!(call.body, MacroCallBody::FunctionLike { .. })
            && !self.config.function_like_enabled
        {
            return Err(ExpansionError::ExpansionDisabled);
        }

        trace!(phase = "encoding_input");
        let (body_text, attr_text) = match &call.body {
            MacroCallBody::FunctionLike { text } => (MappedText::single(text.as_str(), 0), None),
            MacroCallBody::Derive { item } => (item.clone(), None),
            MacroCallBody::Attribute { item, attr } => (self.fixup(item), Some(attr)),
        };

        let body = self.producer.token_tree(&body_text.text, 0, 0);
        let (attributes, token_map, ranges) = match attr_text {
            Some(attr) => {
                // Attribute offsets go after everything the body maps to.
                let start_offset = body_text.ranges.max_dst_end().map_or(0, |end| end + 1);
                let lowered =
                    self.producer
                        .token_tree(&attr.text, start_offset, body.token_map.len());
                let mut ranges = body_text.ranges;
                ranges.extend(&attr.ranges.shift_dst_right(start_offset));
                let mut attributes = lowered.subtree;
                attributes.delimiter = None;
                (
                    Some(attributes),
                    body.token_map.merge(lowered.token_map),
                    ranges,
                )
            }
            None => (None, body.token_map, body_text.ranges),
        };

        let response = self.expand_tt(
            server,
            &body.subtree,
            attributes.as_ref(),
            &def.name,
            &def.lib,
            &call.env,
        );
        if cancel.is_some_and(CancellationFlag::is_cancelled) {
            return Err(ExpansionError::Cancelled);
        }
        let mut expansion = response?;

        recover(&mut expansion, &token_map);
        let (text, expansion_ranges) = to_mapped_text(&expansion, &token_map);
        trace!(phase = "done", len = text.len());
        Ok((text, ranges.map_all(&expansion_ranges)))
    }

    fn expand_tt(
        &self,
        server: &ProcMacroServer,
        body: &Subtree,
        attributes: Option<&Subtree>,
        macro_name: &str,
        lib: &str,
        env: &BTreeMap<String, String>,
    ) -> Result<Subtree, ExpansionError> {
        trace!(phase = "awaiting_version");
        let version = server
            .request_version(self.config.timeout)
            .map_err(|err| self.classify(err))?;

        let request = Request::ExpandMacro(ExpandMacro::new(
            FlatTree::from_subtree(body, version),
            macro_name,
            attributes.map(|attributes| FlatTree::from_subtree(attributes, version)),
            lib,
            env,
        ));

        trace!(phase = "awaiting_response", ?version);
        let response = server
            .send(&request, self.config.timeout)
            .map_err(|err| self.classify(err))?;

        trace!(phase = "decoding_output");
        match response {
            Response::ExpandMacro(Ok(flat)) => flat.to_subtree(version).map_err(|err| {
                ExpansionError::ServerSideError(format!("malformed expansion: {err}"))
            }),
            Response::ExpandMacro(Err(PanicMessage(message))) => {
                Err(ExpansionError::ServerSideError(message))
            }
            Response::ApiVersionCheck(_) => Err(ExpansionError::ServerSideError(
                "expander answered an expansion with a version check".to_owned(),
            )),
        }
    }

    fn server(&self) -> Result<&ProcMacroServer, ExpansionError> {
        if !self.config.enabled {
            return Err(ExpansionError::ExpansionDisabled);
        }
        self.server
            .as_deref()
            .ok_or(ExpansionError::ExecutableNotFound)
    }

    fn fixup(&self, item: &MappedText) -> MappedText {
        if !self.config.fixup_syntax_errors {
            return item.clone();
        }
        match self.producer.parse_item(&item.text) {
            Some(node) => fixup_syntax_errors(item, &node),
            None => item.clone(),
        }
    }

    fn classify(&self, err: TransportError) -> ExpansionError {
        match err {
            TransportError::Timeout => ExpansionError::Timeout(self.config.timeout),
            TransportError::ProcessCreation(err) => {
                warn!(%err, "failed to run proc-macro expander process");
                ExpansionError::CantRunExpander
            }
            TransportError::ProcessAborted { exit_code } => {
                report_once(&format!("proc-macro expander aborted (exit code {exit_code:?})"));
                ExpansionError::ProcessAborted(exit_code)
            }
            TransportError::Io(err) => {
                report_once(&format!("error communicating with proc-macro expander: {err}"));
                ExpansionError::IoError
            }
            TransportError::UnknownProtocolVersion(version) => {
                ExpansionError::UnsupportedExpanderVersion(version)
            }
        }
    }
}

fn report_once(message: &str) {
    if !TRANSPORT_FAILURE_REPORTED.swap(true, Ordering::Relaxed) {
        error!("{message}");
    }
}

fn log_outcome<T>(result: &Result<T, ExpansionError>) {
    if let Err(err) = result {
        if err.is_expected() {
            debug!(%err, "expansion produced no output");
        }
    }
}
