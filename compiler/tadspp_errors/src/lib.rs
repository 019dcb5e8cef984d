//! The preprocessor/tokenizer's diagnostic sink.
//!
//! Corresponds to `SPEC_FULL.md` §7 (error handling design) and the error
//! sink half of §6 (collaborator interfaces). Severities, counting and the
//! `TOO_MANY_ERRORS` ceiling are modeled here; the rendering path leans on
//! `annotate-snippets` and `termcolor`, matching `rustc_errors`'s own
//! dependency stack (see `SPEC_FULL.md` §10.2).

mod diagnostic;
mod render;
mod severity;
mod sink;

pub use diagnostic::{Diagnostic, Location};
pub use render::{format_diagnostic, word_wrap};
pub use severity::Severity;
pub use sink::{DiagnosticSink, Fatal, SinkConfig, DEFAULT_MAX_ERRORS};
