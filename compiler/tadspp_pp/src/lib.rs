//! Macro expansion and directive processing: `#define`, `#if`/`#ifdef`,
//! `#include`, `#line`, `#pragma` and friends, layered on top of the
//! mechanical scanning in `tadspp_lexer` (`SPEC_FULL.md` §2.1, §4).
//!
//! [`DirectiveProcessor`] is the crate's entry point: it drives an
//! [`IncludeLoader`] and a [`tadspp_lexer::CharsetDecoder`] across a stack
//! of open files, tracking `#if` state and macro definitions, and hands
//! back fully macro-expanded, conditionally-filtered logical lines for a
//! downstream tokenizer to consume.

mod cond_expr;
mod directive;
mod expander;
mod if_stack;
mod include_stack;
mod macro_def;
mod macro_table;
mod predefined;

pub use cond_expr::{eval as eval_cond_expr, resolve_defined, CondExprError};
pub use directive::{DirectiveProcessor, IncludeLoader};
pub use expander::{ExpandDiagnostic, ExpandSeverity, MacroExpander, TOK_MAX_MACRO_ARGS};
pub use if_stack::{BranchState, IfStack, IfStackError, MAX_IF_DEPTH};
pub use include_stack::{IncludeFrame, IncludeStack, IncludeStackError, MAX_INCLUDE_DEPTH};
pub use macro_def::{BodyElem, BodyParseError, MacroDefinition, parse_body};
pub use macro_table::{DefineOutcome, MacroTable};
pub use predefined::{format_now, substitute as substitute_predefined, MACRO_FORMAT_VERSION};
