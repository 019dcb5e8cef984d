//! Top-level preprocessor/tokenizer facade (`SPEC_FULL.md` §2, §2.1).
//!
//! Ties `tadspp_lexer` (mechanical scanning) and `tadspp_pp` (directive
//! processing and macro expansion) together behind a single [`TokenStream`]
//! a parser can drive, plus the host collaborator traits
//! ([`ResourceLoader`], [`HostInterface`], [`ExprParser`]) and the two
//! persisted-artifact writers (debug macro table, string capture).

mod collaborators;
mod config;
mod debug_table;
mod preprocessor;
mod string_capture;
mod token_stream;

pub use collaborators::{ExprParser, HostCharsetDecoder, HostInterface, LoaderAdapter, ResourceLoader};
pub use config::PpConfig;
pub use debug_table::{read_debug_table, write_debug_table, DebugMacroEntry};
pub use preprocessor::{list_includes, preprocess, PreprocessedUnit};
pub use string_capture::capture_strings;
pub use token_stream::{TokenSource, TokenStream};
