//! The mechanical lexing layer: physical-line reading, continuation
//! splicing, comment erasure, string splicing, and final tokenization.
//!
//! Corresponds to `SourceStream`, `LineAssembler` and `Tokenizer` in
//! `SPEC_FULL.md` §2.1 and §4. Nothing in this crate knows about macros,
//! `#if`, or includes — that's `tadspp_pp`.

mod charset;
mod embed;
mod line_assembler;
mod newline_spacing;
mod number;
mod quote_scan;
pub mod sentinel;
mod source_stream;
mod string;
mod token;
mod tokenizer;

pub use charset::{CharsetDecoder, Utf8Decoder};
pub use embed::{EmbedFrame, EmbedStack, EmbedTooDeep, StrFamily, MAX_EMBED_DEPTH};
pub use line_assembler::LineAssembler;
pub use newline_spacing::NewlineSpacing;
pub use number::{scan_number, NumberScan};
pub use quote_scan::{scan_string_tail, StringScan};
pub use source_stream::SourceStream;
pub use string::{opening_run_len, scan_body, BodyScan};
pub use token::{Keyword, Token, TokenKind, TokenText};
pub use tokenizer::Tokenizer;
