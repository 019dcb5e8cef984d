//! The host-provided collaborator traits (`SPEC_FULL.md` §6): what this
//! crate needs from its embedder, kept narrow and trait-object-friendly so a
//! driver (or, eventually, a full TADS compiler) can supply its own
//! filesystem, I/O, and expression-parsing behavior.

use std::io;

use tadspp_lexer::{CharsetDecoder, Utf8Decoder};
use tadspp_pp::IncludeLoader;

/// Opens files and picks a decoder for a requested character-set name.
///
/// A `None` charset means "ask the OS host"; this implementation treats
/// every charset name, known or not, as UTF-8 (with lossy replacement),
/// which is sufficient for every fixture and test file in this tree. A
/// future host wanting real `cp1252`-style remapping supplies its own
/// `CharsetDecoder` here — the seam is already in place.
pub trait ResourceLoader {
    fn open(&self, raw_path: &str) -> io::Result<Vec<u8>>;

    fn decoder(&self, charset: Option<&str>) -> HostCharsetDecoder {
        match charset {
            Some(name) => HostCharsetDecoder::Named(name.to_string()),
            None => HostCharsetDecoder::Utf8(Utf8Decoder),
        }
    }
}

/// The decoder actually handed to [`tadspp_pp::DirectiveProcessor`].
///
/// `Named` records the requested charset for `__CHARSET__`-style
/// diagnostics and for `#charset`'s own record-only bookkeeping
/// (`tadspp_pp`'s `requested_charset()`), but decodes identically to
/// `Utf8`: an honest limitation, not a silent one — see `DESIGN.md`.
pub enum HostCharsetDecoder {
    Utf8(Utf8Decoder),
    Named(String),
}

impl CharsetDecoder for HostCharsetDecoder {
    fn name(&self) -> &str {
        match self {
            HostCharsetDecoder::Utf8(d) => d.name(),
            HostCharsetDecoder::Named(name) => name,
        }
    }

    fn decode(&self, bytes: &[u8]) -> String {
        match self {
            HostCharsetDecoder::Utf8(d) => d.decode(bytes),
            HostCharsetDecoder::Named(_) => Utf8Decoder.decode(bytes),
        }
    }
}

/// Bridges a [`ResourceLoader`] to `tadspp_pp`'s narrower
/// [`IncludeLoader`]. A local newtype, not a blanket impl: `IncludeLoader`
/// and `ResourceLoader` each live in a different crate from this one, so a
/// generic `impl<T: ResourceLoader> IncludeLoader for T` would violate the
/// orphan rule. Wrapping instead costs one indirection and no generics.
pub struct LoaderAdapter<'l, R: ResourceLoader>(pub &'l R);

impl<'l, R: ResourceLoader> IncludeLoader for LoaderAdapter<'l, R> {
    fn load(&self, raw_path: &str) -> io::Result<Vec<u8>> {
        self.0.open(raw_path)
    }
}

/// Minimal stdio abstraction so the core never calls `println!` directly
/// (`SPEC_FULL.md` §6).
pub trait HostInterface {
    fn print_msg(&mut self, msg: &str);
    fn print_err(&mut self, msg: &str);
    fn print_step(&mut self, msg: &str);
}

/// A real TADS expression parser, consulted for `#if` in the original
/// implementation. This crate's own `#if`/`#elif` evaluation is
/// self-contained (`tadspp_pp::eval_cond_expr`) and does not call through
/// this trait — parsing full TADS expressions is out of this crate's scope
/// (`SPEC_FULL.md` §1 Non-goals). The trait exists as the forward-looking
/// collaborator surface a future full parser would implement, with
/// `set_pragma_c` kept as a no-op hook exactly as the original leaves its
/// own (disabled) `#pragma C` support in place.
pub trait ExprParser {
    fn parse_expr(&mut self, text: &str) -> Result<i64, String>;
    fn set_source_text_group_mode(&mut self, _enabled: bool) {}
    fn set_pragma_c(&mut self, _enabled: bool) {}
}
