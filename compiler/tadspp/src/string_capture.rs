//! The optional string-capture artifact (`SPEC_FULL.md` §6): every tokenized
//! string's body, one per line, meant for a localization pipeline scanning
//! a compiled game for translatable text without re-parsing TADS source.
//!
//! The original re-encodes each captured body from UTF-8 into the source's
//! default character set on the way out (`CharmapToLocal`). Since
//! [`crate::collaborators::HostCharsetDecoder`] does not yet implement real
//! charset remapping — it decodes every named charset as UTF-8, an honest,
//! documented limitation — this writer emits UTF-8 bytes unchanged. A host
//! wanting real remapping swaps in its own encode step here.

use tadspp_lexer::{Token, TokenKind};
use tadspp_span::SourceArena;

fn is_string_kind(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::SStr
            | TokenKind::DStr
            | TokenKind::SStrStart
            | TokenKind::SStrMid
            | TokenKind::SStrEnd
            | TokenKind::DStrStart
            | TokenKind::DStrMid
            | TokenKind::DStrEnd
    )
}

/// Escapes embedded newlines and backslashes so a multi-line string body
/// still occupies exactly one line of the capture file.
fn escape_for_line(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    for c in body.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// Builds the capture file's contents from every string-bearing token
/// produced during tokenization. Callers collect tokens as they drive a
/// [`crate::token_stream::TokenStream`] (or any other source of
/// [`Token`]s) and pass them here at the end of the run.
pub fn capture_strings<'a, I: IntoIterator<Item = &'a Token>>(tokens: I, arena: &SourceArena) -> Vec<u8> {
    let mut out = Vec::new();
    for tok in tokens {
        if is_string_kind(tok.kind) {
            out.extend_from_slice(escape_for_line(tok.text(arena)).as_bytes());
            out.push(b'\n');
        }
    }
    out
}
