/// Decodes raw bytes in some input character set into UTF-8.
///
/// The preprocessor treats character-set transcoding as a collaborator
/// (`SPEC_FULL.md` §1 non-goals, §6): real charset tables are out of
/// scope, but the seam is a trait so a host can plug one in. CR/CRLF
/// normalization to LF is performed here, matching `SPEC_FULL.md` §4.1
/// ("CR and CRLF are normalized upstream by the character-set decoder").
pub trait CharsetDecoder {
    fn name(&self) -> &str;
    fn decode(&self, bytes: &[u8]) -> String;
}

/// The default decoder: treats input as UTF-8 (lossily, so malformed bytes
/// don't abort the whole file) and normalizes line endings.
#[derive(Clone, Copy, Default)]
pub struct Utf8Decoder;

impl CharsetDecoder for Utf8Decoder {
    fn name(&self) -> &str {
        "utf-8"
    }

    fn decode(&self, bytes: &[u8]) -> String {
        let raw = String::from_utf8_lossy(bytes);
        normalize_newlines(&raw)
    }
}

fn normalize_newlines(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(c);
        }
    }
    out
}
