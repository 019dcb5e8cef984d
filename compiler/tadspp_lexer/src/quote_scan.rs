//! Shared quote-run scanning used by both the line assembler (to decide
//! whether a string needs another physical line spliced in) and the
//! tokenizer's string scanner (to find where a string literal actually
//! ends). Keeping one implementation means both layers agree on what
//! "still open" means (`SPEC_FULL.md` §4.2 step 4, §4.5).

/// Outcome of scanning for the end of an already-open string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringScan {
    /// The string closes within the scanned text; `end` is the byte offset
    /// just past the closing quote run.
    Closed { end: usize },
    /// The string is still open at the end of the scanned text.
    StillOpen,
}

/// Scans `s` (text *after* the opening quote) for where a string opened
/// with `quote` (and, if `triple`, opened with a run of three or more)
/// closes.
///
/// Triple-quoted bodies may contain unescaped runs of one or two quote
/// characters; only a run of three or more terminates the string, and any
/// quotes beyond the last three in an over-long run belong to the body
/// (`SPEC_FULL.md` §4.5, §8 "Triple-quoted string" boundary case). A
/// backslash escapes either a single following character, or — in a
/// triple-quoted context — the entire run of consecutive quote characters
/// that follows it.
pub fn scan_string_tail(s: &str, quote: char, triple: bool) -> StringScan {
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0usize;
    let mut byte_offsets = Vec::with_capacity(chars.len() + 1);
    let mut acc = 0usize;
    for c in &chars {
        byte_offsets.push(acc);
        acc += c.len_utf8();
    }
    byte_offsets.push(acc);

    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            if triple && i + 1 < chars.len() && chars[i + 1] == quote {
                let mut j = i + 1;
                while j < chars.len() && chars[j] == quote {
                    j += 1;
                }
                i = j;
            } else {
                i += if i + 1 < chars.len() { 2 } else { 1 };
            }
            continue;
        }

        if c == quote {
            let start = i;
            let mut j = i;
            while j < chars.len() && chars[j] == quote {
                j += 1;
            }
            let run_len = j - start;
            if triple {
                if run_len >= 3 {
                    return StringScan::Closed { end: byte_offsets[j] };
                }
                i = j;
                continue;
            } else {
                return StringScan::Closed { end: byte_offsets[start + 1] };
            }
        }

        i += 1;
    }

    StringScan::StillOpen
}
