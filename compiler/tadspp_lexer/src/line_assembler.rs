use tadspp_errors::{Diagnostic, DiagnosticSink, Fatal};
use tadspp_span::{FileDescTable, SourcePos};

use crate::newline_spacing::NewlineSpacing;
use crate::quote_scan::{scan_string_tail, StringScan};
use crate::sentinel::is_sentinel_byte;
use crate::source_stream::SourceStream;

/// Produces preprocessor logical lines from a [`SourceStream`]: joins
/// backslash-continuations, erases comments, splices strings that cross
/// newlines, and scrubs reserved sentinel bytes out of raw input
/// (`SPEC_FULL.md` §4.2).
#[derive(Default)]
pub struct LineAssembler;

impl LineAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Assembles the next logical line, or returns `Ok(None)` at end of
    /// file.
    pub fn assemble(
        &self,
        stream: &mut SourceStream,
        files: &FileDescTable,
        diags: &mut DiagnosticSink,
    ) -> Result<Option<String>, Fatal> {
        let Some(mut raw) = stream.next_physical_line() else {
            return Ok(None);
        };
        let start_line = stream.next_line_no().saturating_sub(1);

        // --- 1. continuation splice ---
        loop {
            match continuation_suffix(&raw) {
                Continuation::None => break,
                Continuation::Clean(stripped) => {
                    raw = stripped;
                    match stream.next_physical_line() {
                        Some(next) => raw.push_str(&next),
                        None => break,
                    }
                }
                Continuation::TrailingWhitespace(stripped) => {
                    diags.report(
                        Diagnostic::pedantic(
                            1001,
                            "whitespace follows line-continuation backslash; it may not have \
                             been intended",
                        )
                        .at(display_name(files, stream), stream.next_line_no()),
                    )?;
                    raw = stripped;
                    match stream.next_physical_line() {
                        Some(next) => raw.push_str(&next),
                        None => break,
                    }
                }
            }
        }

        // --- 2. comment erasure (may itself pull more physical lines) ---
        let mut out = String::with_capacity(raw.len());
        let (erased, nested) = erase_comments_chunk(&raw, &mut stream.in_comment);
        out.push_str(&erased);
        if nested {
            diags.report(
                Diagnostic::warning(1002, "`/*` found inside a comment; comments do not nest")
                    .at(display_name(files, stream), start_line),
            )?;
        }
        while stream.in_comment {
            match stream.next_physical_line() {
                Some(next) => {
                    let (erased, nested) = erase_comments_chunk(&next, &mut stream.in_comment);
                    out.push_str(&erased);
                    if nested {
                        diags.report(
                            Diagnostic::warning(
                                1002,
                                "`/*` found inside a comment; comments do not nest",
                            )
                            .at(display_name(files, stream), stream.next_line_no()),
                        )?;
                    }
                }
                None => {
                    diags.report(
                        Diagnostic::error(1003, "unterminated comment at end of file")
                            .at(display_name(files, stream), stream.next_line_no()),
                    )?;
                    stream.in_comment = false;
                    break;
                }
            }
        }

        // --- 3. sentinel scrub ---
        let scrubbed = scrub_sentinels(&out);

        // --- 4. string splicing ---
        let spliced = self.splice_strings(scrubbed, stream, files, diags)?;

        Ok(Some(spliced))
    }

    fn splice_strings(
        &self,
        mut line: String,
        stream: &mut SourceStream,
        files: &FileDescTable,
        diags: &mut DiagnosticSink,
    ) -> Result<String, Fatal> {
        loop {
            let Some((quote, triple, body_start)) = find_open_string_start(&line) else {
                return Ok(line);
            };

            match scan_string_tail(&line[body_start..], quote, triple) {
                StringScan::Closed { .. } => return Ok(line),
                StringScan::StillOpen => {
                    let Some(next) = stream.next_physical_line() else {
                        diags.report(
                            Diagnostic::error(
                                1004,
                                "unterminated string literal at end of file",
                            )
                            .at(display_name(files, stream), stream.next_line_no()),
                        )?;
                        line.push(quote);
                        return Ok(line);
                    };

                    let trimmed = next.trim_start();
                    if trimmed == "}" || trimmed == ";" {
                        diags.report(
                            Diagnostic::error(
                                1005,
                                "unterminated string literal; closing implicitly before a \
                                 stray `}` or `;`",
                            )
                            .at(display_name(files, stream), stream.next_line_no()),
                        )?;
                        line.push(quote);
                        stream.unsplice(next);
                        return Ok(line);
                    }

                    let scrubbed_next = scrub_sentinels(&next);
                    match stream.newline_spacing {
                        NewlineSpacing::Collapse => {
                            line.push(' ');
                            line.push_str(scrubbed_next.trim_start());
                        }
                        NewlineSpacing::Delete => {
                            line.push_str(scrubbed_next.trim_start());
                        }
                        NewlineSpacing::Preserve => {
                            line.push_str("\\n");
                            line.push_str(&scrubbed_next);
                        }
                    }
                }
            }
        }
    }
}

fn display_name(files: &FileDescTable, stream: &SourceStream) -> String {
    files.by_id(stream.file()).displayed.clone()
}

enum Continuation {
    None,
    Clean(String),
    TrailingWhitespace(String),
}

fn continuation_suffix(s: &str) -> Continuation {
    if let Some(stripped) = s.strip_suffix('\\') {
        return Continuation::Clean(stripped.to_owned());
    }
    let trimmed = s.trim_end_matches([' ', '\t']);
    if let Some(stripped) = trimmed.strip_suffix('\\') {
        if trimmed.len() != s.len() {
            return Continuation::TrailingWhitespace(stripped.to_owned());
        }
    }
    Continuation::None
}

/// Erases comments within a single already-joined chunk (one
/// continuation-resolved physical line, or one extra line pulled while a
/// block comment was still open). `//` always erases to the end of the
/// chunk it's found in, matching the fact that a chunk boundary is always
/// a genuine physical-line end.
fn erase_comments_chunk(s: &str, in_comment: &mut bool) -> (String, bool) {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    let mut nested_warn = false;

    while i < chars.len() {
        if *in_comment {
            if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                *in_comment = false;
                out.push(' ');
                i += 2;
            } else {
                if chars[i] == '/' && chars.get(i + 1) == Some(&'*') {
                    nested_warn = true;
                }
                i += 1;
            }
            continue;
        }

        if chars[i] == '/' && chars.get(i + 1) == Some(&'/') {
            break;
        }
        if chars[i] == '/' && chars.get(i + 1) == Some(&'*') {
            *in_comment = true;
            i += 2;
            continue;
        }
        // Skip over string literals so a quote/comment char inside one
        // isn't misread as starting a comment.
        if chars[i] == '"' || chars[i] == '\'' {
            let quote = chars[i];
            out.push(chars[i]);
            i += 1;
            while i < chars.len() {
                out.push(chars[i]);
                if chars[i] == '\\' && i + 1 < chars.len() {
                    i += 1;
                    out.push(chars[i]);
                    i += 1;
                    continue;
                }
                if chars[i] == quote {
                    i += 1;
                    break;
                }
                i += 1;
            }
            continue;
        }

        out.push(chars[i]);
        i += 1;
    }

    (out, nested_warn)
}

fn scrub_sentinels(s: &str) -> String {
    s.chars()
        .map(|c| if (c as u32) < 256 && is_sentinel_byte(c as u8) { ' ' } else { c })
        .collect()
}

/// Finds the start of an unterminated string at the end of `line`, if any:
/// returns `(quote_char, is_triple, byte_offset_of_body_start)`.
fn find_open_string_start(line: &str) -> Option<(char, bool, usize)> {
    let chars: Vec<char> = line.chars().collect();
    let byte_offsets: Vec<usize> = {
        let mut v = Vec::with_capacity(chars.len() + 1);
        let mut acc = 0;
        for c in &chars {
            v.push(acc);
            acc += c.len_utf8();
        }
        v.push(acc);
        v
    };

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '"' || c == '\'' {
            let start = i;
            let mut j = i;
            while j < chars.len() && chars[j] == c {
                j += 1;
            }
            let run_len = j - start;
            let triple = run_len >= 3;
            let body_start_idx = if triple { j } else { start + 1 };
            match scan_string_tail(
                &line[byte_offsets[body_start_idx]..],
                c,
                triple,
            ) {
                StringScan::Closed { end } => {
                    i = body_start_idx + char_count(&line[byte_offsets[body_start_idx]..][..end]);
                    continue;
                }
                StringScan::StillOpen => {
                    return Some((c, triple, byte_offsets[body_start_idx]));
                }
            }
        }
        i += 1;
    }
    None
}

fn char_count(s: &str) -> usize {
    s.chars().count()
}

/// Kept for callers that only need a file/line for a diagnostic without a
/// live stream; mirrors `SourcePos` construction used throughout
/// `tadspp_pp`.
pub fn pos_of(stream: &SourceStream, line: u32) -> SourcePos {
    SourcePos::new(stream.file(), line)
}
