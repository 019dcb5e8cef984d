//! Parsed macro bodies.
//!
//! The original compiler parses a macro's replacement text once, at
//! `#define` time, into a token stream salted with the sentinel bytes from
//! `tadspp_lexer::sentinel` (`FORMAL_FLAG` and friends) so that expansion
//! never re-scans raw text for formal names. This crate keeps that same
//! "parse once, substitute many times" shape, but represents the parsed
//! body as a plain `Vec<BodyElem>` instead of a sentinel-salted byte string
//! — the sentinel bytes themselves are reserved for the on-disk debug macro
//! table (`SPEC_FULL.md` §4.4, §9), not for this in-memory form.

use rustc_hash::FxHashMap;

/// One piece of a parsed macro body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BodyElem {
    /// Literal text, copied through unchanged.
    Text(String),
    /// A formal parameter reference, substituted with the caller's actual
    /// argument text.
    Formal(usize),
    /// `#formal`: the argument, stringized (quoted, with embedded quotes
    /// and backslashes escaped).
    Stringize(usize),
    /// `#@formal`: the argument, stringized without the surrounding
    /// quotes (embedded quotes/backslashes still escaped).
    StringizeRaw(usize),
    /// `##`: paste marker. Suppresses the whitespace that would otherwise
    /// separate the surrounding elements' substituted text.
    Paste,
    /// `#argcount`: the number of actual arguments bound to the trailing
    /// variadic formal.
    Argcount,
    /// `#foreach (sep) body #endforeach`: repeats `body` once per variadic
    /// argument, substituting that single argument for the variadic
    /// formal within `body`, joined by `sep`.
    Foreach { sep: Vec<BodyElem>, body: Vec<BodyElem> },
    /// `#ifempty body #endif`: `body` only if the variadic argument list is
    /// empty.
    IfEmpty(Vec<BodyElem>),
    /// `#ifnempty body #endif`: `body` only if the variadic argument list
    /// is non-empty.
    IfNEmpty(Vec<BodyElem>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MacroDefinition {
    pub name: String,
    pub function_like: bool,
    pub formals: Vec<String>,
    /// `Some(formal_index)` when the last formal is variadic (written
    /// `args...` at the `#define` site).
    pub variadic: Option<usize>,
    pub body: Vec<BodyElem>,
}

impl MacroDefinition {
    pub fn object_like(name: impl Into<String>, body: Vec<BodyElem>) -> Self {
        Self { name: name.into(), function_like: false, formals: Vec::new(), variadic: None, body }
    }

    /// Two macro definitions are "the same" for ANSI-C redefinition
    /// checking when their formal lists and body both match exactly
    /// (`SPEC_FULL.md` §4.3).
    pub fn same_as(&self, other: &MacroDefinition) -> bool {
        self.function_like == other.function_like
            && self.formals == other.formals
            && self.variadic == other.variadic
            && self.body == other.body
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyParseError {
    pub message: &'static str,
}

/// Parses a macro's raw replacement text into a [`BodyElem`] sequence.
///
/// `formals` maps formal-parameter names to their index for fast lookup
/// while scanning.
pub fn parse_body(text: &str, formals: &[String]) -> Result<Vec<BodyElem>, BodyParseError> {
    let index: FxHashMap<&str, usize> =
        formals.iter().enumerate().map(|(i, f)| (f.as_str(), i)).collect();
    let chars: Vec<char> = text.chars().collect();
    let mut p = Parser { chars: &chars, pos: 0, index: &index };
    p.parse_sequence(None)
}

struct Parser<'a> {
    chars: &'a [char],
    pos: usize,
    index: &'a FxHashMap<&'a str, usize>,
}

impl<'a> Parser<'a> {
    fn parse_sequence(&mut self, stop_word: Option<&str>) -> Result<Vec<BodyElem>, BodyParseError> {
        let mut out = Vec::new();
        let mut text = String::new();

        loop {
            if self.pos >= self.chars.len() {
                if stop_word.is_some() {
                    return Err(BodyParseError { message: "unterminated macro body construct" });
                }
                break;
            }

            if self.chars[self.pos] == '#' {
                if let Some(word) = self.peek_directive_word() {
                    if Some(word.as_str()) == stop_word {
                        flush(&mut text, &mut out);
                        self.consume_word(&word);
                        return Ok(out);
                    }
                    match word.as_str() {
                        "foreach" => {
                            flush(&mut text, &mut out);
                            self.consume_word("foreach");
                            out.push(self.parse_foreach()?);
                            continue;
                        }
                        "ifempty" => {
                            flush(&mut text, &mut out);
                            self.consume_word("ifempty");
                            let body = self.parse_sequence(Some("endif"))?;
                            out.push(BodyElem::IfEmpty(body));
                            continue;
                        }
                        "ifnempty" => {
                            flush(&mut text, &mut out);
                            self.consume_word("ifnempty");
                            let body = self.parse_sequence(Some("endif"))?;
                            out.push(BodyElem::IfNEmpty(body));
                            continue;
                        }
                        "argcount" => {
                            flush(&mut text, &mut out);
                            self.consume_word("argcount");
                            out.push(BodyElem::Argcount);
                            continue;
                        }
                        _ => {}
                    }
                }

                if self.chars.get(self.pos + 1) == Some(&'#') {
                    flush(&mut text, &mut out);
                    out.push(BodyElem::Paste);
                    self.pos += 2;
                    continue;
                }

                let raw = self.chars.get(self.pos + 1) == Some(&'@');
                let ident_start = if raw { self.pos + 2 } else { self.pos + 1 };
                if let Some(name) = self.ident_at(ident_start) {
                    if let Some(&idx) = self.index.get(name.as_str()) {
                        flush(&mut text, &mut out);
                        self.pos = ident_start + name.chars().count();
                        out.push(if raw { BodyElem::StringizeRaw(idx) } else { BodyElem::Stringize(idx) });
                        continue;
                    }
                }
            }

            if let Some(name) = self.ident_at(self.pos) {
                if let Some(&idx) = self.index.get(name.as_str()) {
                    flush(&mut text, &mut out);
                    self.pos += name.chars().count();
                    out.push(BodyElem::Formal(idx));
                    continue;
                }
                text.push_str(&name);
                self.pos += name.chars().count();
                continue;
            }

            text.push(self.chars[self.pos]);
            self.pos += 1;
        }

        flush(&mut text, &mut out);
        Ok(out)
    }

    fn parse_foreach(&mut self) -> Result<BodyElem, BodyParseError> {
        self.skip_ws();
        if self.chars.get(self.pos) != Some(&'(') {
            return Err(BodyParseError { message: "#foreach expects `(separator)`" });
        }
        self.pos += 1;
        let sep_start = self.pos;
        let mut depth = 1;
        while self.pos < self.chars.len() && depth > 0 {
            match self.chars[self.pos] {
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            }
            if depth > 0 {
                self.pos += 1;
            }
        }
        if depth != 0 {
            return Err(BodyParseError { message: "unterminated #foreach separator" });
        }
        let sep_text: String = self.chars[sep_start..self.pos].iter().collect();
        self.pos += 1; // consume ')'
        let mut sep_parser = Parser { chars: &sep_text.chars().collect::<Vec<_>>(), pos: 0, index: self.index };
        let sep = sep_parser.parse_sequence(None)?;

        let body = self.parse_sequence(Some("endforeach"))?;
        Ok(BodyElem::Foreach { sep, body })
    }

    fn peek_directive_word(&self) -> Option<String> {
        let mut p = self.pos + 1;
        if self.chars.get(p) == Some(&'@') {
            return None;
        }
        self.ident_at(p).filter(|w| {
            matches!(w.as_str(), "foreach" | "ifempty" | "ifnempty" | "argcount" | "endif" | "endforeach")
        })
    }

    fn consume_word(&mut self, word: &str) {
        self.pos += 1 + word.chars().count();
    }

    fn ident_at(&self, start: usize) -> Option<String> {
        let c0 = *self.chars.get(start)?;
        if !(c0.is_alphabetic() || c0 == '_') {
            return None;
        }
        let mut end = start + 1;
        while self.chars.get(end).is_some_and(|c| c.is_alphanumeric() || *c == '_') {
            end += 1;
        }
        Some(self.chars[start..end].iter().collect())
    }

    fn skip_ws(&mut self) {
        while self.chars.get(self.pos).is_some_and(|c| c.is_whitespace()) {
            self.pos += 1;
        }
    }
}

fn flush(text: &mut String, out: &mut Vec<BodyElem>) {
    if !text.is_empty() {
        out.push(BodyElem::Text(std::mem::take(text)));
    }
}
