use tadspp_errors::{Diagnostic, DiagnosticSink, Fatal};
use tadspp_span::{FileDescTable, FileId, SourceArena, SourcePos};
use unicode_xid::UnicodeXID;

use crate::embed::{EmbedStack, StrFamily};
use crate::line_assembler::LineAssembler;
use crate::number::scan_number;
use crate::source_stream::SourceStream;
use crate::string::{opening_run_len, scan_body, BodyScan};
use crate::token::{Keyword, Token, TokenKind, TokenText};

/// `SPEC_FULL.md` §4.5/§8: identifiers longer than this are truncated in the
/// emitted token's text (the original source span still consumes the full
/// identifier), with a warning diagnostic.
const MAX_IDENT_LEN: usize = 80;

/// Where a [`Tokenizer`] gets its next logical line from.
///
/// `Raw` drives the crate's own `SourceStream`/`LineAssembler` over one
/// complete, undecorated file — the single-file case, and what every
/// `tadspp_lexer` unit test below exercises directly. `PreAssembled` takes
/// lines someone else already assembled (and, typically, macro-expanded),
/// each pre-tagged with the file it physically came from; this is what
/// `tadspp::preprocess` uses to keep tokens from an `#include`d file
/// attributed to that file instead of the root (`SPEC_FULL.md` §3/§8).
enum LineFeed {
    Raw { source: SourceStream, assembler: LineAssembler },
    PreAssembled { lines: std::vec::IntoIter<(FileId, u32, String)> },
}

/// The mechanical lexer: turns a decoded source file into a stream of
/// [`Token`]s. Knows nothing about macros, `#if`/`#include`, or formal
/// parameters — that's `tadspp_pp`'s job (`SPEC_FULL.md` §2.1, §4).
///
/// Mirrors `rustc_lexer`'s `Cursor` in spirit: one big `next_token` match
/// over the current character, operating on text that's already been
/// assembled into logical lines.
pub struct Tokenizer {
    feed: LineFeed,
    /// The file the line currently being scanned came from. Tracks
    /// `source.file()` for `LineFeed::Raw`, and whatever the most recently
    /// pulled pre-assembled line was tagged with for `LineFeed::PreAssembled`.
    current_file: FileId,
    line: Vec<char>,
    line_no: u32,
    pos: usize,
    embed: EmbedStack,
    at_eof: bool,
}

impl Tokenizer {
    pub fn new(file: FileId, decoded_contents: &str) -> Self {
        Self {
            feed: LineFeed::Raw {
                source: SourceStream::new(file, decoded_contents),
                assembler: LineAssembler::new(),
            },
            current_file: file,
            line: Vec::new(),
            line_no: 0,
            pos: 0,
            embed: EmbedStack::new(),
            at_eof: false,
        }
    }

    /// Builds a tokenizer over lines that have already been assembled
    /// elsewhere, each tagged with the file it physically came from.
    /// `first_file` seeds `file()` before the first line is pulled.
    pub fn from_preassembled_lines(first_file: FileId, lines: Vec<(FileId, u32, String)>) -> Self {
        Self {
            feed: LineFeed::PreAssembled { lines: lines.into_iter() },
            current_file: first_file,
            line: Vec::new(),
            line_no: 0,
            pos: 0,
            embed: EmbedStack::new(),
            at_eof: false,
        }
    }

    pub fn file(&self) -> FileId {
        self.current_file
    }

    fn pos_here(&self) -> SourcePos {
        SourcePos::new(self.current_file, self.line_no)
    }

    fn refill(&mut self, files: &FileDescTable, diags: &mut DiagnosticSink) -> Result<bool, Fatal> {
        match &mut self.feed {
            LineFeed::Raw { source, assembler } => {
                let start_line = source.next_line_no();
                match assembler.assemble(source, files, diags)? {
                    Some(s) => {
                        self.line = s.chars().collect();
                        self.line_no = start_line;
                        self.pos = 0;
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }
            LineFeed::PreAssembled { lines } => match lines.next() {
                Some((file, line_no, s)) => {
                    self.current_file = file;
                    self.line = s.chars().collect();
                    self.line_no = line_no;
                    self.pos = 0;
                    Ok(true)
                }
                None => Ok(false),
            },
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.line.len() && matches!(self.line[self.pos], ' ' | '\t') {
            self.pos += 1;
        }
    }

    /// Fetches the next token. Returns an [`TokenKind::Eof`] token forever
    /// once the underlying file is exhausted.
    pub fn next_token(
        &mut self,
        files: &FileDescTable,
        arena: &mut SourceArena,
        diags: &mut DiagnosticSink,
    ) -> Result<Token, Fatal> {
        loop {
            if self.pos >= self.line.len() {
                if self.at_eof {
                    return Ok(Token::eof(self.pos_here()));
                }
                if !self.refill(files, diags)? {
                    self.at_eof = true;
                    return Ok(Token::eof(self.pos_here()));
                }
                continue;
            }

            self.skip_whitespace();
            if self.pos >= self.line.len() {
                continue;
            }

            let start = self.pos;
            let pos = self.pos_here();
            let c = self.line[start];

            if c.is_ascii_digit() {
                let scan = scan_number(&self.line, start);
                let text: String = self.line[start..start + scan.chars_consumed].iter().collect();
                self.pos += scan.chars_consumed;
                if scan.bad_octal_digit {
                    diags.report(
                        Diagnostic::error(2001, format!("`{text}` is not a valid octal number"))
                            .at(files.by_id(self.current_file).displayed.clone(), pos.line),
                    )?;
                }
                let mut tok = Token::new(scan.kind, self.arena_text(&text, arena), pos);
                tok.int_value = scan.int_value;
                return Ok(tok);
            }

            if is_ident_start(c) {
                let mut end = start + 1;
                while end < self.line.len() && is_ident_continue(self.line[end]) {
                    end += 1;
                }
                let full_text: String = self.line[start..end].iter().collect();

                if full_text == "R" && matches!(self.line.get(end), Some('"') | Some('\'')) {
                    self.pos = end;
                    return self.scan_regex(files, arena, diags, pos);
                }

                self.pos = end;

                let text = if full_text.len() > MAX_IDENT_LEN {
                    let mut cut = MAX_IDENT_LEN;
                    while !full_text.is_char_boundary(cut) {
                        cut -= 1;
                    }
                    let truncated = full_text[..cut].to_string();
                    diags.report(
                        Diagnostic::warning(
                            2005,
                            format!(
                                "identifier `{truncated}...` is longer than {MAX_IDENT_LEN} bytes; truncated"
                            ),
                        )
                        .at(files.by_id(self.current_file).displayed.clone(), pos.line),
                    )?;
                    truncated
                } else {
                    full_text
                };

                if let Some(kw) = Keyword::from_text(&text) {
                    return Ok(Token::new(TokenKind::Keyword(kw), TokenText::Static(kw.text()), pos));
                }
                return Ok(Token::new(TokenKind::Sym, self.arena_text(&text, arena), pos));
            }

            if c == '"' || c == '\'' {
                return self.scan_quoted(files, arena, diags, pos, c);
            }

            if c == '>' && self.line.get(self.pos + 1) == Some(&'>') && self.embed.closes_on_gtgt() {
                self.pos += 2;
                let frame = self.embed.pop().expect("closes_on_gtgt implies a frame");
                return self.resume_string(files, arena, diags, pos, frame.closing_quote, frame.triple, frame.family);
            }

            return Ok(self.scan_operator(pos));
        }
    }

    /// Parser-driven recovery (`SPEC_FULL.md` §4.6 `assume_missing_str_cont`):
    /// treat the current position as though a `>>` had just closed the
    /// innermost embedded expression, resuming the enclosing string's body.
    /// Used when what looked like an unterminated string is more likely a
    /// missed `>>`.
    pub fn assume_missing_str_cont(
        &mut self,
        files: &FileDescTable,
        arena: &mut SourceArena,
        diags: &mut DiagnosticSink,
    ) -> Result<Token, Fatal> {
        let pos = self.pos_here();
        let Some(frame) = self.embed.pop() else {
            return Ok(Token::new(TokenKind::Invalid, TokenText::Static(""), pos));
        };
        self.resume_string(files, arena, diags, pos, frame.closing_quote, frame.triple, frame.family)
    }

    fn arena_text(&self, text: &str, arena: &mut SourceArena) -> TokenText {
        match arena.alloc(text.as_bytes()) {
            Ok(r) => TokenText::Arena(r),
            Err(_) => TokenText::Owned(text.into()),
        }
    }

    fn scan_quoted(
        &mut self,
        files: &FileDescTable,
        arena: &mut SourceArena,
        diags: &mut DiagnosticSink,
        pos: SourcePos,
        quote: char,
    ) -> Result<Token, Fatal> {
        let family = if quote == '"' { StrFamily::Double } else { StrFamily::Single };
        let open_len = opening_run_len(&self.line, self.pos, quote);
        let triple = open_len == 3;
        self.pos += open_len;
        self.emit_body(files, arena, diags, pos, quote, triple, family, true)
    }

    fn resume_string(
        &mut self,
        files: &FileDescTable,
        arena: &mut SourceArena,
        diags: &mut DiagnosticSink,
        pos: SourcePos,
        quote: char,
        triple: bool,
        family: StrFamily,
    ) -> Result<Token, Fatal> {
        self.emit_body(files, arena, diags, pos, quote, triple, family, false)
    }

    /// Scans a literal-text span (either the start of a string/regex, or a
    /// resumption after an embedded expression), emitting the right
    /// Start/Mid/End/plain token kind and pushing a new embed frame on the
    /// way into another `<<expr>>`.
    #[allow(clippy::too_many_arguments)]
    fn emit_body(
        &mut self,
        files: &FileDescTable,
        arena: &mut SourceArena,
        diags: &mut DiagnosticSink,
        pos: SourcePos,
        quote: char,
        triple: bool,
        family: StrFamily,
        is_first: bool,
    ) -> Result<Token, Fatal> {
        match scan_body(&self.line, self.pos, quote, triple, true) {
            BodyScan::Closed { body_end, total_end } => {
                let text: String = self.line[self.pos..body_end].iter().collect();
                self.pos = total_end;
                let kind = if is_first {
                    match family {
                        StrFamily::Double => TokenKind::DStr,
                        StrFamily::Single => TokenKind::SStr,
                    }
                } else {
                    family.end_kind()
                };
                Ok(Token::new(kind, self.arena_text(&text, arena), pos))
            }
            BodyScan::EmbedStart { body_end } => {
                let text: String = self.line[self.pos..body_end].iter().collect();
                self.pos = body_end + 2;
                if self.embed.push(quote, triple, family).is_err() {
                    diags.report(
                        Diagnostic::error(2002, "embedded expressions nested too deeply")
                            .at(files.by_id(self.current_file).displayed.clone(), pos.line),
                    )?;
                }
                let kind = if is_first {
                    match family {
                        StrFamily::Double => TokenKind::DStrStart,
                        StrFamily::Single => TokenKind::SStrStart,
                    }
                } else {
                    family.mid_kind()
                };
                Ok(Token::new(kind, self.arena_text(&text, arena), pos))
            }
            BodyScan::Unterminated => {
                let text: String = self.line[self.pos..].iter().collect();
                self.pos = self.line.len();
                diags.report(
                    Diagnostic::error(2003, "unterminated string or regex literal")
                        .at(files.by_id(self.current_file).displayed.clone(), pos.line),
                )?;
                let kind = if is_first {
                    match family {
                        StrFamily::Double => TokenKind::DStr,
                        StrFamily::Single => TokenKind::SStr,
                    }
                } else {
                    family.end_kind()
                };
                Ok(Token::new(kind, self.arena_text(&text, arena), pos))
            }
        }
    }

    fn scan_regex(
        &mut self,
        files: &FileDescTable,
        arena: &mut SourceArena,
        diags: &mut DiagnosticSink,
        pos: SourcePos,
    ) -> Result<Token, Fatal> {
        let quote = self.line[self.pos];
        let open_len = opening_run_len(&self.line, self.pos, quote);
        let triple = open_len == 3;
        self.pos += open_len;
        match scan_body(&self.line, self.pos, quote, triple, false) {
            BodyScan::Closed { body_end, total_end } => {
                let text: String = self.line[self.pos..body_end].iter().collect();
                self.pos = total_end;
                Ok(Token::new(TokenKind::Regex, self.arena_text(&text, arena), pos))
            }
            BodyScan::Unterminated => {
                let text: String = self.line[self.pos..].iter().collect();
                self.pos = self.line.len();
                diags.report(
                    Diagnostic::error(2004, "unterminated regex literal")
                        .at(files.by_id(self.current_file).displayed.clone(), pos.line),
                )?;
                Ok(Token::new(TokenKind::Regex, self.arena_text(&text, arena), pos))
            }
            BodyScan::EmbedStart { .. } => unreachable!("regex scanning never allows embedding"),
        }
    }

    fn scan_operator(&mut self, pos: SourcePos) -> Token {
        let rest: String = self.line[self.pos..].iter().take(4).collect();
        for (lit, kind) in FOUR_CHAR_OPS {
            if rest.starts_with(*lit) {
                self.pos += lit.chars().count();
                return Token::new(*kind, TokenText::Static(*lit), pos);
            }
        }
        for (lit, kind) in THREE_CHAR_OPS {
            if rest.starts_with(*lit) {
                self.pos += lit.chars().count();
                return Token::new(*kind, TokenText::Static(*lit), pos);
            }
        }
        for (lit, kind) in TWO_CHAR_OPS {
            if rest.starts_with(*lit) {
                self.pos += lit.chars().count();
                return Token::new(*kind, TokenText::Static(*lit), pos);
            }
        }

        let c = self.line[self.pos];
        self.pos += 1;
        let opened = matches!(c, '(' | '[' | '{');
        let closed = matches!(c, ')' | ']' | '}');
        if opened {
            self.embed.open_bracket();
        } else if closed {
            self.embed.close_bracket();
        }
        let (kind, text): (TokenKind, &'static str) = match c {
            '(' => (TokenKind::LParen, "("),
            ')' => (TokenKind::RParen, ")"),
            '{' => (TokenKind::LBrace, "{"),
            '}' => (TokenKind::RBrace, "}"),
            '[' => (TokenKind::LBracket, "["),
            ']' => (TokenKind::RBracket, "]"),
            ',' => (TokenKind::Comma, ","),
            ';' => (TokenKind::Semi, ";"),
            ':' => (TokenKind::Colon, ":"),
            '.' => (TokenKind::Dot, "."),
            '?' => (TokenKind::Question, "?"),
            '+' => (TokenKind::Plus, "+"),
            '-' => (TokenKind::Minus, "-"),
            '*' => (TokenKind::Star, "*"),
            '/' => (TokenKind::Slash, "/"),
            '%' => (TokenKind::Percent, "%"),
            '&' => (TokenKind::Amp, "&"),
            '|' => (TokenKind::Pipe, "|"),
            '^' => (TokenKind::Caret, "^"),
            '~' => (TokenKind::Tilde, "~"),
            '!' => (TokenKind::Bang, "!"),
            '=' => (TokenKind::Assign, "="),
            '<' => (TokenKind::Lt, "<"),
            '>' => (TokenKind::Gt, ">"),
            '#' => (TokenKind::Hash, "#"),
            '@' => (TokenKind::At, "@"),
            _ => (TokenKind::Invalid, ""),
        };
        let text = if text.is_empty() {
            TokenText::Owned(c.to_string().into())
        } else {
            TokenText::Static(text)
        };
        Token::new(kind, text, pos)
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || UnicodeXID::is_xid_start(c)
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || UnicodeXID::is_xid_continue(c)
}

const FOUR_CHAR_OPS: &[(&str, TokenKind)] = &[(">>>=", TokenKind::Shr3Eq)];

const THREE_CHAR_OPS: &[(&str, TokenKind)] = &[
    (">>>", TokenKind::Shr3),
    (">>=", TokenKind::ShrEq),
    ("<<=", TokenKind::ShlEq),
    ("...", TokenKind::DotDotDot),
];

const TWO_CHAR_OPS: &[(&str, TokenKind)] = &[
    ("::", TokenKind::ColonColon),
    ("..", TokenKind::DotDot),
    ("->", TokenKind::Arrow),
    ("??", TokenKind::QQ),
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::NotEq),
    ("<=", TokenKind::LtEq),
    (">=", TokenKind::GtEq),
    ("<<", TokenKind::Shl),
    (">>", TokenKind::Shr),
    ("+=", TokenKind::PlusEq),
    ("-=", TokenKind::MinusEq),
    ("*=", TokenKind::StarEq),
    ("/=", TokenKind::SlashEq),
    ("%=", TokenKind::PercentEq),
    ("&=", TokenKind::AmpEq),
    ("|=", TokenKind::PipeEq),
    ("^=", TokenKind::CaretEq),
    ("&&", TokenKind::AmpAmp),
    ("||", TokenKind::PipePipe),
    ("++", TokenKind::PlusPlus),
    ("--", TokenKind::MinusMinus),
    ("##", TokenKind::HashHash),
    ("#@", TokenKind::HashAt),
];

#[cfg(test)]
mod tests {
    use super::*;
    use tadspp_errors::SinkConfig;
    use tadspp_span::SourceArena;

    fn run(src: &str) -> (Vec<TokenKind>, Vec<String>) {
        let mut files = FileDescTable::new();
        let id = files.resolve("f.t", "f.t", false);
        let mut tok = Tokenizer::new(id, src);
        let mut arena = SourceArena::new();
        let mut diags = DiagnosticSink::buffered(SinkConfig::default());
        let mut kinds = Vec::new();
        let mut texts = Vec::new();
        loop {
            let t = tok.next_token(&files, &mut arena, &mut diags).unwrap();
            if t.is_eof() {
                break;
            }
            texts.push(t.text(&arena).to_owned());
            kinds.push(t.kind);
        }
        (kinds, texts)
    }

    #[test]
    fn identifier_of_exactly_80_bytes_is_not_truncated() {
        let name = "a".repeat(80);
        let (kinds, texts) = run(&name);
        assert_eq!(kinds, vec![TokenKind::Sym]);
        assert_eq!(texts, vec![name]);
    }

    #[test]
    fn identifier_of_81_bytes_is_truncated_with_warning() {
        let name = "a".repeat(81);
        let mut files = FileDescTable::new();
        let id = files.resolve("f.t", "f.t", false);
        let mut tok = Tokenizer::new(id, &name);
        let mut arena = SourceArena::new();
        let mut diags = DiagnosticSink::buffered(SinkConfig::default());
        let t = tok.next_token(&files, &mut arena, &mut diags).unwrap();
        assert_eq!(t.kind, TokenKind::Sym);
        assert_eq!(t.text(&arena), "a".repeat(80));
        assert_eq!(diags.warning_count(), 1);
    }

    #[test]
    fn preassembled_lines_keep_each_tokens_own_file() {
        let mut files = FileDescTable::new();
        let main = files.resolve("main.t", "main.t", false);
        let inc = files.resolve("inc.t", "inc.t", false);
        let mut tok = Tokenizer::from_preassembled_lines(
            main,
            vec![
                (main, 1, "x = 1;".to_string()),
                (inc, 1, "y = 2;".to_string()),
                (main, 2, "z = 3;".to_string()),
            ],
        );
        let mut arena = SourceArena::new();
        let mut diags = DiagnosticSink::buffered(SinkConfig::default());
        let mut files_seen = Vec::new();
        loop {
            let t = tok.next_token(&files, &mut arena, &mut diags).unwrap();
            if t.is_eof() {
                break;
            }
            files_seen.push(t.pos.file);
        }
        // x = 1 ; y = 2 ; z = 3 ;
        assert_eq!(
            files_seen,
            vec![main, main, main, main, inc, inc, inc, inc, main, main, main, main]
        );
    }

    #[test]
    fn scans_keyword_and_identifier() {
        let (kinds, texts) = run("function main");
        assert_eq!(kinds, vec![TokenKind::Keyword(Keyword::Function), TokenKind::Sym]);
        assert_eq!(texts, vec!["function", "main"]);
    }

    #[test]
    fn scans_integer_and_operator() {
        let (kinds, texts) = run("x = 42 + 1;");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Sym,
                TokenKind::Assign,
                TokenKind::Int,
                TokenKind::Plus,
                TokenKind::Int,
                TokenKind::Semi,
            ]
        );
        assert_eq!(texts[2], "42");
    }

    #[test]
    fn scans_shift_operators_distinctly() {
        let (kinds, _) = run("a >>> b >>= c << d <<= e");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Sym,
                TokenKind::Shr3,
                TokenKind::Sym,
                TokenKind::ShrEq,
                TokenKind::Sym,
                TokenKind::Shl,
                TokenKind::Sym,
                TokenKind::ShlEq,
                TokenKind::Sym,
            ]
        );
    }

    #[test]
    fn scans_plain_double_quoted_string() {
        let (kinds, texts) = run(r#"x = "hello";"#);
        assert_eq!(kinds[2], TokenKind::DStr);
        assert_eq!(texts[2], "hello");
    }

    #[test]
    fn scans_embedded_expression_in_string() {
        let (kinds, texts) = run(r#""count: <<n>> done""#);
        assert_eq!(
            kinds,
            vec![TokenKind::DStrStart, TokenKind::Sym, TokenKind::DStrEnd]
        );
        assert_eq!(texts, vec!["count: ", "n", " done"]);
    }

    #[test]
    fn nested_gt_inside_embed_brackets_does_not_close_it() {
        let (kinds, _) = run(r#""x: <<a[b>>2]>> done""#);
        // `>>` inside the `[...]` is an ordinary Shr, only the final `>>`
        // closes the embedding.
        assert_eq!(
            kinds,
            vec![
                TokenKind::DStrStart,
                TokenKind::Sym,
                TokenKind::LBracket,
                TokenKind::Sym,
                TokenKind::Shr,
                TokenKind::Int,
                TokenKind::RBracket,
                TokenKind::DStrEnd,
            ]
        );
    }

    #[test]
    fn scans_regex_literal_without_embedding() {
        let (kinds, texts) = run(r#"rexReplace(R'a<<b', x, '')"#);
        assert_eq!(kinds[2], TokenKind::Regex);
        assert_eq!(texts[2], "a<<b");
    }

    #[test]
    fn scans_triple_quoted_string_with_embedded_quotes() {
        // The closing run of 4 quotes after `hi` is >= 3, so the whole run
        // terminates the string; the run of 2 quotes before `hi` is short
        // of 3 and so is ordinary body text.
        let (kinds, texts) = run(r#"x = """she said ""hi""""; "#);
        assert_eq!(kinds[2], TokenKind::DStr);
        assert_eq!(texts[2], "she said \"\"hi");
    }

    #[test]
    fn assume_missing_str_cont_resumes_the_enclosing_string() {
        let mut files = FileDescTable::new();
        let id = files.resolve("f.t", "f.t", false);
        // The embedded expression never sees its own `>>`; the parser
        // notices `n` was the whole expression (the next char is a bare
        // `"`, not `>>`) and calls the recovery hook instead of letting the
        // tokenizer open a fresh string literal there.
        let mut tok = Tokenizer::new(id, r#""count: <<n" done"#);
        let mut arena = SourceArena::new();
        let mut diags = DiagnosticSink::buffered(SinkConfig::default());

        let start = tok.next_token(&files, &mut arena, &mut diags).unwrap();
        assert_eq!(start.kind, TokenKind::DStrStart);
        let sym = tok.next_token(&files, &mut arena, &mut diags).unwrap();
        assert_eq!(sym.kind, TokenKind::Sym);

        let resumed = tok.assume_missing_str_cont(&files, &mut arena, &mut diags).unwrap();
        assert_eq!(resumed.kind, TokenKind::DStrEnd);
        assert_eq!(resumed.text(&arena), "");

        let after = tok.next_token(&files, &mut arena, &mut diags).unwrap();
        assert_eq!(after.kind, TokenKind::Sym);
        assert_eq!(after.text(&arena), "done");
    }

    #[test]
    fn reports_unterminated_string() {
        let mut files = FileDescTable::new();
        let id = files.resolve("f.t", "f.t", false);
        let mut tok = Tokenizer::new(id, "x = \"oops\n");
        let mut arena = SourceArena::new();
        let mut diags = DiagnosticSink::buffered(SinkConfig::default());
        loop {
            let t = tok.next_token(&files, &mut arena, &mut diags).unwrap();
            if t.is_eof() {
                break;
            }
        }
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn golden_token_stream_for_a_small_function_body() {
        let (kinds, texts) = run(r#"function f(x) { return x + 1 > 0 ? "yes" : "no"; }"#);
        let rendered: String = kinds
            .iter()
            .zip(texts.iter())
            .map(|(k, t)| format!("{k:?}({t:?})\n"))
            .collect();
        expect_test::expect![[r#"
            Keyword(Function)("function")
            Sym("f")
            LParen("(")
            Sym("x")
            RParen(")")
            LBrace("{")
            Keyword(Return)("return")
            Sym("x")
            Plus("+")
            Int("1")
            Gt(">")
            Int("0")
            Question("?")
            DStr("yes")
            Colon(":")
            DStr("no")
            Semi(";")
            RBrace("}")
        "#]]
        .assert_eq(&rendered);
    }
}
