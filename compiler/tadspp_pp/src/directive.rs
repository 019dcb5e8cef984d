//! Ties the macro table, expander, if-stack and include-stack together by
//! driving a `#`-directive-aware loop over logical lines
//! (`SPEC_FULL.md` §4: "directive processing").
//!
//! Directives are recognized at the text level, before tokenization:
//! a logical line whose first non-whitespace character is `#` is a
//! directive line and is consumed here; everything else is macro-expanded
//! and handed to the caller as preprocessed source text, to be tokenized
//! separately. This mirrors the original's interleaving of expansion and
//! scanning while keeping the implementation string-based end to end (see
//! the note atop `expander.rs`).

use tadspp_errors::{Diagnostic, DiagnosticSink, Fatal};
use tadspp_lexer::{CharsetDecoder, Utf8Decoder};
use tadspp_span::{FileDescTable, FileId};

use crate::cond_expr::{eval, resolve_defined};
use crate::expander::{ExpandSeverity, MacroExpander};
use crate::if_stack::IfStack;
use crate::include_stack::IncludeStack;
use crate::macro_def::{parse_body, MacroDefinition};
use crate::macro_table::{DefineOutcome, MacroTable};
use crate::predefined;

/// Loads the raw bytes of an `#include`d file. The directive processor
/// applies its own [`CharsetDecoder`] to the result, so this trait never
/// deals in encoding.
pub trait IncludeLoader {
    fn load(&self, raw_path: &str) -> std::io::Result<Vec<u8>>;
}

pub struct DirectiveProcessor<'l, L: IncludeLoader, D: CharsetDecoder = Utf8Decoder> {
    files: FileDescTable,
    loader: &'l L,
    decoder: D,
    macros: MacroTable,
    if_stack: IfStack,
    includes: IncludeStack,
    requested_charset: Option<String>,
    /// `__DATE__`/`__TIME__`, captured once when the run starts (matching a
    /// C preprocessor: these reflect when preprocessing began, not the time
    /// of each expansion).
    build_date: String,
    build_time: String,
    /// Test-report mode: `__FILE__` and diagnostics use basenames only, so
    /// golden output doesn't embed an absolute or CI-specific path.
    test_report: bool,
    /// Preprocess-only mode: `#line`, `#pragma message`, `#error`, and
    /// `#pragma C` are retained in the output text instead of being
    /// consumed silently (`SPEC_FULL.md` §6).
    preprocess_only: bool,
    /// Set by `handle_directive` when a directive should be echoed
    /// verbatim into the output under `preprocess_only`; consumed by
    /// `next_logical_line` right after the call.
    pending_passthrough: Option<String>,
    /// The most recently processed physical line's display name and line
    /// number, kept so a diagnostic raised after every include frame has
    /// closed (an unbalanced `#if` discovered only at end-of-input) still
    /// has a location to report against.
    last_location: (String, u32),
}

impl<'l, L: IncludeLoader> DirectiveProcessor<'l, L, Utf8Decoder> {
    pub fn new(loader: &'l L) -> Self {
        Self::with_decoder(loader, Utf8Decoder)
    }
}

impl<'l, L: IncludeLoader, D: CharsetDecoder> DirectiveProcessor<'l, L, D> {
    pub fn with_decoder(loader: &'l L, decoder: D) -> Self {
        let (build_date, build_time) = crate::predefined::format_now(std::time::SystemTime::now());
        Self {
            files: FileDescTable::new(),
            loader,
            decoder,
            macros: MacroTable::new(),
            if_stack: IfStack::new(),
            includes: IncludeStack::new(),
            requested_charset: None,
            build_date,
            build_time,
            test_report: false,
            preprocess_only: false,
            pending_passthrough: None,
            last_location: (String::new(), 0),
        }
    }

    pub fn set_test_report(&mut self, enabled: bool) {
        self.test_report = enabled;
    }

    pub fn set_preprocess_only(&mut self, enabled: bool) {
        self.preprocess_only = enabled;
    }

    pub fn macros_mut(&mut self) -> &mut MacroTable {
        &mut self.macros
    }

    pub fn files(&self) -> &FileDescTable {
        &self.files
    }

    pub fn macros(&self) -> &MacroTable {
        &self.macros
    }

    pub fn requested_charset(&self) -> Option<&str> {
        self.requested_charset.as_deref()
    }

    /// Opens the root translation unit. Must be called exactly once,
    /// before the first `next_logical_line`. Returns the root file's id,
    /// for a caller that wants to register a synthetic file sharing its
    /// identity (the flattened, fully-preprocessed text, for instance).
    pub fn open_root(&mut self, raw_path: &str, contents: &str) -> FileId {
        let file = self.files.resolve(raw_path, raw_path, false);
        self.includes.push(file, contents).expect("root push never exceeds the include depth limit");
        file
    }

    /// Consumes the processor, handing back the file table (now populated
    /// with every file touched via `#include`) and the final macro table,
    /// for a caller building a downstream artifact (a token stream, a
    /// debug macro table) that needs to outlive this processor.
    pub fn into_parts(self) -> (FileDescTable, MacroTable) {
        (self.files, self.macros)
    }

    /// Produces the next preprocessed logical line, tagged with the file
    /// and (1-based) line number it physically came from: conditionally
    /// filtered, directive-stripped, macro-expanded. Returns `Ok(None)`
    /// once every open file has been exhausted.
    ///
    /// The `FileId`/line are threaded through rather than assumed to match
    /// the root file, so a downstream tokenizer can attribute tokens from
    /// an `#include`d file to that file instead of the includer
    /// (`SPEC_FULL.md` §3/§8: source position is preserved through every
    /// transformation, and is monotonic within one file).
    pub fn next_logical_line(
        &mut self,
        diags: &mut DiagnosticSink,
    ) -> Result<Option<(FileId, u32, String)>, Fatal> {
        loop {
            let Some(frame) = self.includes.current_mut() else {
                let (file, line) = self.last_location.clone();
                self.if_stack
                    .check_balanced_at_eof()
                    .map_err(|e| self.fatal_at(diags, 4099, e.message, &file, line))?;
                return Ok(None);
            };
            let file = frame.file;
            let display = frame
                .display_name_override
                .clone()
                .unwrap_or_else(|| self.files.by_id(file).displayed.clone());
            let display = if self.test_report { basename(&display).to_string() } else { display };
            let start_line = frame.stream.next_line_no();
            self.last_location = (display.clone(), start_line);

            let assembled = frame.assembler.assemble(&mut frame.stream, &self.files, diags)?;
            let Some(line) = assembled else {
                let balanced = self.if_stack.check_balanced_for_file(file);
                self.includes.pop();
                balanced.map_err(|e| self.fatal_at(diags, 4001, e.message, &display, start_line))?;
                continue;
            };
            let line = predefined::substitute(&line, &display, start_line, &self.build_date, &self.build_time);

            let trimmed = line.trim_start();
            if let Some(rest) = trimmed.strip_prefix('#') {
                self.handle_directive(file, &display, start_line, rest.trim_start(), diags)?;
                if let Some(text) = self.pending_passthrough.take() {
                    return Ok(Some((file, start_line, text)));
                }
                continue;
            }

            if !self.if_stack.active() {
                continue;
            }

            let mut expander = MacroExpander::new(&self.macros);
            let (expanded, expand_diags) = expander.expand(&line);
            for d in expand_diags {
                let diag = match d.severity {
                    ExpandSeverity::Warning => Diagnostic::warning(4100, d.message),
                    ExpandSeverity::Error => Diagnostic::error(4100, d.message),
                };
                diags.report(diag.at(display.clone(), start_line))?;
            }
            return Ok(Some((file, start_line, expanded)));
        }
    }

    fn fatal_at(&self, diags: &mut DiagnosticSink, code: u32, message: &str, file: &str, line: u32) -> Fatal {
        match diags.report(Diagnostic::fatal(code, message.to_string()).at(file.to_string(), line)) {
            Err(f) => f,
            Ok(()) => unreachable!("fatal diagnostics always return Err"),
        }
    }

    fn handle_directive(
        &mut self,
        file: FileId,
        display: &str,
        line: u32,
        text: &str,
        diags: &mut DiagnosticSink,
    ) -> Result<(), Fatal> {
        let (word, rest) = split_word(text);

        // Directives that toggle conditional state must run even while an
        // enclosing branch is inactive, so the matching #endif is still
        // seen; everything else is skipped while inactive.
        match word {
            "if" => {
                let cond = self.eval_condition(rest, display, line, diags)?;
                self.if_stack
                    .push_if(file, cond)
                    .map_err(|e| self.fatal_at(diags, 4002, e.message, display, line))?;
                return Ok(());
            }
            "ifdef" => {
                let name = rest.trim();
                let cond = self.macros.is_defined(name);
                self.if_stack
                    .push_if(file, cond)
                    .map_err(|e| self.fatal_at(diags, 4002, e.message, display, line))?;
                return Ok(());
            }
            "ifndef" => {
                let name = rest.trim();
                let cond = !self.macros.is_defined(name);
                self.if_stack
                    .push_if(file, cond)
                    .map_err(|e| self.fatal_at(diags, 4002, e.message, display, line))?;
                return Ok(());
            }
            "elif" => {
                let cond = self.eval_condition(rest, display, line, diags)?;
                self.if_stack
                    .elif(file, cond)
                    .map_err(|e| self.fatal_at(diags, 4003, e.message, display, line))?;
                return Ok(());
            }
            "else" => {
                self.if_stack.else_branch().map_err(|e| self.fatal_at(diags, 4004, e.message, display, line))?;
                return Ok(());
            }
            "endif" => {
                self.if_stack.end_if().map_err(|e| self.fatal_at(diags, 4005, e.message, display, line))?;
                return Ok(());
            }
            _ => {}
        }

        if !self.if_stack.active() {
            return Ok(());
        }

        match word {
            "define" => self.handle_define(rest, display, line, diags),
            "undef" => {
                self.macros.undefine(rest.trim());
                Ok(())
            }
            "include" => self.handle_include(rest, display, line, diags),
            "error" => Err(self.fatal_at(diags, 4010, rest.trim(), display, line)),
            "pragma" => self.handle_pragma(rest, display, line, diags),
            "line" => {
                if self.preprocess_only {
                    self.pending_passthrough = Some(format!("#line {rest}"));
                }
                self.handle_line(rest)
            }
            "charset" => {
                self.requested_charset = Some(rest.trim().trim_matches('"').to_string());
                Ok(())
            }
            "" => Ok(()), // a bare `#` on its own line is a no-op
            other => {
                diags.report(
                    Diagnostic::warning(4020, format!("unrecognized preprocessor directive `#{other}`"))
                        .at(display.to_string(), line),
                )
            }
        }
    }

    /// Evaluates a `#if`/`#elif` condition. A condition that fails to
    /// expand or parse defaults to *true* with a reported diagnostic
    /// (`SPEC_FULL.md` §4.3): treating a malformed condition as false would
    /// silently exclude code the author expected to keep, which is worse
    /// than surfacing the problem and compiling it anyway.
    fn eval_condition(
        &self,
        text: &str,
        display: &str,
        line: u32,
        diags: &mut DiagnosticSink,
    ) -> Result<bool, Fatal> {
        let table = &self.macros;
        let resolved = resolve_defined(text, |name| table.is_defined(name));
        let mut expander = MacroExpander::new(&self.macros);
        let (expanded, expand_diags) = expander.expand(&resolved);
        for d in expand_diags {
            let diag = match d.severity {
                ExpandSeverity::Warning => Diagnostic::warning(4100, d.message),
                ExpandSeverity::Error => Diagnostic::error(4100, d.message),
            };
            diags.report(diag.at(display.to_string(), line))?;
        }

        match eval(&expanded) {
            Ok(v) => Ok(v != 0),
            Err(e) => {
                diags.report(
                    Diagnostic::error(
                        4102,
                        format!("malformed preprocessor condition `{text}`: {}; treated as true", e.message),
                    )
                    .at(display.to_string(), line),
                )?;
                Ok(true)
            }
        }
    }

    fn handle_define(
        &mut self,
        rest: &str,
        display: &str,
        line: u32,
        diags: &mut DiagnosticSink,
    ) -> Result<(), Fatal> {
        let rest = rest.trim_start();
        let name_end = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if name_end == 0 {
            return diags.report(
                Diagnostic::error(4030, "#define requires a macro name").at(display.to_string(), line),
            );
        }
        let name = &rest[..name_end];
        let after_name = &rest[name_end..];

        let (function_like, formals, variadic, body_text) = if after_name.starts_with('(') {
            match parse_formal_list(after_name) {
                Ok((formals, variadic, body_text)) => (true, formals, variadic, body_text),
                Err(msg) => {
                    return diags.report(Diagnostic::error(4031, msg).at(display.to_string(), line));
                }
            }
        } else {
            (false, Vec::new(), None, after_name.trim_start())
        };

        let body = match parse_body(body_text, &formals) {
            Ok(b) => b,
            Err(e) => {
                return diags.report(
                    Diagnostic::error(4032, format!("malformed macro body: {}", e.message))
                        .at(display.to_string(), line),
                );
            }
        };

        let def = MacroDefinition { name: name.to_string(), function_like, formals, variadic, body };
        match self.macros.define(def) {
            DefineOutcome::New | DefineOutcome::IdenticalRedefinition => Ok(()),
            DefineOutcome::ChangedRedefinition => diags.report(
                Diagnostic::warning(4033, format!("`{name}` redefined with a different body"))
                    .at(display.to_string(), line),
            ),
        }
    }

    fn handle_include(
        &mut self,
        rest: &str,
        display: &str,
        line: u32,
        diags: &mut DiagnosticSink,
    ) -> Result<(), Fatal> {
        let rest = rest.trim();
        let quoted = rest.len() >= 2 && rest.starts_with('"') && rest.ends_with('"');
        let angled = rest.len() >= 2 && rest.starts_with('<') && rest.ends_with('>');
        if !quoted && !angled {
            return diags.report(
                Diagnostic::error(4040, "#include expects \"file\" or <file>").at(display.to_string(), line),
            );
        }
        let path = &rest[1..rest.len() - 1];
        if path.is_empty() {
            return diags.report(
                Diagnostic::error(4040, "#include file name is empty").at(display.to_string(), line),
            );
        }

        let bytes = match self.loader.load(path) {
            Ok(b) => b,
            Err(e) => {
                return diags.report(
                    Diagnostic::fatal(4041, format!("cannot open include file `{path}`: {e}"))
                        .at(display.to_string(), line),
                );
            }
        };
        let contents = self.decoder.decode(&bytes);
        let always_new = false;
        let file = self.files.resolve(path, path, always_new);
        let canonical = self.files.canonical_id(file);
        if self.includes.already_once(canonical) {
            return Ok(());
        }
        self.includes
            .push(file, &contents)
            .map_err(|e| self.fatal_at(diags, 4042, e.message, display, line))
    }

    fn handle_pragma(
        &mut self,
        rest: &str,
        display: &str,
        line: u32,
        diags: &mut DiagnosticSink,
    ) -> Result<(), Fatal> {
        let trimmed = rest.trim();
        let (word, _) = split_word(trimmed);
        match word {
            "once" => {
                if let Some(frame) = self.includes.current() {
                    let canonical = self.files.canonical_id(frame.file);
                    self.includes.mark_once(canonical);
                }
                Ok(())
            }
            "all_once" => {
                self.includes.set_all_once();
                Ok(())
            }
            "newline_spacing" => {
                let arg = trimmed["newline_spacing".len()..].trim();
                match tadspp_lexer::NewlineSpacing::parse(arg) {
                    Some(mode) => {
                        if let Some(frame) = self.includes.current_mut() {
                            frame.stream.newline_spacing = mode;
                        }
                        Ok(())
                    }
                    None => diags.report(
                        Diagnostic::error(4052, format!("unrecognized #pragma newline_spacing mode `{arg}`"))
                            .at(display.to_string(), line),
                    ),
                }
            }
            "message" => {
                let text = trimmed["message".len()..].trim().trim_matches('"');
                let result = diags.report(Diagnostic::info(4051, text.to_string()).at(display.to_string(), line));
                if self.preprocess_only {
                    self.pending_passthrough = Some(format!("#pragma {trimmed}"));
                }
                result
            }
            // `#pragma C` toggles the original's (disabled) pragma-C mode;
            // this implementation does not interpret it, but preserves it
            // verbatim when asked to, per `SPEC_FULL.md` §9.
            "C" => {
                if self.preprocess_only {
                    self.pending_passthrough = Some(format!("#pragma {trimmed}"));
                }
                Ok(())
            }
            _ => diags.report(
                Diagnostic::pedantic(4050, format!("unrecognized #pragma `{trimmed}` ignored"))
                    .at(display.to_string(), line),
            ),
        }
    }

    fn handle_line(&mut self, rest: &str) -> Result<(), Fatal> {
        let rest = rest.trim();
        let (num_text, name_text) = match rest.find(char::is_whitespace) {
            Some(idx) => (&rest[..idx], Some(rest[idx..].trim())),
            None => (rest, None),
        };
        let Ok(n) = num_text.parse::<u32>() else {
            return Ok(()); // malformed #line is silently ignored, matching a lenient host
        };
        if let Some(frame) = self.includes.current_mut() {
            frame.stream.set_next_line_no(n);
            if let Some(name) = name_text {
                frame.display_name_override = Some(name.trim_matches('"').to_string());
            }
        }
        Ok(())
    }
}

/// Strips any directory components, for `--test-report`'s basename-only
/// `__FILE__`/diagnostic display (`SPEC_FULL.md` §6).
fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Splits `#<word> <rest>` into the directive keyword and the remainder of
/// the line.
fn split_word(text: &str) -> (&str, &str) {
    let end = text.find(|c: char| c.is_whitespace()).unwrap_or(text.len());
    (&text[..end], text[end..].trim_start())
}

/// Parses a function-like macro's `(a, b, rest...)` formal list, returning
/// the formal names, the variadic formal's index if the list ends in
/// `name...`, and the remaining text (the macro body).
fn parse_formal_list(text: &str) -> Result<(Vec<String>, Option<usize>, &str), &'static str> {
    let rest = &text[1..]; // skip '('
    let close = rest.find(')').ok_or("unterminated formal parameter list")?;
    let list = &rest[..close];
    let body = rest[close + 1..].trim_start();

    let mut formals = Vec::new();
    let mut variadic = None;
    if !list.trim().is_empty() {
        for (i, raw) in list.split(',').enumerate() {
            let mut name = raw.trim();
            if let Some(stripped) = name.strip_suffix("...") {
                name = stripped.trim();
                variadic = Some(i);
            }
            if name.is_empty() {
                return Err("empty formal parameter name");
            }
            formals.push(name.to_string());
        }
    }
    Ok((formals, variadic, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tadspp_errors::SinkConfig;

    struct MapLoader(HashMap<&'static str, &'static str>);

    impl IncludeLoader for MapLoader {
        fn load(&self, raw_path: &str) -> std::io::Result<Vec<u8>> {
            self.0
                .get(raw_path)
                .map(|s| s.as_bytes().to_vec())
                .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, raw_path))
        }
    }

    fn drain(p: &mut DirectiveProcessor<'_, MapLoader>, diags: &mut DiagnosticSink) -> Vec<String> {
        let mut out = Vec::new();
        while let Some((_file, _line, line)) = p.next_logical_line(diags).unwrap() {
            if !line.trim().is_empty() {
                out.push(line);
            }
        }
        out
    }

    fn drain_tagged(
        p: &mut DirectiveProcessor<'_, MapLoader>,
        diags: &mut DiagnosticSink,
    ) -> Vec<(FileId, u32, String)> {
        let mut out = Vec::new();
        while let Some(entry) = p.next_logical_line(diags).unwrap() {
            if !entry.2.trim().is_empty() {
                out.push(entry);
            }
        }
        out
    }

    #[test]
    fn defines_and_expands_object_like_macro() {
        let loader = MapLoader(HashMap::new());
        let mut p = DirectiveProcessor::new(&loader);
        p.open_root("main.t", "#define SIZE 10\nx = SIZE;\n");
        let mut diags = DiagnosticSink::buffered(SinkConfig::default());
        let lines = drain(&mut p, &mut diags);
        assert_eq!(lines, vec!["x = 10;"]);
    }

    #[test]
    fn function_like_macro_with_args() {
        let loader = MapLoader(HashMap::new());
        let mut p = DirectiveProcessor::new(&loader);
        p.open_root("main.t", "#define ADD(a, b) (a + b)\ny = ADD(1, 2);\n");
        let mut diags = DiagnosticSink::buffered(SinkConfig::default());
        let lines = drain(&mut p, &mut diags);
        assert_eq!(lines, vec!["y = (1 + 2);"]);
    }

    #[test]
    fn if_defined_skips_inactive_branch() {
        let loader = MapLoader(HashMap::new());
        let mut p = DirectiveProcessor::new(&loader);
        p.open_root(
            "main.t",
            "#define FOO\n#ifdef FOO\na = 1;\n#else\na = 2;\n#endif\n",
        );
        let mut diags = DiagnosticSink::buffered(SinkConfig::default());
        let lines = drain(&mut p, &mut diags);
        assert_eq!(lines, vec!["a = 1;"]);
    }

    #[test]
    fn if_expression_with_arithmetic() {
        let loader = MapLoader(HashMap::new());
        let mut p = DirectiveProcessor::new(&loader);
        p.open_root("main.t", "#if 1 + 1 == 2\nok;\n#endif\n");
        let mut diags = DiagnosticSink::buffered(SinkConfig::default());
        let lines = drain(&mut p, &mut diags);
        assert_eq!(lines, vec!["ok;"]);
    }

    #[test]
    fn malformed_if_condition_defaults_to_true_with_diagnostic() {
        let loader = MapLoader(HashMap::new());
        let mut p = DirectiveProcessor::new(&loader);
        p.open_root("main.t", "#if 1 +\nok;\n#endif\n");
        let mut diags = DiagnosticSink::buffered(SinkConfig::default());
        let lines = drain(&mut p, &mut diags);
        assert_eq!(lines, vec!["ok;"]);
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn include_pulls_in_nested_file() {
        let mut files = HashMap::new();
        files.insert("inc.t", "y = 2;\n");
        let loader = MapLoader(files);
        let mut p = DirectiveProcessor::new(&loader);
        p.open_root("main.t", "x = 1;\n#include \"inc.t\"\nz = 3;\n");
        let mut diags = DiagnosticSink::buffered(SinkConfig::default());
        let lines = drain(&mut p, &mut diags);
        assert_eq!(lines, vec!["x = 1;", "y = 2;", "z = 3;"]);
    }

    #[test]
    fn included_lines_are_tagged_with_their_own_file_id() {
        let mut files = HashMap::new();
        files.insert("inc.t", "y = 2;\n");
        let loader = MapLoader(files);
        let mut p = DirectiveProcessor::new(&loader);
        let root = p.open_root("main.t", "x = 1;\n#include \"inc.t\"\nz = 3;\n");
        let mut diags = DiagnosticSink::buffered(SinkConfig::default());
        let tagged = drain_tagged(&mut p, &mut diags);
        assert_eq!(tagged.len(), 3);
        assert_eq!(tagged[0].0, root);
        assert_ne!(tagged[1].0, root); // "y = 2;" came from inc.t
        assert_eq!(tagged[2].0, root);
        assert_eq!(tagged[0].1, 1);
        assert_eq!(tagged[1].1, 1);
        assert_eq!(tagged[2].1, 3);
    }

    #[test]
    fn pragma_once_skips_second_include() {
        let mut files = HashMap::new();
        files.insert("inc.t", "#pragma once\ny = 2;\n");
        let loader = MapLoader(files);
        let mut p = DirectiveProcessor::new(&loader);
        p.open_root(
            "main.t",
            "#include \"inc.t\"\n#include \"inc.t\"\nz = 3;\n",
        );
        let mut diags = DiagnosticSink::buffered(SinkConfig::default());
        let lines = drain(&mut p, &mut diags);
        assert_eq!(lines, vec!["y = 2;", "z = 3;"]);
    }

    #[test]
    fn undef_removes_macro() {
        let loader = MapLoader(HashMap::new());
        let mut p = DirectiveProcessor::new(&loader);
        p.open_root("main.t", "#define FOO 1\n#undef FOO\nx = FOO;\n");
        let mut diags = DiagnosticSink::buffered(SinkConfig::default());
        let lines = drain(&mut p, &mut diags);
        assert_eq!(lines, vec!["x = FOO;"]);
    }

    #[test]
    fn error_directive_aborts() {
        let loader = MapLoader(HashMap::new());
        let mut p = DirectiveProcessor::new(&loader);
        p.open_root("main.t", "#error something is wrong\n");
        let mut diags = DiagnosticSink::buffered(SinkConfig::default());
        let err = p.next_logical_line(&mut diags).unwrap_err();
        assert_eq!(err.diagnostic.code, 4010);
        assert_eq!(err.diagnostic.location.as_ref().unwrap().line, 1);
    }

    #[test]
    fn predefined_macros_expand_in_code_lines() {
        let loader = MapLoader(HashMap::new());
        let mut p = DirectiveProcessor::new(&loader);
        p.open_root("main.t", "x = __LINE__;\ny = __FILE__;\n");
        let mut diags = DiagnosticSink::buffered(SinkConfig::default());
        let lines = drain(&mut p, &mut diags);
        assert_eq!(lines, vec!["x = 1;", "y = \"main.t\";"]);
    }

    #[test]
    fn test_report_mode_uses_basename_for_file() {
        let loader = MapLoader(HashMap::new());
        let mut p = DirectiveProcessor::new(&loader);
        p.set_test_report(true);
        p.open_root("/games/demo/main.t", "y = __FILE__;\n");
        let mut diags = DiagnosticSink::buffered(SinkConfig::default());
        let lines = drain(&mut p, &mut diags);
        assert_eq!(lines, vec!["y = \"main.t\";"]);
    }

    #[test]
    fn preprocess_only_retains_line_and_pragma_message() {
        let loader = MapLoader(HashMap::new());
        let mut p = DirectiveProcessor::new(&loader);
        p.set_preprocess_only(true);
        p.open_root("main.t", "#line 100 \"gen.t\"\nx = 1;\n#pragma message \"hi\"\n");
        let mut diags = DiagnosticSink::buffered(SinkConfig::default());
        let lines = drain(&mut p, &mut diags);
        assert_eq!(lines, vec!["#line 100 \"gen.t\"", "x = 1;", "#pragma message \"hi\""]);
    }

    #[test]
    fn newline_spacing_pragma_switches_mode() {
        let loader = MapLoader(HashMap::new());
        let mut p = DirectiveProcessor::new(&loader);
        p.open_root("main.t", "#pragma newline_spacing off\n");
        let mut diags = DiagnosticSink::buffered(SinkConfig::default());
        drain(&mut p, &mut diags);
        assert_eq!(diags.error_count(), 0);
    }

    #[test]
    fn unbalanced_endif_is_an_error() {
        let loader = MapLoader(HashMap::new());
        let mut p = DirectiveProcessor::new(&loader);
        p.open_root("main.t", "#endif\n");
        let mut diags = DiagnosticSink::buffered(SinkConfig::default());
        assert!(p.next_logical_line(&mut diags).is_err());
    }

    #[test]
    fn unbalanced_if_at_eof_reports_the_last_known_location() {
        let loader = MapLoader(HashMap::new());
        let mut p = DirectiveProcessor::new(&loader);
        p.open_root("main.t", "#if 1\nok;\n");
        let mut diags = DiagnosticSink::buffered(SinkConfig::default());
        // "#if 1" then "ok;", then end-of-input with the `#if` never closed.
        assert!(p.next_logical_line(&mut diags).unwrap().is_some()); // "ok;"
        let err = p.next_logical_line(&mut diags).unwrap_err();
        assert_eq!(err.diagnostic.code, 4099);
        let loc = err.diagnostic.location.as_ref().unwrap();
        assert_eq!(loc.file, "main.t");
        assert_eq!(loc.line, 2);
    }

    #[test]
    fn too_few_macro_arguments_is_a_warning_not_a_fatal_abort() {
        let loader = MapLoader(HashMap::new());
        let mut p = DirectiveProcessor::new(&loader);
        p.open_root("main.t", "#define ADD(a, b) (a + b)\ny = ADD(1);\nz = 2;\n");
        let mut diags = DiagnosticSink::buffered(SinkConfig::default());
        let lines = drain(&mut p, &mut diags);
        assert_eq!(lines, vec!["y = (1 + );", "z = 2;"]);
        assert_eq!(diags.warning_count(), 1);
    }

    #[test]
    fn too_many_macro_arguments_is_an_error_not_a_fatal_abort() {
        let loader = MapLoader(HashMap::new());
        let mut p = DirectiveProcessor::new(&loader);
        p.open_root("main.t", "#define ADD(a, b) (a + b)\ny = ADD(1, 2, 3);\nz = 2;\n");
        let mut diags = DiagnosticSink::buffered(SinkConfig::default());
        let lines = drain(&mut p, &mut diags);
        assert_eq!(lines, vec!["y = ADD(1, 2, 3);", "z = 2;"]);
        assert_eq!(diags.error_count(), 1);
    }
}
