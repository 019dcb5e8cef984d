//! The top-level entry point (`SPEC_FULL.md` §2 `TokenStream` facade row):
//! resolves a root file through a [`ResourceLoader`], drives a
//! `tadspp_pp::DirectiveProcessor` to exhaustion, and hands the result back
//! either as flattened preprocessed text (`--preprocess-only`'s output) or
//! as a ready-to-drive [`TokenStream`].
//!
//! `DirectiveProcessor::next_logical_line` yields one preprocessed logical
//! line at a time, each tagged with the physical file and line it actually
//! came from — a line macro-expanded from `#include`d content keeps that
//! file's identity rather than the root's. `into_token_stream` threads
//! those per-line tags straight into `tadspp_lexer::Tokenizer`, so tokens
//! scanned from an included file still resolve to it for `__FILE__`,
//! diagnostics, and the monotonic-position invariant of `SPEC_FULL.md`
//! §3/§8, instead of silently adopting the root file's identity.

use tadspp_errors::{Diagnostic, DiagnosticSink, Fatal};
use tadspp_lexer::{CharsetDecoder, Tokenizer};
use tadspp_pp::{DirectiveProcessor, MacroTable};
use tadspp_span::{FileDescTable, FileId};
use tracing::debug;

use crate::collaborators::{LoaderAdapter, ResourceLoader};
use crate::config::PpConfig;
use crate::token_stream::TokenStream;

/// The result of running the directive processor to exhaustion: the
/// preprocessed lines (each tagged with its originating file and line)
/// plus everything a caller needs to build a [`TokenStream`] or inspect
/// what happened (files touched, final macro table).
pub struct PreprocessedUnit {
    /// The flattened preprocessed text, one physical line per entry of
    /// `lines`, joined with `\n` — what `--preprocess-only` prints.
    pub text: String,
    lines: Vec<(FileId, u32, String)>,
    pub files: FileDescTable,
    pub macros: MacroTable,
    pub root_file: FileId,
}

impl PreprocessedUnit {
    /// Builds a [`TokenStream`] over the preprocessed lines, each still
    /// tagged with its own originating file.
    pub fn into_token_stream(self) -> (TokenStream, FileDescTable) {
        let tokenizer = Tokenizer::from_preassembled_lines(self.root_file, self.lines);
        (TokenStream::new(tokenizer), self.files)
    }
}

/// Runs the full preprocessing pass described in `SPEC_FULL.md` §2.1 and
/// §6: loads `root_path` through `loader`, configures a
/// `tadspp_pp::DirectiveProcessor` per `config`, and drains it to
/// exhaustion.
pub fn preprocess<R: ResourceLoader>(
    loader: &R,
    config: &PpConfig,
    root_path: &str,
    diags: &mut DiagnosticSink,
) -> Result<PreprocessedUnit, Fatal> {
    let adapter = LoaderAdapter(loader);
    let decoder = loader.decoder(config.charset.as_deref());

    let bytes = loader.open(root_path).map_err(|e| {
        let diag = Diagnostic::fatal(4042, format!("cannot open root file `{root_path}`: {e}"));
        diags.report(diag).expect_err("fatal diagnostics always return Err")
    })?;
    let contents = decoder.decode(&bytes);

    let mut proc = DirectiveProcessor::with_decoder(&adapter, decoder);
    proc.set_test_report(config.test_report);
    proc.set_preprocess_only(config.preprocess_only);
    let root_file = proc.open_root(root_path, &contents);

    let mut lines = Vec::new();
    let mut text = String::new();
    while let Some((file, line_no, line)) = proc.next_logical_line(diags)? {
        text.push_str(&line);
        text.push('\n');
        lines.push((file, line_no, line));
    }
    debug!(bytes = text.len(), lines = lines.len(), "preprocessing finished");

    let (files, macros) = proc.into_parts();
    Ok(PreprocessedUnit { text, lines, files, macros, root_file })
}

/// `--list-includes`: every file the root pulled in transitively, in
/// first-resolved order, as their display names.
pub fn list_includes(files: &FileDescTable) -> Vec<String> {
    (0..files.len()).map(|i| files.by_id(files.id_at(i)).displayed.clone()).collect()
}
