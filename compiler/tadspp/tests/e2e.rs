//! End-to-end scenarios driving the full `preprocess()` → `TokenStream`
//! pipeline, matching the input/expected-token-stream scenarios this tree
//! tracks for the preprocessor/tokenizer (macro expansion, stringize,
//! paste, variadics, embedded expressions, inactive `#if` branches).

use std::collections::HashMap;
use std::io;

use proptest::prelude::*;
use tadspp::{preprocess, PpConfig, ResourceLoader};
use tadspp_errors::{DiagnosticSink, SinkConfig};
use tadspp_lexer::TokenKind;
use tadspp_span::SourceArena;

struct MapLoader(HashMap<&'static str, &'static str>);

impl ResourceLoader for MapLoader {
    fn open(&self, raw_path: &str) -> io::Result<Vec<u8>> {
        self.0
            .get(raw_path)
            .map(|s| s.as_bytes().to_vec())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, raw_path))
    }
}

fn tokenize(src: &str) -> Vec<TokenKind> {
    let mut files = HashMap::new();
    files.insert("main.t", src);
    let loader = MapLoader(files);
    let mut diags = DiagnosticSink::buffered(SinkConfig::default());
    let unit = preprocess(&loader, &PpConfig::default(), "main.t", &mut diags).unwrap();
    let (mut stream, files) = unit.into_token_stream();
    let mut arena = SourceArena::new();
    let mut kinds = Vec::new();
    loop {
        let tok = stream.next(&files, &mut arena, &mut diags).unwrap();
        if tok.is_eof() {
            break;
        }
        kinds.push(tok.kind);
    }
    kinds
}

fn tokenize_with_text(src: &str) -> Vec<(TokenKind, String)> {
    let mut files = HashMap::new();
    files.insert("main.t", src);
    let loader = MapLoader(files);
    let mut diags = DiagnosticSink::buffered(SinkConfig::default());
    let unit = preprocess(&loader, &PpConfig::default(), "main.t", &mut diags).unwrap();
    let (mut stream, files) = unit.into_token_stream();
    let mut arena = SourceArena::new();
    let mut out = Vec::new();
    loop {
        let tok = stream.next(&files, &mut arena, &mut diags).unwrap();
        if tok.is_eof() {
            break;
        }
        out.push((tok.kind, tok.text(&arena).to_string()));
    }
    out
}

#[test]
fn object_like_function_macro_expands_before_tokenizing() {
    let kinds = tokenize("#define MAX(a,b) ((a)>(b)?(a):(b))\nx = MAX(1,2);\n");
    use TokenKind::*;
    assert_eq!(
        kinds,
        vec![
            Sym, Assign, LParen, LParen, Int, RParen, Gt, LParen, Int, RParen, RParen, Question,
            LParen, Int, RParen, Colon, LParen, Int, RParen, RParen, RParen, Semi,
        ]
    );
}

#[test]
fn stringize_produces_one_string_token() {
    let tokens = tokenize_with_text("#define STR(x) #x\nSTR(hello);\n");
    assert_eq!(tokens[0].0, TokenKind::DStr);
    assert_eq!(tokens[0].1, "hello");
}

#[test]
fn paste_concatenates_into_a_single_identifier() {
    let tokens = tokenize_with_text("#define CAT(a,b) a##b\nCAT(foo,bar);\n");
    assert_eq!(tokens[0], (TokenKind::Sym, "foobar".to_string()));
}

#[test]
fn comma_paste_elides_trailing_comma_for_empty_varargs() {
    let no_varargs = tokenize_with_text("#define V(x, rest...) f(x, ##rest)\nV(1);\n");
    assert_eq!(
        no_varargs.iter().map(|(k, _)| *k).collect::<Vec<_>>(),
        vec![TokenKind::Sym, TokenKind::LParen, TokenKind::Int, TokenKind::RParen, TokenKind::Semi]
    );

    let with_varargs = tokenize_with_text("#define V(x, rest...) f(x, ##rest)\nV(1,2);\n");
    assert_eq!(
        with_varargs.iter().map(|(k, _)| *k).collect::<Vec<_>>(),
        vec![
            TokenKind::Sym,
            TokenKind::LParen,
            TokenKind::Int,
            TokenKind::Comma,
            TokenKind::Int,
            TokenKind::RParen,
            TokenKind::Semi,
        ]
    );
}

#[test]
fn embedded_expression_in_string_splits_into_fragments() {
    let tokens = tokenize_with_text(r#"x = "hi <<name>> bye";"#);
    let kinds: Vec<TokenKind> = tokens.iter().map(|(k, _)| *k).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Sym,
            TokenKind::Assign,
            TokenKind::DStrStart,
            TokenKind::Sym,
            TokenKind::DStrEnd,
            TokenKind::Semi,
        ]
    );
    assert_eq!(tokens[2].1, "hi ");
    assert_eq!(tokens[3].1, "name");
    assert_eq!(tokens[4].1, " bye");
}

#[test]
fn inactive_if_branch_contributes_no_tokens() {
    let kinds = tokenize("#if defined(FOO)\na = 1;\n#endif\nb = 2;\n");
    use TokenKind::*;
    assert_eq!(kinds, vec![Sym, Assign, Int, Semi]);
}

#[test]
fn list_includes_reports_every_file_pulled_in() {
    let mut files = HashMap::new();
    files.insert("main.t", "#include \"a.t\"\n#include \"b.t\"\n");
    files.insert("a.t", "x = 1;\n");
    files.insert("b.t", "y = 2;\n");
    let loader = MapLoader(files);
    let mut diags = DiagnosticSink::buffered(SinkConfig::default());
    let unit = preprocess(&loader, &PpConfig::default(), "main.t", &mut diags).unwrap();
    assert_eq!(tadspp::list_includes(&unit.files), vec!["main.t", "a.t", "b.t"]);
}

proptest! {
    /// Stringize law (`SPEC_FULL.md` §8): for `#define S(x) #x`, the
    /// expansion of `S(A)` is `A` quoted, for any plain-word actual `A`
    /// that contains no characters `#x`'s escaping or the tokenizer's own
    /// grammar would otherwise transform.
    #[test]
    fn stringize_law_holds_for_plain_word_actuals(actual in "[a-zA-Z][a-zA-Z0-9_]{0,15}") {
        let src = format!("#define S(x) #x\nS({actual});\n");
        let tokens = tokenize_with_text(&src);
        prop_assert_eq!(&tokens[0].0, &TokenKind::DStr);
        prop_assert_eq!(&tokens[0].1, &actual);
    }
}

#[test]
fn debug_table_round_trips_through_a_full_preprocess_run() {
    let mut files = HashMap::new();
    files.insert("main.t", "#define SIZE 10\nx = SIZE;\n");
    let loader = MapLoader(files);
    let mut diags = DiagnosticSink::buffered(SinkConfig::default());
    let unit = preprocess(&loader, &PpConfig::default(), "main.t", &mut diags).unwrap();
    let bytes = tadspp::write_debug_table(&unit.macros);
    let entries = tadspp::read_debug_table(&bytes).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "SIZE");
    assert_eq!(entries[0].expansion, "10");
}
