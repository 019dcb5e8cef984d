//! The facade a parser actually drives (`SPEC_FULL.md` §4.6): a single
//! `next()` call that, underneath, consults an un-get stack, then any
//! pushed external sources, before finally pulling from the tokenizer over
//! the fully preprocessed text.
//!
//! The tokenizer itself (`tadspp_lexer::Tokenizer`) expects to own one
//! complete, already-decoded file; it knows nothing of `#include` or macro
//! expansion. This crate's [`crate::preprocessor::Preprocessor`] resolves
//! that mismatch by draining the directive processor's logical lines into
//! one flattened buffer before a `TokenStream` is ever built, so from here
//! down it's exactly one `Tokenizer` over exactly one `FileId` — the
//! synthetic root unit.

use smallvec::SmallVec;
use tadspp_errors::{DiagnosticSink, Fatal};
use tadspp_lexer::{Token, Tokenizer};
use tadspp_span::{FileDescTable, SourceArena};

/// An alternate token producer a parser can splice in ahead of the main
/// tokenizer (`SPEC_FULL.md` §4.6 `push_source`) — for example, a macro
/// expansion rescanned token-by-token instead of through the text-level
/// expander. Exhausting one pops back to whatever was producing tokens
/// before it.
pub trait TokenSource {
    fn next(&mut self, arena: &mut SourceArena) -> Option<Token>;
}

/// Drives a single [`Tokenizer`] with push-back, source-splicing, and the
/// `assume_missing_str_cont` recovery hook layered on top.
pub struct TokenStream {
    tokenizer: Tokenizer,
    /// Pushed-back tokens, most-recently-ungotten last (`SPEC_FULL.md`
    /// §4.6: "a growing linked list of slots" — used here as a stack of
    /// arbitrary depth). Parsers rarely unget more than one or two tokens
    /// at a time, so a small inline buffer avoids a heap allocation on the
    /// common path. Also doubles as `push`'s injection point: both
    /// operations just mean "serve this token before asking the tokenizer
    /// for a fresh one".
    pending: SmallVec<[Token; 4]>,
    /// Spliced-in alternate sources, innermost last. `next()` drains the
    /// top source until it runs dry, then pops it and falls through to the
    /// one beneath (or to the tokenizer once the stack is empty).
    sources: Vec<Box<dyn TokenSource>>,
    previous: Option<Token>,
}

impl TokenStream {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer, pending: SmallVec::new(), sources: Vec::new(), previous: None }
    }

    pub fn previous(&self) -> Option<&Token> {
        self.previous.as_ref()
    }

    /// Returns the next token, consulting the un-get stack, then any
    /// spliced sources, before falling through to the tokenizer.
    pub fn next(
        &mut self,
        files: &FileDescTable,
        arena: &mut SourceArena,
        diags: &mut DiagnosticSink,
    ) -> Result<Token, Fatal> {
        let tok = if let Some(tok) = self.pending.pop() {
            tok
        } else {
            loop {
                if let Some(src) = self.sources.last_mut() {
                    if let Some(tok) = src.next(arena) {
                        break tok;
                    }
                    self.sources.pop();
                    continue;
                }
                break self.tokenizer.next_token(files, arena, diags)?;
            }
        };
        self.previous = Some(tok.clone());
        Ok(tok)
    }

    /// Pushes `tok` back so the next [`Self::next`] returns it again.
    pub fn unget(&mut self, tok: Token) {
        self.pending.push(tok);
    }

    /// Injects a synthesized token ahead of whatever would come next.
    /// Distinct from [`Self::unget`] only in intent — mechanically both
    /// just stack a token for the next `next()` to hand back.
    pub fn push(&mut self, tok: Token) {
        self.pending.push(tok);
    }

    /// Splices `src` in as the next token producer. Once `src` is
    /// exhausted, token production falls back to whatever was active
    /// before (another spliced source, or the underlying tokenizer).
    pub fn push_source(&mut self, src: Box<dyn TokenSource>) {
        self.sources.push(src);
    }

    /// Promotes `tok`'s text into the arena, turning an "unsafe"
    /// (`Static`/`Owned`) token into one that survives indefinitely.
    pub fn copy_token(
        &self,
        tok: &mut Token,
        arena: &mut SourceArena,
    ) -> Result<(), tadspp_span::ArenaAllocTooLarge> {
        tok.copy_into_arena(arena)
    }

    /// Promotes the most recently returned token in place.
    pub fn copy_current(&mut self, arena: &mut SourceArena) -> Result<(), tadspp_span::ArenaAllocTooLarge> {
        match &mut self.previous {
            Some(tok) => tok.copy_into_arena(arena),
            None => Ok(()),
        }
    }

    /// Matches a two-token sequence, consuming both only if it matches
    /// (`SPEC_FULL.md` §4.6 `look_ahead`).
    pub fn look_ahead(
        &mut self,
        files: &FileDescTable,
        arena: &mut SourceArena,
        diags: &mut DiagnosticSink,
        a: tadspp_lexer::TokenKind,
        b: tadspp_lexer::TokenKind,
    ) -> Result<bool, Fatal> {
        let first = self.next(files, arena, diags)?;
        if first.kind != a {
            self.unget(first);
            return Ok(false);
        }
        let second = self.next(files, arena, diags)?;
        if second.kind != b {
            self.unget(second);
            self.unget(first);
            return Ok(false);
        }
        Ok(true)
    }

    /// Same match as [`Self::look_ahead`], but never consumes either
    /// token: a pure peek (`SPEC_FULL.md` §4.6 `peek_ahead`).
    pub fn peek_ahead(
        &mut self,
        files: &FileDescTable,
        arena: &mut SourceArena,
        diags: &mut DiagnosticSink,
        a: tadspp_lexer::TokenKind,
        b: tadspp_lexer::TokenKind,
    ) -> Result<bool, Fatal> {
        let first = self.next(files, arena, diags)?;
        let second = self.next(files, arena, diags)?;
        let matched = first.kind == a && second.kind == b;
        self.unget(second);
        self.unget(first);
        Ok(matched)
    }

    /// Parser-driven recovery (`SPEC_FULL.md` §4.6): treat the current
    /// position as if a `>>` had just closed the innermost embedded
    /// expression.
    pub fn assume_missing_str_cont(
        &mut self,
        files: &FileDescTable,
        arena: &mut SourceArena,
        diags: &mut DiagnosticSink,
    ) -> Result<Token, Fatal> {
        let tok = self.tokenizer.assume_missing_str_cont(files, arena, diags)?;
        self.previous = Some(tok.clone());
        Ok(tok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tadspp_errors::SinkConfig;
    use tadspp_lexer::TokenKind;

    fn fixture(src: &str) -> (TokenStream, FileDescTable, tadspp_span::FileId, SourceArena, DiagnosticSink) {
        let mut files = FileDescTable::new();
        let id = files.resolve("f.t", "f.t", false);
        let stream = TokenStream::new(Tokenizer::new(id, src));
        (stream, files, id, SourceArena::new(), DiagnosticSink::buffered(SinkConfig::default()))
    }

    #[test]
    fn next_then_unget_replays_the_same_token() {
        let (mut ts, files, _id, mut arena, mut diags) = fixture("a b");
        let a = ts.next(&files, &mut arena, &mut diags).unwrap();
        assert_eq!(a.text(&arena), "a");
        ts.unget(a);
        let again = ts.next(&files, &mut arena, &mut diags).unwrap();
        assert_eq!(again.text(&arena), "a");
        let b = ts.next(&files, &mut arena, &mut diags).unwrap();
        assert_eq!(b.text(&arena), "b");
    }

    #[test]
    fn push_injects_a_synthesized_token_first() {
        let (mut ts, files, id, mut arena, mut diags) = fixture("b");
        let pos = tadspp_span::SourcePos::new(id, 1);
        let synthetic = Token::new(TokenKind::Sym, tadspp_lexer::TokenText::Static("a"), pos);
        ts.push(synthetic);
        let first = ts.next(&files, &mut arena, &mut diags).unwrap();
        assert_eq!(first.text(&arena), "a");
        let second = ts.next(&files, &mut arena, &mut diags).unwrap();
        assert_eq!(second.text(&arena), "b");
    }

    #[test]
    fn look_ahead_consumes_on_match_and_restores_on_mismatch() {
        let (mut ts, files, _id, mut arena, mut diags) = fixture("( )");
        let matched = ts
            .look_ahead(&files, &mut arena, &mut diags, TokenKind::LParen, TokenKind::RParen)
            .unwrap();
        assert!(matched);
        assert!(ts.next(&files, &mut arena, &mut diags).unwrap().is_eof());
    }

    #[test]
    fn look_ahead_mismatch_leaves_tokens_available() {
        let (mut ts, files, _id, mut arena, mut diags) = fixture("( a");
        let matched = ts
            .look_ahead(&files, &mut arena, &mut diags, TokenKind::LParen, TokenKind::RParen)
            .unwrap();
        assert!(!matched);
        let first = ts.next(&files, &mut arena, &mut diags).unwrap();
        assert_eq!(first.kind, TokenKind::LParen);
        let second = ts.next(&files, &mut arena, &mut diags).unwrap();
        assert_eq!(second.text(&arena), "a");
    }

    #[test]
    fn peek_ahead_never_consumes() {
        let (mut ts, files, _id, mut arena, mut diags) = fixture("( )");
        let matched = ts
            .peek_ahead(&files, &mut arena, &mut diags, TokenKind::LParen, TokenKind::RParen)
            .unwrap();
        assert!(matched);
        let first = ts.next(&files, &mut arena, &mut diags).unwrap();
        assert_eq!(first.kind, TokenKind::LParen);
        let second = ts.next(&files, &mut arena, &mut diags).unwrap();
        assert_eq!(second.kind, TokenKind::RParen);
    }

    struct OneShotSource(Option<Token>);

    impl TokenSource for OneShotSource {
        fn next(&mut self, _arena: &mut SourceArena) -> Option<Token> {
            self.0.take()
        }
    }

    #[test]
    fn push_source_is_drained_before_falling_back_to_the_tokenizer() {
        let (mut ts, files, id, mut arena, mut diags) = fixture("b");
        let pos = tadspp_span::SourcePos::new(id, 1);
        let injected = Token::new(TokenKind::Sym, tadspp_lexer::TokenText::Static("a"), pos);
        ts.push_source(Box::new(OneShotSource(Some(injected))));
        let first = ts.next(&files, &mut arena, &mut diags).unwrap();
        assert_eq!(first.text(&arena), "a");
        let second = ts.next(&files, &mut arena, &mut diags).unwrap();
        assert_eq!(second.text(&arena), "b");
    }

    #[test]
    fn copy_current_promotes_previous_token_into_the_arena() {
        let (mut ts, files, _id, mut arena, mut diags) = fixture("+");
        let tok = ts.next(&files, &mut arena, &mut diags).unwrap();
        assert!(!matches!(tok.text, tadspp_lexer::TokenText::Arena(_)));
        ts.copy_current(&mut arena).unwrap();
        assert!(matches!(ts.previous().unwrap().text, tadspp_lexer::TokenText::Arena(_)));
    }
}
