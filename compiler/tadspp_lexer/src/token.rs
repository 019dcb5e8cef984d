use tadspp_span::{ArenaRef, SourceArena, SourcePos};

/// The lexical kind of a token.
///
/// Groups: identifiers/keywords, literals, operators/punctuation, and
/// string fragments (including embedded-expression boundaries).
/// `SPEC_FULL.md` §3 describes the original's token kind as also carrying
/// several in-band pseudo-tokens for macro-expansion bookkeeping
/// (formal-parameter placeholder, fully-expanded marker, and so on); this
/// implementation's `tadspp_pp::expander` does that bookkeeping over parsed
/// `BodyElem` sequences and a plain name stack instead (`SPEC_FULL.md` §9),
/// so no such variants exist here — see `sentinel.rs` for the input-scrubbing
/// side of that decision, which is unaffected.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TokenKind {
    Eof,
    Invalid,

    // --- identifiers & keywords ---
    Sym,
    Keyword(Keyword),

    // --- literals ---
    Int,
    BigInt,
    Float,

    // --- plain strings ---
    SStr,
    DStr,
    Regex,

    // --- embedded-expression string fragments ---
    SStrStart,
    SStrMid,
    SStrEnd,
    DStrStart,
    DStrMid,
    DStrEnd,
    FmtSpec,

    // --- punctuation / operators ---
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semi,
    Colon,
    ColonColon,
    Dot,
    DotDot,
    DotDotDot,
    Arrow,
    QQ,
    Question,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Tilde,
    Bang,
    Eq,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Shl,
    Shr,
    Shr3,
    ShlEq,
    ShrEq,
    Shr3Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,
    AmpAmp,
    PipePipe,
    PlusPlus,
    MinusMinus,
    Assign,
    Hash,
    HashAt,
    HashHash,
    At,
}

macro_rules! keywords {
    ($($variant:ident => $text:literal),* $(,)?) => {
        /// TADS 3 reserved words (`SPEC_FULL.md` §4.5: "after forming a SYM
        /// token, consult the keyword table to promote to the specific
        /// keyword kind").
        #[derive(Clone, Copy, PartialEq, Eq, Debug)]
        pub enum Keyword {
            $($variant),*
        }

        impl Keyword {
            pub fn from_text(s: &str) -> Option<Keyword> {
                match s {
                    $($text => Some(Keyword::$variant),)*
                    _ => None,
                }
            }

            pub fn text(self) -> &'static str {
                match self {
                    $(Keyword::$variant => $text),*
                }
            }
        }
    };
}

keywords! {
    And => "and",
    Break => "break",
    Case => "case",
    Catch => "catch",
    Class => "class",
    Continue => "continue",
    Default => "default",
    Define => "define",
    Delegated => "delegated",
    Do => "do",
    Else => "else",
    Enum => "enum",
    Extern => "extern",
    Finally => "finally",
    For => "for",
    Foreach => "foreach",
    Format => "format",
    Function => "function",
    Goto => "goto",
    If => "if",
    Inherited => "inherited",
    Intrinsic => "intrinsic",
    Local => "local",
    Method => "method",
    Modify => "modify",
    New => "new",
    Nil => "nil",
    Object => "object",
    Operator => "operator",
    Or => "or",
    Property => "property",
    Propertyset => "propertyset",
    Replace => "replace",
    Return => "return",
    Self_ => "self",
    Static => "static",
    Switch => "switch",
    Template => "template",
    Throw => "throw",
    Transient => "transient",
    True => "true",
    Try => "try",
    While => "while",
}

/// Where a token's text lives.
///
/// `Arena`-backed text is the "safe" category of `SPEC_FULL.md` §3: it
/// outlives any number of further tokenizer operations (until `reset()`).
/// `Static`/`Owned` cover the "unsafe" category; in the original these
/// pointed into a buffer invalidated by the next fetch, a C-performance
/// trick that Rust's ownership already makes unnecessary for the small,
/// fixed-vocabulary kinds (operators, keywords, punctuation) that use it
/// here — they are simply always valid.
#[derive(Clone, Debug)]
pub enum TokenText {
    Static(&'static str),
    Owned(Box<str>),
    Arena(ArenaRef),
}

impl TokenText {
    pub fn resolve<'a>(&'a self, arena: &'a SourceArena) -> &'a str {
        match self {
            TokenText::Static(s) => s,
            TokenText::Owned(s) => s,
            TokenText::Arena(r) => {
                std::str::from_utf8(arena.get(*r)).expect("arena text is always valid utf-8")
            }
        }
    }

    pub fn is_arena_backed(&self) -> bool {
        matches!(self, TokenText::Arena(_))
    }
}

/// One lexical token, as produced by the [`crate::Tokenizer`].
///
/// The original's per-token "fully expanded" suppression flag
/// (`SPEC_FULL.md` §4.4) has no counterpart here: `tadspp_pp::expander`
/// tracks in-progress macro names on a stack for the duration of one
/// `expand()` call instead, which gives the same self-reference-suppression
/// behavior without needing a flag on every token.
#[derive(Clone, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub text: TokenText,
    pub int_value: Option<i64>,
    pub pos: SourcePos,
}

impl Token {
    pub fn new(kind: TokenKind, text: TokenText, pos: SourcePos) -> Self {
        Self { kind, text, int_value: None, pos }
    }

    pub fn eof(pos: SourcePos) -> Self {
        Self::new(TokenKind::Eof, TokenText::Static(""), pos)
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    pub fn text<'a>(&'a self, arena: &'a SourceArena) -> &'a str {
        TokenText::resolve(&self.text, arena)
    }

    /// Promotes this token's text into the arena, turning an "unsafe"
    /// token into a "safe" one (`SPEC_FULL.md` §4.6 `copy_current`).
    pub fn copy_into_arena(&mut self, arena: &mut SourceArena) -> Result<(), tadspp_span::ArenaAllocTooLarge> {
        if self.text.is_arena_backed() {
            return Ok(());
        }
        let bytes = match &self.text {
            TokenText::Static(s) => s.as_bytes().to_vec(),
            TokenText::Owned(s) => s.as_bytes().to_vec(),
            TokenText::Arena(_) => unreachable!(),
        };
        let r = arena.alloc(&bytes)?;
        self.text = TokenText::Arena(r);
        Ok(())
    }
}
