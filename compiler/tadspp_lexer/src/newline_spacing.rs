/// How an embedded newline inside a spliced string literal is rendered,
/// controlled by `#pragma newline_spacing` (`SPEC_FULL.md` §4.2, §4.3, §9).
///
/// The source accepts both the historical `on`/`off` spelling and the
/// newer `collapse`/`delete`/`preserve` spelling; both are kept here.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum NewlineSpacing {
    /// Collapse the embedded newline (and surrounding whitespace) to a
    /// single space. This is `on` in the old spelling.
    #[default]
    Collapse,
    /// Delete the newline along with any following whitespace entirely.
    /// This is `off` in the old spelling.
    Delete,
    /// Preserve the newline as a literal `\n` escape in the output string.
    Preserve,
}

impl NewlineSpacing {
    pub fn parse(word: &str) -> Option<NewlineSpacing> {
        match word {
            "collapse" | "on" => Some(NewlineSpacing::Collapse),
            "delete" | "off" => Some(NewlineSpacing::Delete),
            "preserve" => Some(NewlineSpacing::Preserve),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_both_spellings() {
        assert_eq!(NewlineSpacing::parse("on"), Some(NewlineSpacing::Collapse));
        assert_eq!(NewlineSpacing::parse("collapse"), Some(NewlineSpacing::Collapse));
        assert_eq!(NewlineSpacing::parse("off"), Some(NewlineSpacing::Delete));
        assert_eq!(NewlineSpacing::parse("delete"), Some(NewlineSpacing::Delete));
        assert_eq!(NewlineSpacing::parse("preserve"), Some(NewlineSpacing::Preserve));
        assert_eq!(NewlineSpacing::parse("bogus"), None);
    }
}
