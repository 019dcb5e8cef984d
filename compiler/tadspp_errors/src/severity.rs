use std::fmt;

/// Diagnostic severity levels, in increasing order of consequence.
///
/// Grounded directly on the original TADS 3 compiler's `tc_severity_t`
/// (`tcerr.h`): info, pedantic, warning, error, fatal, internal
/// (`SPEC_FULL.md` §7).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// No count; never suppresses output. Used for `#pragma message`.
    Info,
    /// Counted as a warning, emitted only when pedantic mode is enabled.
    Pedantic,
    /// Counted; compilation still succeeds.
    Warning,
    /// Counted; compilation continues so further problems can be found.
    Error,
    /// A single error, then the current compilation unit aborts.
    Fatal,
    /// Compiler bug; logged with an "internal error" prefix, then treated
    /// as fatal.
    Internal,
}

impl Severity {
    /// Whether this severity counts towards the warning/error totals (and
    /// thus towards the `TOO_MANY_ERRORS` ceiling for `Error`/`Internal`).
    pub fn is_counted(self) -> bool {
        !matches!(self, Severity::Info)
    }

    pub fn is_fatal(self) -> bool {
        matches!(self, Severity::Fatal | Severity::Internal)
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Pedantic => "pedantic",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal error",
            Severity::Internal => "internal error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
