use crate::Severity;

/// A resolved, display-ready source location. The sink deals in already
/// resolved filenames rather than `tadspp_span::FileId` so that it has no
/// dependency on a live `FileDescTable` borrow.
#[derive(Clone, Debug)]
pub struct Location {
    pub file: String,
    pub line: u32,
}

/// A single diagnostic record, matching the structured record described in
/// `SPEC_FULL.md` §6: severity, numeric code, message, and position.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: u32,
    pub message: String,
    pub location: Option<Location>,
    /// The raw text of the offending source line, when available, used to
    /// render an annotated snippet instead of a bare one-liner.
    pub source_line: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, code: u32, message: impl Into<String>) -> Self {
        Self { severity, code, message: message.into(), location: None, source_line: None }
    }

    pub fn info(code: u32, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, code, message)
    }

    pub fn pedantic(code: u32, message: impl Into<String>) -> Self {
        Self::new(Severity::Pedantic, code, message)
    }

    pub fn warning(code: u32, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    pub fn error(code: u32, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    pub fn fatal(code: u32, message: impl Into<String>) -> Self {
        Self::new(Severity::Fatal, code, message)
    }

    pub fn internal(code: u32, message: impl Into<String>) -> Self {
        Self::new(Severity::Internal, code, message)
    }

    pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.location = Some(Location { file: file.into(), line });
        self
    }

    pub fn with_source_line(mut self, line: impl Into<String>) -> Self {
        self.source_line = Some(line.into());
        self
    }
}
