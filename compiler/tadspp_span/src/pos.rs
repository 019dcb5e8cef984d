use std::fmt;

/// Dense, small integer identifying a [`crate::FileDesc`] in a [`crate::FileDescTable`].
///
/// IDs are assigned in first-seen order starting at zero, so a `FileId` also
/// doubles as an index into the table's backing `Vec`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(pub(crate) u32);

impl FileId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({})", self.0)
    }
}

/// A source position: a file and a 1-based line number within it.
///
/// This is the granularity the preprocessor reasons about; the tokenizer
/// layer further refines a position with a column when rendering
/// diagnostics, but the preprocessor itself only ever needs file+line (see
/// `SPEC_FULL.md` §3).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourcePos {
    pub file: FileId,
    pub line: u32,
}

impl SourcePos {
    pub fn new(file: FileId, line: u32) -> Self {
        Self { file, line }
    }
}

impl fmt::Debug for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.0, self.line)
    }
}
