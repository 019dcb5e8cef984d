use tadspp_span::FileId;

use crate::newline_spacing::NewlineSpacing;

/// Reads one physical line at a time from a single decoded source file.
///
/// One `SourceStream` exists per active include frame; the include stack
/// itself (pushing/popping frames, restoring the parent's mode on pop) is
/// owned by the directive processor in `tadspp_pp`, per the component
/// split in `SPEC_FULL.md` §2.1. See `SPEC_FULL.md` §4.1.
pub struct SourceStream {
    file: FileId,
    lines: Vec<String>,
    idx: usize,
    next_line_no: u32,
    /// Carries across physical lines within a single `/* ... */` comment.
    pub in_comment: bool,
    /// `#pragma newline_spacing` mode, restored by the include stack when
    /// this stream resumes after a nested include returns.
    pub newline_spacing: NewlineSpacing,
    unsplice_queue: Option<String>,
}

impl SourceStream {
    pub fn new(file: FileId, decoded_contents: &str) -> Self {
        let lines: Vec<String> = if decoded_contents.is_empty() {
            Vec::new()
        } else {
            let mut lines: Vec<String> =
                decoded_contents.split('\n').map(|s| s.to_owned()).collect();
            // `split('\n')` on a trailing-newline-terminated buffer yields a
            // spurious empty trailing entry; drop it so the last real line
            // isn't followed by a synthetic blank one.
            if lines.last().is_some_and(|l| l.is_empty()) {
                lines.pop();
            }
            lines
        };

        Self {
            file,
            lines,
            idx: 0,
            next_line_no: 1,
            in_comment: false,
            newline_spacing: NewlineSpacing::default(),
            unsplice_queue: None,
        }
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    /// The line number that will be assigned to the next line read.
    pub fn next_line_no(&self) -> u32 {
        self.next_line_no
    }

    /// Used by `#line N "file"` to retarget the stream's line counter.
    pub fn set_next_line_no(&mut self, n: u32) {
        self.next_line_no = n;
    }

    pub fn is_eof(&self) -> bool {
        self.unsplice_queue.is_none() && self.idx >= self.lines.len()
    }

    /// Reads the next physical line, prepending anything queued by
    /// [`SourceStream::unsplice`]. Returns `None` at end of file.
    pub fn next_physical_line(&mut self) -> Option<String> {
        if let Some(prefix) = self.unsplice_queue.take() {
            if self.idx >= self.lines.len() {
                return Some(prefix);
            }
            let line = &self.lines[self.idx];
            self.idx += 1;
            self.next_line_no += 1;
            return Some(format!("{prefix}{line}"));
        }

        if self.idx >= self.lines.len() {
            return None;
        }
        let line = self.lines[self.idx].clone();
        self.idx += 1;
        self.next_line_no += 1;
        Some(line)
    }

    /// Pushes text back to be prepended to the next line read
    /// (`SPEC_FULL.md` §4.2 step 5, "unsplice queue").
    pub fn unsplice(&mut self, text: String) {
        match &mut self.unsplice_queue {
            Some(existing) => existing.push_str(&text),
            None => self.unsplice_queue = Some(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tadspp_span::FileDescTable;

    fn file_id(table: &mut FileDescTable) -> FileId {
        table.resolve("f.t", "f.t", false)
    }

    #[test]
    fn reads_lines_in_order_and_tracks_line_no() {
        let mut table = FileDescTable::new();
        let id = file_id(&mut table);
        let mut s = SourceStream::new(id, "a\nb\nc\n");
        assert_eq!(s.next_line_no(), 1);
        assert_eq!(s.next_physical_line().as_deref(), Some("a"));
        assert_eq!(s.next_line_no(), 2);
        assert_eq!(s.next_physical_line().as_deref(), Some("b"));
        assert_eq!(s.next_physical_line().as_deref(), Some("c"));
        assert_eq!(s.next_physical_line(), None);
        assert!(s.is_eof());
    }

    #[test]
    fn unsplice_is_prepended_once() {
        let mut table = FileDescTable::new();
        let id = file_id(&mut table);
        let mut s = SourceStream::new(id, "rest of line\nnext\n");
        s.unsplice("prefix ".to_owned());
        assert_eq!(s.next_physical_line().as_deref(), Some("prefix rest of line"));
        assert_eq!(s.next_physical_line().as_deref(), Some("next"));
    }

    #[test]
    fn set_next_line_no_for_line_directive() {
        let mut table = FileDescTable::new();
        let id = file_id(&mut table);
        let mut s = SourceStream::new(id, "a\nb\n");
        s.set_next_line_no(100);
        assert_eq!(s.next_line_no(), 100);
        s.next_physical_line();
        assert_eq!(s.next_line_no(), 101);
    }
}
