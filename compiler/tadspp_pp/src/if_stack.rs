//! The `#if`/`#ifdef`/`#ifndef`/`#elif`/`#else`/`#endif` conditional stack.
//!
//! This stack is shared across the whole include chain rather than reset
//! per file (`SPEC_FULL.md` §4.2): an `#include` is not allowed to leave a
//! dangling open conditional, and a file that opens one and then ends
//! without an `#endif` is an error at end-of-file, not end-of-include.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchState {
    /// This branch's condition was true and it is the one being processed.
    Active,
    /// A sibling branch already matched; this one, even if its own
    /// condition would be true, is skipped.
    Skipped,
    /// No sibling branch has matched yet; this branch's own condition was
    /// false, but a later `#elif`/`#else` could still activate.
    Pending,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    /// Whether the text under the current branch should be emitted: the
    /// branch itself is active AND every enclosing frame is also active.
    state: BranchState,
    /// True once some branch in this `#if`/`#elif`/.../`#else` chain has
    /// matched, so later `#elif` or `#else` clauses know to stay skipped.
    taken: bool,
    /// True once an `#else` has been seen, so a second `#else` or any
    /// further `#elif` can be rejected.
    saw_else: bool,
    file: tadspp_span::FileId,
}

pub const MAX_IF_DEPTH: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IfStackError {
    pub message: &'static str,
}

/// Tracks nested conditional-compilation state across the whole translation
/// unit, including across `#include` boundaries.
#[derive(Default)]
pub struct IfStack {
    frames: Vec<Frame>,
}

impl IfStack {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Whether source text at the current nesting level should be emitted.
    pub fn active(&self) -> bool {
        self.frames.iter().all(|f| matches!(f.state, BranchState::Active))
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push_if(&mut self, file: tadspp_span::FileId, condition: bool) -> Result<(), IfStackError> {
        if self.frames.len() >= MAX_IF_DEPTH {
            return Err(IfStackError { message: "#if nesting too deep" });
        }
        // A branch nested inside an already-inactive enclosing branch is
        // never evaluated for truth; it is simply skipped along with its
        // parent, but still needs a frame so the matching #endif balances.
        let enclosing_active = self.active();
        let state = if !enclosing_active {
            BranchState::Skipped
        } else if condition {
            BranchState::Active
        } else {
            BranchState::Pending
        };
        let taken = enclosing_active && condition;
        self.frames.push(Frame { state, taken, saw_else: false, file });
        Ok(())
    }

    pub fn elif(&mut self, file: tadspp_span::FileId, condition: bool) -> Result<(), IfStackError> {
        let Some(frame) = self.frames.last_mut() else {
            return Err(IfStackError { message: "#elif without matching #if" });
        };
        if frame.saw_else {
            return Err(IfStackError { message: "#elif after #else" });
        }
        if frame.taken {
            frame.state = BranchState::Skipped;
            return Ok(());
        }
        // Whether this #elif's own branch runs still depends on every
        // *enclosing* frame (excluding this one) being active.
        let parent_active = self.frames[..self.frames.len() - 1].iter().all(|f| matches!(f.state, BranchState::Active));
        let frame = self.frames.last_mut().expect("checked above");
        if parent_active && condition {
            frame.state = BranchState::Active;
            frame.taken = true;
        } else {
            frame.state = BranchState::Pending;
        }
        let _ = file;
        Ok(())
    }

    pub fn else_branch(&mut self) -> Result<(), IfStackError> {
        let Some(frame) = self.frames.last_mut() else {
            return Err(IfStackError { message: "#else without matching #if" });
        };
        if frame.saw_else {
            return Err(IfStackError { message: "#else after #else" });
        }
        frame.saw_else = true;
        if frame.taken {
            frame.state = BranchState::Skipped;
        } else {
            frame.state = BranchState::Active;
            frame.taken = true;
        }
        Ok(())
    }

    pub fn end_if(&mut self) -> Result<(), IfStackError> {
        if self.frames.pop().is_none() {
            return Err(IfStackError { message: "#endif without matching #if" });
        }
        Ok(())
    }

    /// Called at end-of-file: an `#include` is not permitted to close with
    /// an open conditional that it itself opened.
    pub fn check_balanced_for_file(&self, file: tadspp_span::FileId) -> Result<(), IfStackError> {
        if self.frames.iter().any(|f| f.file == file) {
            return Err(IfStackError { message: "#if left open at end of file" });
        }
        Ok(())
    }

    pub fn check_balanced_at_eof(&self) -> Result<(), IfStackError> {
        if !self.frames.is_empty() {
            return Err(IfStackError { message: "#if left open at end of input" });
        }
        Ok(())
    }
}
