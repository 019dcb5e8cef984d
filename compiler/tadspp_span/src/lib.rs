//! Source positions, file descriptors and the append-only text arena shared
//! by the rest of the `tadspp` crates.
//!
//! This crate corresponds to the `FileDescTable` and source-arena portions
//! of `SPEC_FULL.md` §4.1 and §3. It intentionally knows nothing about
//! lines, comments or tokens; those live in `tadspp_lexer`.

mod arena;
mod file_desc;
mod pos;

pub use arena::{ArenaAllocTooLarge, ArenaRef, SourceArena};
pub use file_desc::{FileDesc, FileDescTable, FileNameForms};
pub use pos::{FileId, SourcePos};
