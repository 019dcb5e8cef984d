//! The handful of settings the core itself consumes (`SPEC_FULL.md` §6);
//! everything CLI-shaped (argument parsing, `-v` verbosity) lives in
//! `tadspp_driver` and is translated down into this struct.

/// Core preprocessor/tokenizer configuration, independent of how it was
/// gathered (CLI flags, an embedding host's own config file, tests).
#[derive(Debug, Clone)]
pub struct PpConfig {
    /// Requested source character-set name. `None` asks the host for its
    /// default (`ResourceLoader::decoder` picks UTF-8 either way today).
    pub charset: Option<String>,
    /// Retain `#line`, `#pragma message`, `#error`, and `#pragma C` in the
    /// token stream's source text instead of consuming them silently.
    pub preprocess_only: bool,
    /// Suppress ordinary output; the driver instead reports every file
    /// pulled in via `#include`.
    pub list_includes: bool,
    /// Use basenames only for `__FILE__` and diagnostics, so golden test
    /// output doesn't embed an absolute or CI-specific path.
    pub test_report: bool,
    /// Directories searched, in order, for `#include "..."` and
    /// `#include <...>` that a bare [`ResourceLoader::open`] can't resolve
    /// on its own. The core does not search these itself — a
    /// [`crate::ResourceLoader`] implementation is expected to consult them.
    pub include_paths: Vec<String>,
}

impl Default for PpConfig {
    fn default() -> Self {
        Self {
            charset: None,
            preprocess_only: false,
            list_includes: false,
            test_report: false,
            include_paths: Vec::new(),
        }
    }
}
