//! Argument parsing (`SPEC_FULL.md` §6, §10.3): exactly the flags the core
//! consumes, plus the two persisted-artifact dump flags.

use std::path::PathBuf;

use clap::Parser;

/// TADS 3 preprocessor/tokenizer, standalone driver.
#[derive(Parser, Debug)]
#[command(name = "tadspp", version, about)]
pub struct Cli {
    /// Root source file to preprocess.
    pub root: PathBuf,

    /// Requested source character-set name (e.g. `cp1252`). Defaults to
    /// asking the host, which in this driver means UTF-8.
    #[arg(long)]
    pub charset: Option<String>,

    /// Retain `#line`, `#pragma message`, `#error`, and `#pragma C` in the
    /// output instead of consuming them silently.
    #[arg(long)]
    pub preprocess_only: bool,

    /// Print every file pulled in via `#include`, in resolution order,
    /// instead of the preprocessed text.
    #[arg(long)]
    pub list_includes: bool,

    /// Use basenames only for `__FILE__` and diagnostics, for output that
    /// doesn't embed an absolute or CI-specific path.
    #[arg(long)]
    pub test_report: bool,

    /// Directory to search for `#include`, in addition to the root file's
    /// own directory. May be repeated; searched in the order given.
    #[arg(short = 'I', long = "include-path")]
    pub include_paths: Vec<PathBuf>,

    /// Write the debug macro table (`SPEC_FULL.md` §6) as JSON to this
    /// path once preprocessing finishes.
    #[arg(long)]
    pub dump_macros_json: Option<PathBuf>,

    /// Write the string-capture artifact (one tokenized string body per
    /// line) to this path once preprocessing finishes.
    #[arg(long)]
    pub capture_strings: Option<PathBuf>,

    /// Report pedantic diagnostics (backslash-space-newline, unknown
    /// escape sequences) as warnings instead of discarding them.
    #[arg(long)]
    pub pedantic: bool,

    /// Increase log verbosity: unset is warnings only, `-v` is info,
    /// `-vv` is debug and above.
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}
