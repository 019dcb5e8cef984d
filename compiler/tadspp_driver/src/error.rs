//! CLI-only glue errors (`SPEC_FULL.md` §10.2): bad arguments and file I/O
//! that happen before there's a diagnostic sink to report through. The core
//! diagnostic machinery (`tadspp_errors::Diagnostic`/`Fatal`) stays custom;
//! this thin wrapper just gives `main` a single `?`-friendly error type,
//! matching how this tree's own driver/tool crates (e.g. `llvm-bitcode-linker`)
//! use `thiserror` for their CLI layer.

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Preprocess(#[from] tadspp_errors::Fatal),

    #[error("failed to write `{path}`: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize debug macro table: {0}")]
    Json(#[from] serde_json::Error),
}
