//! The filesystem-backed [`ResourceLoader`] (`SPEC_FULL.md` §6): resolves
//! `#include` paths against the root file's own directory first, then each
//! `-I`/`--include-path` directory in the order given, matching ordinary C
//! preprocessor include-search semantics.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tadspp::{HostInterface, ResourceLoader};

pub struct FsLoader {
    base_dir: PathBuf,
    include_paths: Vec<PathBuf>,
}

impl FsLoader {
    pub fn new(base_dir: PathBuf, include_paths: Vec<PathBuf>) -> Self {
        Self { base_dir, include_paths }
    }
}

impl ResourceLoader for FsLoader {
    fn open(&self, raw_path: &str) -> io::Result<Vec<u8>> {
        let direct = Path::new(raw_path);
        if direct.is_absolute() && direct.exists() {
            return fs::read(direct);
        }
        for dir in std::iter::once(&self.base_dir).chain(self.include_paths.iter()) {
            let candidate = dir.join(raw_path);
            if candidate.exists() {
                return fs::read(candidate);
            }
        }
        fs::read(direct)
    }
}

/// Plain stdio [`HostInterface`], used for `--list-includes` output and
/// the handful of informational messages the driver itself prints.
pub struct StdioHost;

impl HostInterface for StdioHost {
    fn print_msg(&mut self, msg: &str) {
        println!("{msg}");
    }

    fn print_err(&mut self, msg: &str) {
        eprintln!("{msg}");
    }

    fn print_step(&mut self, msg: &str) {
        eprintln!("-- {msg}");
    }
}
