//! The standalone driver binary (`SPEC_FULL.md` §2 `tadspp_driver`,
//! §10.3): wires a filesystem [`FsLoader`] and a stderr diagnostic sink to
//! `tadspp::preprocess`, then renders whichever output mode was asked for.

mod cli;
mod error;
mod fs_loader;

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use tadspp::PpConfig;
use tadspp_errors::{DiagnosticSink, SinkConfig};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use error::CliError;
use fs_loader::{FsLoader, StdioHost};
use tadspp::HostInterface;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("tadspp: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Mirrors how rustc's own driver wires up its tracing subscriber from
/// `RUSTC_LOG`: `RUST_LOG` wins if set, otherwise `-v`/`-vv` pick a level.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        };
        EnvFilter::new(level)
    });
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let base_dir = cli.root.parent().map(|p| p.to_path_buf()).unwrap_or_default();
    let loader = FsLoader::new(base_dir, cli.include_paths.clone());

    let config = PpConfig {
        charset: cli.charset.clone(),
        preprocess_only: cli.preprocess_only,
        list_includes: cli.list_includes,
        test_report: cli.test_report,
        include_paths: cli.include_paths.iter().map(|p| p.to_string_lossy().into_owned()).collect(),
    };

    let sink_config = SinkConfig { pedantic: cli.pedantic, verbose: cli.verbose > 0, ..SinkConfig::default() };
    let mut diags = DiagnosticSink::stderr(sink_config);

    let root_path = cli.root.to_string_lossy().into_owned();
    let mut host = StdioHost;
    if cli.verbose > 0 {
        host.print_step(&format!("preprocessing {root_path}"));
    }
    let unit = tadspp::preprocess(&loader, &config, &root_path, &mut diags)?;

    if cli.list_includes {
        for path in tadspp::list_includes(&unit.files) {
            println!("{path}");
        }
        return Ok(());
    }

    if let Some(path) = &cli.dump_macros_json {
        let bytes = tadspp::write_debug_table(&unit.macros);
        let entries = tadspp::read_debug_table(&bytes).expect("just-written debug table always parses");
        let json = serde_json::to_vec_pretty(&entries)?;
        fs::write(path, json).map_err(|source| CliError::Write { path: path.clone(), source })?;
    }

    if let Some(path) = &cli.capture_strings {
        let (mut stream, files) = unit.into_token_stream();
        let mut arena = tadspp_span::SourceArena::new();
        let mut tokens = Vec::new();
        loop {
            let tok = stream.next(&files, &mut arena, &mut diags)?;
            if tok.is_eof() {
                break;
            }
            tokens.push(tok);
        }
        let bytes = tadspp::capture_strings(&tokens, &arena);
        fs::write(path, bytes).map_err(|source| CliError::Write { path: path.clone(), source })?;
        return Ok(());
    }

    print!("{}", unit.text);
    Ok(())
}
