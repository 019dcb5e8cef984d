use std::io::Write;

use termcolor::{Buffer, Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing::{debug, warn};

use crate::{render::format_diagnostic, Diagnostic, Severity};

/// Default error-count ceiling before a `TOO_MANY_ERRORS` fatal is raised
/// (`SPEC_FULL.md` §7).
pub const DEFAULT_MAX_ERRORS: usize = 100;

/// Signals the non-local-exit contract described in `SPEC_FULL.md` §5 and
/// §7: a fatal diagnostic was emitted and the current compilation unit must
/// abort. Callers propagate this with `?` rather than panicking.
#[derive(Debug, Clone)]
pub struct Fatal {
    pub diagnostic: Diagnostic,
}

impl std::fmt::Display for Fatal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.diagnostic.message)
    }
}

impl std::error::Error for Fatal {}

enum Target {
    Stream(StandardStream),
    Test(Buffer),
}

impl Target {
    fn writer(&mut self) -> &mut dyn WriteColor {
        match self {
            Target::Stream(s) => s,
            Target::Test(b) => b,
        }
    }
}

/// Configuration for a [`DiagnosticSink`], mirroring the CLI/driver inputs
/// of `SPEC_FULL.md` §6 that affect error reporting.
#[derive(Clone, Debug)]
pub struct SinkConfig {
    pub pedantic: bool,
    pub quoted_filenames: bool,
    pub verbose: bool,
    pub max_errors: usize,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            pedantic: false,
            quoted_filenames: false,
            verbose: false,
            max_errors: DEFAULT_MAX_ERRORS,
        }
    }
}

/// The preprocessor/tokenizer's diagnostic sink.
///
/// Owns the running warning/error counts and renders diagnostics through
/// `termcolor` (matching `rustc_errors`'s own dependency, `SPEC_FULL.md`
/// §10.2). `report` returns `Err(Fatal)` exactly when the caller must
/// unwind: the diagnostic itself was `Fatal`/`Internal`, or the error
/// ceiling was just crossed.
pub struct DiagnosticSink {
    target: Target,
    config: SinkConfig,
    error_count: usize,
    warning_count: usize,
    too_many_errors_raised: bool,
}

impl DiagnosticSink {
    pub fn stderr(config: SinkConfig) -> Self {
        Self {
            target: Target::Stream(StandardStream::stderr(ColorChoice::Auto)),
            config,
            error_count: 0,
            warning_count: 0,
            too_many_errors_raised: false,
        }
    }

    /// An in-memory sink for tests, with color always disabled.
    pub fn buffered(config: SinkConfig) -> Self {
        Self {
            target: Target::Test(Buffer::no_color()),
            config,
            error_count: 0,
            warning_count: 0,
            too_many_errors_raised: false,
        }
    }

    /// Returns the captured text so far. Only meaningful for
    /// [`DiagnosticSink::buffered`] sinks.
    pub fn captured(&self) -> String {
        match &self.target {
            Target::Test(b) => String::from_utf8_lossy(b.as_slice()).into_owned(),
            Target::Stream(_) => String::new(),
        }
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Reports a diagnostic. Pedantic diagnostics are dropped entirely
    /// (not even counted) unless `config.pedantic` is set, matching
    /// `SPEC_FULL.md` §7.
    pub fn report(&mut self, diag: Diagnostic) -> Result<(), Fatal> {
        if diag.severity == Severity::Pedantic && !self.config.pedantic {
            debug!(code = diag.code, "suppressed pedantic diagnostic");
            return Ok(());
        }

        if diag.severity.is_counted() {
            if matches!(diag.severity, Severity::Warning | Severity::Pedantic) {
                self.warning_count += 1;
            } else {
                self.error_count += 1;
            }
        }

        self.write(&diag);

        if diag.severity.is_fatal() {
            return Err(Fatal { diagnostic: diag });
        }

        if !self.too_many_errors_raised && self.error_count > self.config.max_errors {
            self.too_many_errors_raised = true;
            let too_many = Diagnostic::fatal(
                9999,
                format!("too many errors ({} > {}); aborting", self.error_count, self.config.max_errors),
            );
            self.write(&too_many);
            return Err(Fatal { diagnostic: too_many });
        }

        Ok(())
    }

    fn write(&mut self, diag: &Diagnostic) {
        let text = format_diagnostic(diag, self.config.verbose, self.config.quoted_filenames);
        let color = severity_color(diag.severity);
        let writer = self.target.writer();
        let mut spec = ColorSpec::new();
        spec.set_fg(color).set_bold(diag.severity.is_fatal());
        let _ = writer.set_color(&spec);
        let _ = writeln!(writer, "{text}");
        let _ = writer.reset();

        if diag.severity.is_fatal() {
            warn!(code = diag.code, "fatal diagnostic raised, unwinding");
        }
    }
}

fn severity_color(sev: Severity) -> Option<Color> {
    match sev {
        Severity::Info => None,
        Severity::Pedantic | Severity::Warning => Some(Color::Yellow),
        Severity::Error => Some(Color::Red),
        Severity::Fatal | Severity::Internal => Some(Color::Red),
    }
}
