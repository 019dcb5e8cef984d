use annotate_snippets::{Level, Renderer, Snippet};
use unicode_width::UnicodeWidthStr;

use crate::{Diagnostic, Severity};

const WRAP_COLUMN: usize = 79;

fn annotate_level(sev: Severity) -> Level {
    match sev {
        Severity::Info => Level::Info,
        Severity::Pedantic | Severity::Warning => Level::Warning,
        Severity::Error => Level::Error,
        Severity::Fatal | Severity::Internal => Level::Error,
    }
}

/// Word-wraps `text` to at most `width` display columns, matching the
/// teacher's verbose-mode diagnostic formatting (`SPEC_FULL.md` §7).
pub fn word_wrap(text: &str, width: usize) -> String {
    let mut out = String::new();
    for (i, paragraph) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let mut col = 0usize;
        let mut first_on_line = true;
        for word in paragraph.split_whitespace() {
            let w = UnicodeWidthStr::width(word);
            if !first_on_line && col + 1 + w > width {
                out.push('\n');
                col = 0;
                first_on_line = true;
            }
            if !first_on_line {
                out.push(' ');
                col += 1;
            }
            out.push_str(word);
            col += w;
            first_on_line = false;
        }
    }
    out
}

const INTERNAL_ERROR_EXPLANATION: &str = "This is a bug in the compiler, not in your program. \
Please file a report including the input that triggered it so it can be fixed.";

/// Builds the user-visible text for one diagnostic: `file(line): severity \
/// [code]: message`, optionally annotated against the offending source
/// line, and word-wrapped in verbose mode.
pub fn format_diagnostic(diag: &Diagnostic, verbose: bool, quoted_filenames: bool) -> String {
    let header = match &diag.location {
        Some(loc) => {
            let file = if quoted_filenames { format!("\"{}\"", loc.file) } else { loc.file.clone() };
            format!("{file}({}): {} [{:04}]", loc.line, diag.severity, diag.code)
        }
        None => format!("{}: {} [{:04}]", "tadspp", diag.severity, diag.code),
    };

    let mut message = diag.message.clone();
    if diag.severity == Severity::Internal {
        message.push(' ');
        message.push_str(INTERNAL_ERROR_EXPLANATION);
    }

    let body = if verbose { word_wrap(&message, WRAP_COLUMN) } else { message };

    if let Some(src) = &diag.source_line {
        let line_no = diag.location.as_ref().map(|l| l.line as usize).unwrap_or(1);
        let origin = diag.location.as_ref().map(|l| l.file.as_str()).unwrap_or("<input>");
        let snippet = Snippet::source(src.as_str())
            .line_start(line_no)
            .origin(origin)
            .fold(false)
            .annotation(annotate_level(diag.severity).span(0..src.len()));
        let message = annotate_level(diag.severity).title(body.as_str()).snippet(snippet);
        Renderer::plain().render(message).to_string()
    } else {
        format!("{header}: {body}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_long_lines() {
        let text = "one two three four five six seven eight nine ten eleven twelve thirteen fourteen fifteen sixteen";
        let wrapped = word_wrap(text, 20);
        for line in wrapped.split('\n') {
            assert!(UnicodeWidthStr::width(line) <= 20, "line too long: {line:?}");
        }
    }

    #[test]
    fn format_includes_file_line_severity_code() {
        let diag = Diagnostic::error(123, "unterminated string").at("foo.t", 10);
        let text = format_diagnostic(&diag, false, false);
        assert_eq!(text, "foo.t(10): error [0123]: unterminated string");
    }

    #[test]
    fn quoted_filename_when_requested() {
        let diag = Diagnostic::warning(1, "redefinition").at("foo.t", 1);
        let text = format_diagnostic(&diag, false, true);
        assert!(text.starts_with("\"foo.t\"(1):"));
    }

    #[test]
    fn internal_gets_explanation_paragraph() {
        let diag = Diagnostic::internal(1, "bad state").at("foo.t", 1);
        let text = format_diagnostic(&diag, false, false);
        assert!(text.contains("This is a bug in the compiler"));
    }
}
