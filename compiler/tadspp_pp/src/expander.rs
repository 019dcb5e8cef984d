//! Macro invocation parsing and substitution.
//!
//! This expander works over plain text rather than splicing arena-backed
//! token objects: a macro's parsed body is rendered to a `String` and the
//! result is rescanned for further invocations in one pass. This is a
//! deliberate simplification of the original's token-splice-with-sentinel-
//! markers approach (`SPEC_FULL.md` §9) — it keeps the same externally
//! observable behavior (including rescan and the ANSI C self-reference
//! rule) without needing unsafe buffer-lifetime tricks.

use crate::macro_def::BodyElem;
use crate::macro_table::MacroTable;

/// `SPEC_FULL.md` §10.5: a hard cap on formal/actual argument count,
/// matching the original's `TOK_MAX_MACRO_ARGS`.
pub const TOK_MAX_MACRO_ARGS: usize = 128;

/// How serious a recoverable macro-expansion problem is
/// (`SPEC_FULL.md` §7: errors are counted and compilation continues;
/// warnings are counted only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandSeverity {
    Warning,
    Error,
}

/// A recoverable problem found while expanding one top-level call to
/// [`MacroExpander::expand`]. Unlike a hard parse failure, these never
/// abort expansion: the expander always finishes and returns text.
#[derive(Debug, Clone)]
pub struct ExpandDiagnostic {
    pub severity: ExpandSeverity,
    pub message: String,
}

/// The arguments bound to one macro invocation.
#[derive(Clone, Debug, Default)]
struct ArgBinding {
    singles: Vec<String>,
    variadic: Option<Vec<String>>,
}

impl ArgBinding {
    fn formal(&self, idx: usize, variadic_idx: Option<usize>) -> String {
        if variadic_idx == Some(idx) {
            self.variadic.as_deref().unwrap_or(&[]).join(", ")
        } else {
            self.singles.get(idx).cloned().unwrap_or_default()
        }
    }
}

/// Expands macro invocations in `text` against `table`, rescanning
/// expansions for further invocations.
///
/// One `MacroExpander` should be used per top-level `expand` call; the
/// `expanding` stack it carries exists only for the duration of that call,
/// implementing the "a macro is not re-expanded inside its own expansion"
/// rule (`SPEC_FULL.md` §4.4).
pub struct MacroExpander<'a> {
    table: &'a MacroTable,
    expanding: Vec<String>,
    diagnostics: Vec<ExpandDiagnostic>,
}

impl<'a> MacroExpander<'a> {
    pub fn new(table: &'a MacroTable) -> Self {
        Self { table, expanding: Vec::new(), diagnostics: Vec::new() }
    }

    /// Expands `text`, returning the expanded text and every recoverable
    /// diagnostic raised along the way (`SPEC_FULL.md` §7: macro-argument
    /// errors skip to the closing `)` and expansion continues; nothing here
    /// is fatal).
    pub fn expand(&mut self, text: &str) -> (String, Vec<ExpandDiagnostic>) {
        let chars: Vec<char> = text.chars().collect();
        let out = self.expand_chars(&chars);
        (out, std::mem::take(&mut self.diagnostics))
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.diagnostics.push(ExpandDiagnostic { severity: ExpandSeverity::Warning, message: message.into() });
    }

    fn error(&mut self, message: impl Into<String>) {
        self.diagnostics.push(ExpandDiagnostic { severity: ExpandSeverity::Error, message: message.into() });
    }

    fn expand_chars(&mut self, chars: &[char]) -> String {
        let mut out = String::new();
        let mut i = 0;

        while i < chars.len() {
            let Some(name) = ident_at(chars, i) else {
                out.push(chars[i]);
                i += 1;
                continue;
            };

            let after_name = i + name.chars().count();
            let Some(def) = self.table.get(&name) else {
                out.push_str(&name);
                i = after_name;
                continue;
            };

            if self.expanding.contains(&name) {
                out.push_str(&name);
                i = after_name;
                continue;
            }

            if def.function_like {
                let mut k = after_name;
                while matches!(chars.get(k), Some(' ') | Some('\t')) {
                    k += 1;
                }
                if chars.get(k) != Some(&'(') {
                    out.push_str(&name);
                    i = after_name;
                    continue;
                }

                let Some((args, end)) = parse_call_args(chars, k) else {
                    self.error(format!("unterminated invocation of macro `{name}`"));
                    out.push_str(&name);
                    i = after_name;
                    continue;
                };

                match bind_args(def.formals.len(), def.variadic, &args, &mut self.diagnostics) {
                    Some(binding) => {
                        let rendered = render(&def.body, &binding, def.variadic);
                        self.expanding.push(name.clone());
                        let mut combined: Vec<char> = rendered.chars().collect();
                        combined.extend_from_slice(&chars[end..]);
                        let rescanned = self.expand_chars(&combined);
                        self.expanding.pop();
                        out.push_str(&rescanned);
                        return out;
                    }
                    None => {
                        // Too many actuals (or over the hard cap): the call
                        // is left unexpanded and we skip to just past the
                        // closing `)`, then resume scanning normally.
                        let verbatim: String = chars[i..end].iter().collect();
                        out.push_str(&verbatim);
                        i = end;
                        continue;
                    }
                }
            }

            let binding = ArgBinding::default();
            let rendered = render(&def.body, &binding, None);
            self.expanding.push(name.clone());
            let mut combined: Vec<char> = rendered.chars().collect();
            combined.extend_from_slice(&chars[after_name..]);
            let rescanned = self.expand_chars(&combined);
            self.expanding.pop();
            out.push_str(&rescanned);
            return out;
        }

        out
    }
}

fn ident_at(chars: &[char], start: usize) -> Option<String> {
    let c0 = *chars.get(start)?;
    if !(c0.is_alphabetic() || c0 == '_') {
        return None;
    }
    let mut end = start + 1;
    while chars.get(end).is_some_and(|c| c.is_alphanumeric() || *c == '_') {
        end += 1;
    }
    Some(chars[start..end].iter().collect())
}

/// Parses `(arg1, arg2, ...)` starting at the `(` found at `open`, splitting
/// on top-level commas (nested brackets and quoted strings are opaque to
/// the split). Returns the arguments and the index just past the matching
/// `)`.
fn parse_call_args(chars: &[char], open: usize) -> Option<(Vec<String>, usize)> {
    let mut depth = 0i32;
    let mut i = open;
    let mut args = Vec::new();
    let mut cur = String::new();

    loop {
        let c = *chars.get(i)?;
        match c {
            '(' | '[' | '{' => {
                depth += 1;
                if depth > 1 {
                    cur.push(c);
                }
            }
            ')' | ']' | '}' => {
                depth -= 1;
                if depth == 0 {
                    args.push(cur.trim().to_string());
                    i += 1;
                    break;
                }
                cur.push(c);
            }
            '"' | '\'' => {
                cur.push(c);
                i += 1;
                let quote = c;
                while let Some(&q) = chars.get(i) {
                    cur.push(q);
                    if q == '\\' {
                        i += 1;
                        if let Some(&esc) = chars.get(i) {
                            cur.push(esc);
                        }
                    } else if q == quote {
                        i += 1;
                        break;
                    }
                    i += 1;
                }
                continue;
            }
            ',' if depth == 1 => {
                args.push(cur.trim().to_string());
                cur.clear();
            }
            _ => {
                cur.push(c);
            }
        }
        i += 1;
    }

    // "()" with nothing (not even whitespace worth keeping) between the
    // parens is a zero-argument call, not a call with one empty argument.
    if args.len() == 1 && args[0].is_empty() {
        args.clear();
    }
    Some((args, i))
}

/// Binds `args` to a macro's formal parameters.
///
/// `SPEC_FULL.md` §7/§10.5: too many actuals (including more than
/// [`TOK_MAX_MACRO_ARGS`]) is an error and the call is left unexpanded;
/// too few is a warning and the missing formals are filled with the empty
/// string. Returns `None` for the too-many case so the caller can skip to
/// the closing `)` without rendering the body.
fn bind_args(
    fixed_count: usize,
    variadic: Option<usize>,
    args: &[String],
    diagnostics: &mut Vec<ExpandDiagnostic>,
) -> Option<ArgBinding> {
    if args.len() > TOK_MAX_MACRO_ARGS {
        diagnostics.push(ExpandDiagnostic {
            severity: ExpandSeverity::Error,
            message: format!(
                "macro invocation has {} arguments, more than the {TOK_MAX_MACRO_ARGS} maximum",
                args.len()
            ),
        });
        return None;
    }

    match variadic {
        None => {
            let expected = fixed_count;
            if expected == 0 && args.len() == 1 && args[0].is_empty() {
                return Some(ArgBinding::default());
            }
            if args.len() > expected {
                diagnostics.push(ExpandDiagnostic {
                    severity: ExpandSeverity::Error,
                    message: format!(
                        "too many arguments to macro (expected {expected}, got {})",
                        args.len()
                    ),
                });
                return None;
            }
            if args.len() < expected {
                diagnostics.push(ExpandDiagnostic {
                    severity: ExpandSeverity::Warning,
                    message: format!(
                        "too few arguments to macro (expected {expected}, got {}); missing arguments treated as empty",
                        args.len()
                    ),
                });
            }
            let mut singles = args.to_vec();
            singles.resize(expected, String::new());
            Some(ArgBinding { singles, variadic: None })
        }
        Some(v) => {
            if args.len() < v {
                diagnostics.push(ExpandDiagnostic {
                    severity: ExpandSeverity::Warning,
                    message: format!(
                        "too few arguments to variadic macro (expected at least {v}, got {}); missing arguments treated as empty",
                        args.len()
                    ),
                });
                let mut singles = args.to_vec();
                singles.resize(v, String::new());
                return Some(ArgBinding { singles, variadic: Some(Vec::new()) });
            }
            let singles = args[..v].to_vec();
            let variadic_args = args[v..].to_vec();
            Some(ArgBinding { singles, variadic: Some(variadic_args) })
        }
    }
}

fn render(body: &[BodyElem], binding: &ArgBinding, variadic_idx: Option<usize>) -> String {
    let mut out = String::new();
    let mut suppress_leading_ws = false;
    let mut just_pasted = false;

    for elem in body {
        if matches!(elem, BodyElem::Paste) {
            while matches!(out.chars().last(), Some(' ') | Some('\t')) {
                out.pop();
            }
            suppress_leading_ws = true;
            just_pasted = true;
            continue;
        }

        let mut piece = render_one(elem, binding, variadic_idx);
        if suppress_leading_ws {
            piece = piece.trim_start().to_string();
            suppress_leading_ws = false;
        }

        // `a, ##__VA_ARGS__` with no variadic actuals elides the trailing
        // comma along with the (already-empty) paste operand — the
        // standard "comma paste" idiom for optional trailing arguments.
        if just_pasted && piece.is_empty() && matches!(elem, BodyElem::Formal(idx) if Some(*idx) == variadic_idx)
        {
            while matches!(out.chars().last(), Some(',')) {
                out.pop();
                while matches!(out.chars().last(), Some(' ') | Some('\t')) {
                    out.pop();
                }
            }
        }
        just_pasted = false;

        out.push_str(&piece);
    }

    out
}

fn render_one(elem: &BodyElem, binding: &ArgBinding, variadic_idx: Option<usize>) -> String {
    match elem {
        BodyElem::Text(s) => s.clone(),
        BodyElem::Formal(idx) => binding.formal(*idx, variadic_idx),
        BodyElem::Stringize(idx) => stringize(&binding.formal(*idx, variadic_idx), true),
        BodyElem::StringizeRaw(idx) => stringize(&binding.formal(*idx, variadic_idx), false),
        BodyElem::Paste => String::new(),
        BodyElem::Argcount => binding.variadic.as_ref().map_or(0, |v| v.len()).to_string(),
        BodyElem::Foreach { sep, body } => {
            let Some(items) = binding.variadic.as_ref() else { return String::new() };
            let rendered_sep = render(sep, binding, variadic_idx);
            let mut pieces = Vec::with_capacity(items.len());
            for item in items {
                let mut iter_binding = binding.clone();
                iter_binding.variadic = Some(vec![item.clone()]);
                pieces.push(render(body, &iter_binding, variadic_idx));
            }
            pieces.join(&rendered_sep)
        }
        BodyElem::IfEmpty(body) => {
            if binding.variadic.as_ref().map_or(true, |v| v.is_empty()) {
                render(body, binding, variadic_idx)
            } else {
                String::new()
            }
        }
        BodyElem::IfNEmpty(body) => {
            if binding.variadic.as_ref().is_some_and(|v| !v.is_empty()) {
                render(body, binding, variadic_idx)
            } else {
                String::new()
            }
        }
    }
}

fn stringize(s: &str, quote: bool) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    if quote {
        out.push('"');
    }
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    if quote {
        out.push('"');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macro_def::{parse_body, MacroDefinition};

    fn define_object(table: &mut MacroTable, name: &str, body: &str) {
        let parsed = parse_body(body, &[]).unwrap();
        table.define(MacroDefinition::object_like(name, parsed));
    }

    fn define_function(table: &mut MacroTable, name: &str, formals: &[&str], body: &str) {
        let formals: Vec<String> = formals.iter().map(|s| s.to_string()).collect();
        let parsed = parse_body(body, &formals).unwrap();
        table.define(MacroDefinition {
            name: name.to_string(),
            function_like: true,
            formals,
            variadic: None,
            body: parsed,
        });
    }

    #[test]
    fn object_like_expansion() {
        let mut table = MacroTable::new();
        define_object(&mut table, "FOO", "1 + 2");
        let mut e = MacroExpander::new(&table);
        assert_eq!(e.expand("x = FOO;").0, "x = 1 + 2;");
    }

    #[test]
    fn expansion_rescans_for_further_macros() {
        let mut table = MacroTable::new();
        define_object(&mut table, "A", "B");
        define_object(&mut table, "B", "42");
        let mut e = MacroExpander::new(&table);
        assert_eq!(e.expand("A").0, "42");
    }

    #[test]
    fn self_reference_is_not_re_expanded() {
        let mut table = MacroTable::new();
        define_object(&mut table, "X", "X + 1");
        let mut e = MacroExpander::new(&table);
        assert_eq!(e.expand("X").0, "X + 1");
    }

    #[test]
    fn function_like_macro_substitutes_arguments() {
        let mut table = MacroTable::new();
        define_function(&mut table, "ADD", &["a", "b"], "(a + b)");
        let mut e = MacroExpander::new(&table);
        assert_eq!(e.expand("ADD(1, 2)").0, "(1 + 2)");
    }

    #[test]
    fn function_like_macro_not_invoked_without_parens() {
        let mut table = MacroTable::new();
        define_function(&mut table, "ADD", &["a", "b"], "(a + b)");
        let mut e = MacroExpander::new(&table);
        assert_eq!(e.expand("ADD;").0, "ADD;");
    }

    #[test]
    fn stringize_and_paste_operators() {
        let mut table = MacroTable::new();
        define_function(&mut table, "MK", &["x", "y"], "#x ## y");
        let mut e = MacroExpander::new(&table);
        assert_eq!(e.expand("MK(foo, bar)").0, "\"foo\"bar");
    }

    #[test]
    fn variadic_macro_argcount_and_foreach() {
        let mut table = MacroTable::new();
        let formals: Vec<String> = vec!["fmt".into(), "args".into()];
        let body = parse_body("#argcount:#foreach (,)args#endforeach", &formals).unwrap();
        table.define(MacroDefinition {
            name: "LOG".into(),
            function_like: true,
            formals,
            variadic: Some(1),
            body,
        });
        let mut e = MacroExpander::new(&table);
        assert_eq!(e.expand("LOG(\"x\", 1, 2, 3)").0, "3:1,2,3");
    }

    #[test]
    fn ifempty_and_ifnempty_branch_on_variadic_args() {
        let mut table = MacroTable::new();
        let formals: Vec<String> = vec!["args".into()];
        let body = parse_body("#ifempty none #endif#ifnempty some #endif", &formals).unwrap();
        table.define(MacroDefinition {
            name: "M".into(),
            function_like: true,
            formals: formals.clone(),
            variadic: Some(0),
            body: body.clone(),
        });
        let mut e = MacroExpander::new(&table);
        assert_eq!(e.expand("M()").0.trim(), "none");

        let mut table2 = MacroTable::new();
        table2.define(MacroDefinition {
            name: "M".into(),
            function_like: true,
            formals,
            variadic: Some(0),
            body,
        });
        let mut e2 = MacroExpander::new(&table2);
        assert_eq!(e2.expand("M(1)").0.trim(), "some");
    }

    #[test]
    fn comma_paste_elides_comma_for_empty_varargs_only() {
        let mut table = MacroTable::new();
        let formals: Vec<String> = vec!["x".into(), "rest".into()];
        let body = parse_body("f(x, ##rest)", &formals).unwrap();
        table.define(MacroDefinition {
            name: "V".into(),
            function_like: true,
            formals,
            variadic: Some(1),
            body,
        });
        let mut e = MacroExpander::new(&table);
        assert_eq!(e.expand("V(1)").0, "f(1)");
        assert_eq!(e.expand("V(1,2)").0, "f(1, 2)");
    }

    #[test]
    fn too_few_arguments_warns_and_fills_empty() {
        let mut table = MacroTable::new();
        define_function(&mut table, "ADD", &["a", "b"], "(a + b)");
        let mut e = MacroExpander::new(&table);
        let (text, diags) = e.expand("ADD(1)");
        assert_eq!(text, "(1 + )");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, ExpandSeverity::Warning);
    }

    #[test]
    fn too_many_arguments_errors_and_leaves_call_unexpanded() {
        let mut table = MacroTable::new();
        define_function(&mut table, "ADD", &["a", "b"], "(a + b)");
        let mut e = MacroExpander::new(&table);
        let (text, diags) = e.expand("ADD(1, 2, 3);");
        assert_eq!(text, "ADD(1, 2, 3);");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, ExpandSeverity::Error);
    }

    #[test]
    fn more_than_max_macro_args_is_an_error() {
        let mut table = MacroTable::new();
        define_function(&mut table, "F", &["a"], "a");
        let mut e = MacroExpander::new(&table);
        let actuals = (0..TOK_MAX_MACRO_ARGS + 1).map(|n| n.to_string()).collect::<Vec<_>>().join(", ");
        let (text, diags) = e.expand(&format!("F({actuals})"));
        assert_eq!(text, format!("F({actuals})"));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, ExpandSeverity::Error);
    }
}
