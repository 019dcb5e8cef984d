//! The persisted debug macro table (`SPEC_FULL.md` §6): a snapshot of
//! every macro definition that survived to the end of the run without ever
//! being `#undef`'d, so a downstream tool (or another compilation unit
//! comparing its own table) can check whether two units agree on what a
//! shared header actually defined.
//!
//! The original stores each macro's replacement text as a token stream
//! salted with sentinel bytes (`tadspp_lexer::sentinel`) so it can be
//! rescanned directly. This crate's in-memory macro bodies are already a
//! structured [`tadspp_pp::BodyElem`] sequence rather than raw tokens, and
//! the table's own job is just "can two runs tell their macro sets are
//! identical" — so the expansion field here is instead a literal
//! re-rendering of the body as preprocessor source syntax (`#define NAME
//! body` minus the `#define NAME`). Textually identical bodies render
//! identically, which is all the comparison needs, and it stays readable
//! in a hex dump besides. See `DESIGN.md`.

use bitflags::bitflags;
use serde::Serialize;
use tadspp_pp::{BodyElem, MacroTable};

/// One macro as it will be written to / read from the debug table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugMacroEntry {
    pub name: String,
    pub function_like: bool,
    pub has_varargs: bool,
    pub formals: Vec<String>,
    pub expansion: String,
}

bitflags! {
    /// The on-disk flag byte (`SPEC_FULL.md` §6: "flag bits {bit0=has_args,
    /// bit1=has_varargs}").
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    struct EntryFlags: u8 {
        const FUNCTION_LIKE = 0x01;
        const VARARGS = 0x02;
    }
}

/// Serializes every macro in `macros` that was never `#undef`'d during the
/// run, in a simple length-prefixed binary form loosely in the spirit of
/// `rustc_serialize::opaque`'s little-endian encoder.
pub fn write_debug_table(macros: &MacroTable) -> Vec<u8> {
    let mut entries: Vec<(&str, &tadspp_pp::MacroDefinition)> =
        macros.iter().filter(|(name, _)| !macros.is_ever_undefined(name)).collect();
    entries.sort_by_key(|(name, _)| *name);

    let mut out = Vec::new();
    write_u32(&mut out, entries.len() as u32);
    for (name, def) in entries {
        write_str(&mut out, name);
        let mut flags = EntryFlags::empty();
        flags.set(EntryFlags::FUNCTION_LIKE, def.function_like);
        flags.set(EntryFlags::VARARGS, def.variadic.is_some());
        out.push(flags.bits());
        write_u32(&mut out, def.formals.len() as u32);
        for formal in &def.formals {
            write_str(&mut out, formal);
        }
        write_str(&mut out, &render_body(&def.body));
    }
    out
}

/// The inverse of [`write_debug_table`], for a tool comparing two tables
/// (or for tests). Returns `None` on any structural malformation rather
/// than panicking — a corrupted debug table is an input error, not a bug.
pub fn read_debug_table(bytes: &[u8]) -> Option<Vec<DebugMacroEntry>> {
    let mut r = Reader { bytes, pos: 0 };
    let count = r.read_u32()?;
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name = r.read_str()?;
        let flags = EntryFlags::from_bits_truncate(r.read_u8()?);
        let formal_count = r.read_u32()?;
        let mut formals = Vec::with_capacity(formal_count as usize);
        for _ in 0..formal_count {
            formals.push(r.read_str()?);
        }
        let expansion = r.read_str()?;
        out.push(DebugMacroEntry {
            name,
            function_like: flags.contains(EntryFlags::FUNCTION_LIKE),
            has_varargs: flags.contains(EntryFlags::VARARGS),
            formals,
            expansion,
        });
    }
    Some(out)
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn read_u8(&mut self) -> Option<u8> {
        let b = *self.bytes.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    fn read_u32(&mut self) -> Option<u32> {
        let slice = self.bytes.get(self.pos..self.pos + 4)?;
        self.pos += 4;
        Some(u32::from_le_bytes(slice.try_into().unwrap()))
    }

    fn read_str(&mut self) -> Option<String> {
        let len = self.read_u32()? as usize;
        let slice = self.bytes.get(self.pos..self.pos + len)?;
        self.pos += len;
        String::from_utf8(slice.to_vec()).ok()
    }
}

fn write_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn write_str(out: &mut Vec<u8>, s: &str) {
    write_u32(out, s.len() as u32);
    out.extend_from_slice(s.as_bytes());
}

/// Re-renders a parsed macro body as literal preprocessor source syntax.
fn render_body(body: &[BodyElem]) -> String {
    let mut out = String::new();
    render_into(body, &mut out);
    out
}

fn render_into(body: &[BodyElem], out: &mut String) {
    for elem in body {
        match elem {
            BodyElem::Text(s) => out.push_str(s),
            BodyElem::Formal(_) => out.push_str("<formal>"),
            BodyElem::Stringize(_) => out.push('#'),
            BodyElem::StringizeRaw(_) => out.push_str("#@"),
            BodyElem::Paste => out.push_str("##"),
            BodyElem::Argcount => out.push_str("#argcount"),
            BodyElem::Foreach { sep, body } => {
                out.push_str("#foreach (");
                render_into(sep, out);
                out.push(')');
                render_into(body, out);
                out.push_str("#endforeach");
            }
            BodyElem::IfEmpty(b) => {
                out.push_str("#ifempty");
                render_into(b, out);
                out.push_str("#endif");
            }
            BodyElem::IfNEmpty(b) => {
                out.push_str("#ifnempty");
                render_into(b, out);
                out.push_str("#endif");
            }
        }
    }
}
