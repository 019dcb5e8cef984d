//! The table of currently-defined macros.

use rustc_hash::FxHashMap;

use crate::macro_def::MacroDefinition;

/// Outcome of a `#define`, used by the directive processor to decide
/// whether to warn about redefinition (`SPEC_FULL.md` §4.3: identical
/// redefinitions are silently accepted, ANSI C style; differing ones warn
/// but still replace the old definition).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefineOutcome {
    New,
    IdenticalRedefinition,
    ChangedRedefinition,
}

#[derive(Default)]
pub struct MacroTable {
    macros: FxHashMap<String, MacroDefinition>,
    /// Names that have been `#undef`'d at least once, even if later
    /// redefined. The debug macro table (`SPEC_FULL.md` §6) omits these:
    /// only a name with one stable, never-retracted definition for the
    /// whole compilation is eligible for the persisted artifact.
    ever_undefined: rustc_hash::FxHashSet<String>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&MacroDefinition> {
        self.macros.get(name)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    pub fn is_ever_undefined(&self, name: &str) -> bool {
        self.ever_undefined.contains(name)
    }

    pub fn define(&mut self, def: MacroDefinition) -> DefineOutcome {
        match self.macros.get(&def.name) {
            None => {
                self.macros.insert(def.name.clone(), def);
                DefineOutcome::New
            }
            Some(existing) => {
                let outcome = if existing.same_as(&def) {
                    DefineOutcome::IdenticalRedefinition
                } else {
                    DefineOutcome::ChangedRedefinition
                };
                self.macros.insert(def.name.clone(), def);
                outcome
            }
        }
    }

    pub fn undefine(&mut self, name: &str) -> bool {
        self.ever_undefined.insert(name.to_string());
        self.macros.remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MacroDefinition)> {
        self.macros.iter().map(|(k, v)| (k.as_str(), v))
    }
}
