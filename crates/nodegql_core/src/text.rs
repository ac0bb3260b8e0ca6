//! String interning for the parsed type-definition AST.

use rustc_hash::FxHashMap;
use std::cell::RefCell;

/// An interned text identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Text(u32);

/// A string interner that deduplicates names seen by the parser.
///
/// One interner is created per schema build; it is never shared between
/// builds.
#[derive(Debug)]
pub struct Interner {
    map: RefCell<FxHashMap<String, Text>>,
    strings: RefCell<Vec<String>>,
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl Interner {
    /// Creates a new interner with the built-in scalars and the recognized
    /// directive names pre-registered.
    #[must_use]
    pub fn new() -> Self {
        let interner = Self {
            map: RefCell::new(FxHashMap::default()),
            strings: RefCell::new(Vec::new()),
        };

        for name in [
            "Int",
            "Float",
            "String",
            "Boolean",
            "ID",
            "node",
            "relationship",
            "relationshipProperties",
            "declareRelationship",
            "query",
            "mutation",
            "settable",
            "filterable",
            "selectable",
            "sortable",
            "plural",
            "deprecated",
        ] {
            interner.intern(name);
        }

        interner
    }

    /// Interns a string, returning its identifier.
    pub fn intern(&self, s: &str) -> Text {
        if let Some(&id) = self.map.borrow().get(s) {
            return id;
        }

        let mut strings = self.strings.borrow_mut();
        let id = Text(strings.len() as u32);
        strings.push(s.to_string());
        self.map.borrow_mut().insert(s.to_string(), id);
        id
    }

    /// Gets the string for an identifier.
    #[must_use]
    pub fn get(&self, id: Text) -> String {
        self.strings
            .borrow()
            .get(id.0 as usize)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns true if `id` was interned from `s`.
    #[must_use]
    pub fn is(&self, id: Text, s: &str) -> bool {
        self.strings
            .borrow()
            .get(id.0 as usize)
            .is_some_and(|stored| stored == s)
    }

    /// Returns the number of interned strings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.borrow().len()
    }

    /// Returns true if no strings are interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern() {
        let interner = Interner::new();
        let id1 = interner.intern("Movie");
        let id2 = interner.intern("Movie");
        let id3 = interner.intern("Actor");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_eq!(interner.get(id3), "Actor");
    }

    #[test]
    fn test_directive_names_preregistered() {
        let interner = Interner::new();
        let before = interner.len();
        let id = interner.intern("relationship");
        assert_eq!(interner.len(), before);
        assert!(interner.is(id, "relationship"));
    }
}
