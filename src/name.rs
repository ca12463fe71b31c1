//! Interned names for variables, facts, and operators.
//!
//! Grounded SAS³ tasks carry a name string for every variable value and every
//! operator; many of those strings repeat across an instance (e.g. the same
//! predicate name instantiated over many objects). We deduplicate them the
//! way the teacher's `parsed_types::Name` did, just backed by `once_cell`
//! instead of `lazy_static`.

use once_cell::sync::Lazy;
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;
use std::sync::{Arc, Mutex};

static STRING_INTERNING: Lazy<Mutex<Vec<Arc<str>>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// A deduplicated, cheaply-clonable string.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Name(Arc<str>);

impl Name {
    pub fn new(s: impl AsRef<str>) -> Self {
        let s = s.as_ref();
        let mut table = STRING_INTERNING.lock().unwrap();
        if let Some(existing) = table.iter().find(|existing| existing.as_ref() == s) {
            return Name(existing.clone());
        }
        let interned: Arc<str> = Arc::from(s);
        table.push(interned.clone());
        Name(interned)
    }
}

impl Deref for Name {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name::new(s)
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Name::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_strings_intern_to_the_same_allocation() {
        let a = Name::new("pickup");
        let b = Name::new("pickup");
        assert!(Arc::ptr_eq(&a.0, &b.0));
    }
}
