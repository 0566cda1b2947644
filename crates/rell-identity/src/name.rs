// name.rs
//
// Simple and qualified names of library members.

use std::fmt;
use std::rc::Rc;

/// A simple (single-segment) name. Cheap to clone, compared by content.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(Rc<str>);

impl Name {
    pub fn new(s: &str) -> Self {
        Self(Rc::from(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A dotted name path (`crypto.sha256`, `list.add`). Never empty.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    parts: Vec<Name>,
}

impl QualifiedName {
    pub fn of(name: Name) -> Self {
        Self { parts: vec![name] }
    }

    /// Parse a dotted string. Returns `None` for an empty string or an empty segment.
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<Name> = s.split('.').map(Name::new).collect();
        if parts.iter().any(|p| p.as_str().is_empty()) {
            return None;
        }
        Some(Self { parts })
    }

    pub fn parts(&self) -> &[Name] {
        &self.parts
    }

    pub fn last(&self) -> &Name {
        // Non-empty by construction.
        &self.parts[self.parts.len() - 1]
    }

    pub fn child(&self, name: Name) -> Self {
        let mut parts = self.parts.clone();
        parts.push(name);
        Self { parts }
    }

    /// The enclosing path, or `None` for a single-segment name.
    pub fn parent(&self) -> Option<Self> {
        if self.parts.len() <= 1 {
            None
        } else {
            Some(Self {
                parts: self.parts[..self.parts.len() - 1].to_vec(),
            })
        }
    }

    pub fn str(&self) -> String {
        self.to_string()
    }
}

impl fmt::Debug for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QualifiedName({})", self)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(part.as_str())?;
        }
        Ok(())
    }
}
