// deprecation.rs

use std::fmt;

use rell_identity::Name;

/// Deprecation marker of a declaration. Informational only: matching ignores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deprecated {
    pub use_instead: Option<Name>,
    /// Report uses as errors rather than warnings
    pub error: bool,
}

impl Deprecated {
    pub fn warning() -> Self {
        Self {
            use_instead: None,
            error: false,
        }
    }

    pub fn error() -> Self {
        Self {
            use_instead: None,
            error: true,
        }
    }

    pub fn use_instead(mut self, name: impl Into<Name>) -> Self {
        self.use_instead = Some(name.into());
        self
    }
}

/// Kind of a declaration as named in deprecation diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Namespace,
    Type,
    Function,
    Constant,
    Property,
}

impl DeclarationKind {
    /// Upper-case form used in diagnostic codes (`FUNCTION`).
    pub fn code(self) -> &'static str {
        match self {
            DeclarationKind::Namespace => "NAMESPACE",
            DeclarationKind::Type => "TYPE",
            DeclarationKind::Function => "FUNCTION",
            DeclarationKind::Constant => "CONSTANT",
            DeclarationKind::Property => "PROPERTY",
        }
    }

    /// Capitalized form used in messages (`Function`).
    pub fn title(self) -> &'static str {
        match self {
            DeclarationKind::Namespace => "Namespace",
            DeclarationKind::Type => "Type",
            DeclarationKind::Function => "Function",
            DeclarationKind::Constant => "Constant",
            DeclarationKind::Property => "Property",
        }
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
