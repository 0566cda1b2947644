// doc.rs
//
// Documentation symbols attached to every declaration, for IDE metadata.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocSymbolKind {
    Namespace,
    Type,
    Extension,
    Constructor,
    Function,
    Constant,
    Property,
    Alias,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocSymbol {
    pub kind: DocSymbolKind,
    /// Qualified name of the symbol
    pub name: String,
    /// The declaration as it would be written (`function abs(integer): integer`)
    pub declaration: String,
}

impl DocSymbol {
    pub fn new(kind: DocSymbolKind, name: impl Into<String>, declaration: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            declaration: declaration.into(),
        }
    }
}
