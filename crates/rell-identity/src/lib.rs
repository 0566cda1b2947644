// lib.rs
//
// Shared identities for the library resolution engine.
// Defines entity ids, names, and source spans as foundational primitives.

mod entities;
mod name;
mod span;

pub use entities::{ExtensionId, GenericTypeId, TypeDefId, TypeParamId};
pub use name::{Name, QualifiedName};
pub use span::Span;
