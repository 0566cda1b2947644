//! Library definition model: the declarative description of system namespaces, types,
//! extensions and functions, plus the builder used to declare them.
//!
//! The model is read-only input to registry conversion. Everything here is plain data
//! shared through `Rc`; identity (for memoization) is the `TypeDefId`/`ExtensionId` or
//! the `Rc` pointer of a namespace member.

mod builder;
mod deprecation;
mod doc;
mod errors;
mod function;
mod namespace;
mod typedef;

pub use builder::{FunctionDecl, ModuleBuilder, TypeDefBuilder, TypeHandle, TypeParamDecl};
pub use deprecation::{DeclarationKind, Deprecated};
pub use doc::{DocSymbol, DocSymbolKind};
pub use errors::DeclError;
pub use function::{BodyMeta, FunctionBody, LibFunction, SysFunction};
pub use namespace::{LibModule, Namespace, NamespaceMember, NamespaceMemberKind};
pub use typedef::{
    LibConstant, LibConstructor, LibProperty, TypeDef, TypeDefAlias, TypeDefFunction,
    TypeDefMember, TypeExtension,
};
