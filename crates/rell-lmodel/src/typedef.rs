// typedef.rs
//
// Type definitions, extensions and their members.

use std::rc::Rc;

use rell_identity::{ExtensionId, GenericTypeId, Name, QualifiedName, TypeDefId, TypeParamId};
use rell_mtype::{FunctionHeader, TypeId, TypeSet};

use crate::deprecation::Deprecated;
use crate::doc::DocSymbol;
use crate::function::{FunctionBody, LibFunction};

#[derive(Debug, Clone)]
pub struct LibConstant {
    pub simple_name: Name,
    pub ty: TypeId,
    /// The value as a literal; evaluation belongs to the runtime.
    pub value: String,
    pub deprecated: Option<Deprecated>,
    pub doc: DocSymbol,
}

/// A value property (`x.size`) or, at namespace level, a global property.
#[derive(Debug, Clone)]
pub struct LibProperty {
    pub simple_name: Name,
    pub ty: TypeId,
    pub body: FunctionBody,
    pub deprecated: Option<Deprecated>,
    pub doc: DocSymbol,
}

/// A constructor. Its result is the owning type; `header` carries only the
/// constructor's own type params.
#[derive(Debug, Clone)]
pub struct LibConstructor {
    pub header: FunctionHeader,
    pub body: FunctionBody,
    pub deprecated: Option<Deprecated>,
    pub doc: DocSymbol,
}

#[derive(Debug, Clone)]
pub struct TypeDefFunction {
    pub function: Rc<LibFunction>,
    pub is_static: bool,
    pub deprecated: Option<Deprecated>,
    pub doc: DocSymbol,
}

/// Another name for a member of the same type, by index into the member list.
#[derive(Debug, Clone)]
pub struct TypeDefAlias {
    pub simple_name: Name,
    pub target: usize,
    pub deprecated: Option<Deprecated>,
    pub doc: DocSymbol,
}

#[derive(Debug, Clone)]
pub enum TypeDefMember {
    Constant(LibConstant),
    Property(LibProperty),
    Constructor(LibConstructor),
    Function(TypeDefFunction),
    Alias(TypeDefAlias),
}

impl TypeDefMember {
    /// `None` for constructors.
    pub fn simple_name(&self) -> Option<&Name> {
        match self {
            TypeDefMember::Constant(c) => Some(&c.simple_name),
            TypeDefMember::Property(p) => Some(&p.simple_name),
            TypeDefMember::Constructor(_) => None,
            TypeDefMember::Function(f) => Some(f.function.simple_name()),
            TypeDefMember::Alias(a) => Some(&a.simple_name),
        }
    }

    pub fn doc(&self) -> &DocSymbol {
        match self {
            TypeDefMember::Constant(c) => &c.doc,
            TypeDefMember::Property(p) => &p.doc,
            TypeDefMember::Constructor(c) => &c.doc,
            TypeDefMember::Function(f) => &f.doc,
            TypeDefMember::Alias(a) => &a.doc,
        }
    }
}

#[derive(Debug)]
pub struct TypeDef {
    pub id: TypeDefId,
    pub qualified_name: QualifiedName,
    pub generic: GenericTypeId,
    pub members: Vec<TypeDefMember>,
    /// Converted, but not reachable by name
    pub hidden: bool,
    pub doc: DocSymbol,
}

impl TypeDef {
    pub fn simple_name(&self) -> &Name {
        self.qualified_name.last()
    }
}

/// Members attached to every type in `SubOf(self_type)`, with `type_params` free.
#[derive(Debug)]
pub struct TypeExtension {
    pub id: ExtensionId,
    pub qualified_name: QualifiedName,
    pub type_params: Vec<TypeParamId>,
    pub self_type: TypeId,
    pub members: Vec<TypeDefMember>,
    pub doc: DocSymbol,
}

impl TypeExtension {
    pub fn target(&self) -> TypeSet {
        TypeSet::SubOf(self.self_type)
    }
}
