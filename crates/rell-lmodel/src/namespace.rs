// namespace.rs

use std::rc::Rc;

use rell_identity::{Name, QualifiedName};

use crate::deprecation::{DeclarationKind, Deprecated};
use crate::doc::DocSymbol;
use crate::function::LibFunction;
use crate::typedef::{LibConstant, LibProperty, TypeDef, TypeExtension};

#[derive(Debug, Clone, Default)]
pub struct Namespace {
    /// In declaration order
    pub members: Vec<Rc<NamespaceMember>>,
}

impl Namespace {
    /// All members declared under `name`, in declaration order.
    pub fn members_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Rc<NamespaceMember>> + 'a {
        self.members
            .iter()
            .filter(move |m| m.simple_name().as_str() == name)
    }
}

#[derive(Debug)]
pub struct NamespaceMember {
    pub qualified_name: QualifiedName,
    pub doc: DocSymbol,
    pub kind: NamespaceMemberKind,
}

#[derive(Debug)]
pub enum NamespaceMemberKind {
    Namespace(Namespace),
    Type {
        typedef: Rc<TypeDef>,
        deprecated: Option<Deprecated>,
    },
    Extension(Rc<TypeExtension>),
    Function {
        function: Rc<LibFunction>,
        deprecated: Option<Deprecated>,
    },
    Constant(LibConstant),
    Property(LibProperty),
    Alias {
        target: Rc<NamespaceMember>,
        deprecated: Option<Deprecated>,
    },
}

impl NamespaceMember {
    pub fn simple_name(&self) -> &Name {
        self.qualified_name.last()
    }

    pub fn deprecated(&self) -> Option<&Deprecated> {
        match &self.kind {
            NamespaceMemberKind::Type { deprecated, .. }
            | NamespaceMemberKind::Function { deprecated, .. }
            | NamespaceMemberKind::Alias { deprecated, .. } => deprecated.as_ref(),
            NamespaceMemberKind::Constant(c) => c.deprecated.as_ref(),
            NamespaceMemberKind::Property(p) => p.deprecated.as_ref(),
            NamespaceMemberKind::Namespace(_) | NamespaceMemberKind::Extension(_) => None,
        }
    }

    /// The declaration kind named in diagnostics. Aliases report their target's kind.
    pub fn declaration_kind(&self) -> DeclarationKind {
        match &self.kind {
            NamespaceMemberKind::Namespace(_) => DeclarationKind::Namespace,
            NamespaceMemberKind::Type { .. } | NamespaceMemberKind::Extension(_) => {
                DeclarationKind::Type
            }
            NamespaceMemberKind::Function { .. } => DeclarationKind::Function,
            NamespaceMemberKind::Constant(_) => DeclarationKind::Constant,
            NamespaceMemberKind::Property(_) => DeclarationKind::Property,
            NamespaceMemberKind::Alias { target, .. } => target.declaration_kind(),
        }
    }
}

#[derive(Debug)]
pub struct LibModule {
    pub name: Name,
    pub namespace: Namespace,
}
