// args.rs
//
// Actual arguments of a call site, as handed over by the expression compiler.

use rell_identity::{Name, QualifiedName, Span};
use rell_mtype::TypeId;

/// A compiled argument expression; only its type and position matter here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgExpr {
    pub ty: TypeId,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgValue {
    Expr(ArgExpr),
    /// `*` placeholder of a partial application
    Wildcard(Span),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallArg {
    pub name: Option<Name>,
    pub value: ArgValue,
}

impl CallArg {
    pub fn expr(ty: TypeId, span: Span) -> Self {
        Self {
            name: None,
            value: ArgValue::Expr(ArgExpr { ty, span }),
        }
    }

    pub fn named(name: impl Into<Name>, ty: TypeId, span: Span) -> Self {
        Self {
            name: Some(name.into()),
            value: ArgValue::Expr(ArgExpr { ty, span }),
        }
    }

    pub fn wildcard(span: Span) -> Self {
        Self {
            name: None,
            value: ArgValue::Wildcard(span),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self.value, ArgValue::Wildcard(_))
    }

    /// The argument's type; wildcards have none.
    pub fn ty(&self) -> Option<TypeId> {
        match self.value {
            ArgValue::Expr(e) => Some(e.ty),
            ArgValue::Wildcard(_) => None,
        }
    }

    pub fn span(&self) -> Span {
        match self.value {
            ArgValue::Expr(e) => e.span,
            ArgValue::Wildcard(span) => span,
        }
    }
}

/// Where a call happens and how the callee was spelled there (possibly an alias).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub span: Span,
    pub name: QualifiedName,
}

impl CallSite {
    pub fn new(name: QualifiedName, span: Span) -> Self {
        Self { span, name }
    }

    /// The spelling as written, dotted.
    pub fn spelling(&self) -> String {
        self.name.str()
    }
}
