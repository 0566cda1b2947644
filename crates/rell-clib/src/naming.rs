// naming.rs
//
// How a case names itself in diagnostics and compiled call targets.

use rell_identity::{Name, QualifiedName};
use rell_mtype::{MType, TypeArena, TypeId, TypeSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseNaming {
    /// A namespace function: `crypto.sha256`
    Qualified(QualifiedName),
    /// A static member: `list<integer>.from_iterable`, or `list.from_iterable` on the raw type
    TypeMember { owner: TypeId, name: Name },
    /// A constructor: the constructed type
    Constructor { owner: TypeId },
    /// An instance member, named after the receiver: `list<text>.size`
    Member { name: Name },
}

impl CaseNaming {
    pub fn full_name(&self, arena: &TypeArena, self_type: Option<TypeId>) -> String {
        match self {
            CaseNaming::Qualified(name) => name.str(),
            CaseNaming::TypeMember { owner, name } => format!("{}.{}", owner_name(arena, *owner), name),
            CaseNaming::Constructor { owner } => owner_name(arena, *owner),
            CaseNaming::Member { name } => match self_type {
                Some(ty) => format!("{}.{}", arena.display(ty), name),
                None => name.to_string(),
            },
        }
    }

    /// Rename for a specialized owner (`list<T>.of` becomes `list<integer>.of`).
    pub fn replace_self_type(&self, ty: TypeId) -> Self {
        match self {
            CaseNaming::TypeMember { name, .. } => CaseNaming::TypeMember {
                owner: ty,
                name: name.clone(),
            },
            CaseNaming::Constructor { .. } => CaseNaming::Constructor { owner: ty },
            other => other.clone(),
        }
    }
}

/// `list` for the raw `list<T>`, the type itself otherwise.
fn owner_name(arena: &TypeArena, owner: TypeId) -> String {
    if let MType::Generic { def, args } = arena.get(owner) {
        let params = &arena.generic_def(*def).params;
        let raw = !args.is_empty()
            && args
                .iter()
                .zip(params.iter())
                .all(|(arg, p)| matches!(arg, TypeSet::One(t) if arena.unwrap_param(*t) == Some(*p)));
        if raw {
            return arena.generic_def(*def).name.to_string();
        }
    }
    arena.display(owner)
}
