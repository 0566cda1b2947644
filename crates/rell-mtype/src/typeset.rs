// typeset.rs
//
// Type sets: the range of types a type parameter (or wildcard argument) admits.

use smallvec::SmallVec;

use crate::arena::TypeArena;
use crate::type_id::TypeId;

/// A set of types.
///
/// Used as a type parameter's bound, as a generic type argument (where the
/// non-`One` forms are wildcards), and as the substitution target of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeSet {
    /// Exactly this type
    One(TypeId),
    /// This type and all its subtypes
    SubOf(TypeId),
    /// This type and all its supertypes
    SuperOf(TypeId),
    /// Every type
    All,
}

pub type TypeSetVec = SmallVec<[TypeSet; 2]>;

impl TypeSet {
    pub fn contains(self, arena: &TypeArena, ty: TypeId) -> bool {
        match self {
            TypeSet::All => true,
            TypeSet::One(t) => t == ty || ty.is_error() || t.is_error(),
            TypeSet::SubOf(t) => arena.is_super_type_of(t, ty),
            TypeSet::SuperOf(t) => arena.is_super_type_of(ty, t),
        }
    }

    pub fn is_super_set_of(self, arena: &TypeArena, other: TypeSet) -> bool {
        match (self, other) {
            (TypeSet::All, _) => true,
            (_, TypeSet::All) => false,
            (TypeSet::One(a), TypeSet::One(b)) => a == b || a.is_error() || b.is_error(),
            (TypeSet::One(_), _) => false,
            (TypeSet::SubOf(a), TypeSet::One(b) | TypeSet::SubOf(b)) => arena.is_super_type_of(a, b),
            (TypeSet::SubOf(a), TypeSet::SuperOf(_)) => a == TypeId::ANYTHING,
            (TypeSet::SuperOf(a), TypeSet::One(b) | TypeSet::SuperOf(b)) => {
                arena.is_super_type_of(b, a)
            }
            (TypeSet::SuperOf(a), TypeSet::SubOf(_)) => a == TypeId::NOTHING,
        }
    }

    /// Lowest type of the set, if bounded from below.
    pub fn lower_bound(self) -> Option<TypeId> {
        match self {
            TypeSet::One(t) | TypeSet::SuperOf(t) => Some(t),
            TypeSet::SubOf(_) | TypeSet::All => None,
        }
    }

    /// Highest type of the set, if bounded from above.
    pub fn upper_bound(self) -> Option<TypeId> {
        match self {
            TypeSet::One(t) | TypeSet::SubOf(t) => Some(t),
            TypeSet::SuperOf(_) | TypeSet::All => None,
        }
    }

    pub fn exact(self) -> Option<TypeId> {
        match self {
            TypeSet::One(t) => Some(t),
            _ => None,
        }
    }

    /// The type a value read out of this set can be treated as.
    pub fn canonical_out(self) -> TypeId {
        match self {
            TypeSet::One(t) | TypeSet::SubOf(t) => t,
            TypeSet::SuperOf(_) | TypeSet::All => TypeId::ANYTHING,
        }
    }

    /// The type a value written into this set must have.
    pub fn canonical_in(self) -> TypeId {
        match self {
            TypeSet::One(t) | TypeSet::SuperOf(t) => t,
            TypeSet::SubOf(_) | TypeSet::All => TypeId::NOTHING,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (TypeArena, TypeId, TypeId) {
        let mut arena = TypeArena::new();
        let num = arena.define_simple("numeric", None);
        let int = arena.define_simple("integer", Some(num));
        let num_ty = arena.simple(num);
        let int_ty = arena.simple(int);
        (arena, num_ty, int_ty)
    }

    #[test]
    fn contains_follows_subtyping() {
        let (arena, num, int) = fixture();
        assert!(TypeSet::SubOf(num).contains(&arena, int));
        assert!(!TypeSet::SubOf(int).contains(&arena, num));
        assert!(TypeSet::SuperOf(int).contains(&arena, num));
        assert!(TypeSet::One(int).contains(&arena, int));
        assert!(!TypeSet::One(int).contains(&arena, num));
        assert!(TypeSet::All.contains(&arena, TypeId::NULL));
    }

    #[test]
    fn super_set_relations() {
        let (arena, num, int) = fixture();
        assert!(TypeSet::SubOf(num).is_super_set_of(&arena, TypeSet::SubOf(int)));
        assert!(TypeSet::SubOf(num).is_super_set_of(&arena, TypeSet::One(int)));
        assert!(!TypeSet::One(int).is_super_set_of(&arena, TypeSet::SubOf(int)));
        assert!(TypeSet::SuperOf(int).is_super_set_of(&arena, TypeSet::SuperOf(num)));
        assert!(!TypeSet::SubOf(num).is_super_set_of(&arena, TypeSet::All));
        assert!(TypeSet::All.is_super_set_of(&arena, TypeSet::SuperOf(num)));
    }

    #[test]
    fn canonical_types() {
        let (_, num, _) = fixture();
        assert_eq!(TypeSet::SubOf(num).canonical_out(), num);
        assert_eq!(TypeSet::SubOf(num).canonical_in(), TypeId::NOTHING);
        assert_eq!(TypeSet::SuperOf(num).canonical_in(), num);
        assert_eq!(TypeSet::All.canonical_out(), TypeId::ANYTHING);
    }
}
