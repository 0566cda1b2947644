// substitution.rs
//
// Replacing type parameter references with type sets.

use rell_identity::TypeParamId;
use rustc_hash::FxHashMap;

use crate::arena::{MType, TypeArena};
use crate::type_id::{TypeId, TypeIdVec};
use crate::typeset::{TypeSet, TypeSetVec};

/// Parameter -> replacement. Produced by resolution or taken from a self type's args.
pub type SubstitutionMap = FxHashMap<TypeParamId, TypeSet>;

/// Which canonical type a set collapses to when substituted into a type position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    /// Values are read from here (results)
    Out,
    /// Values are written into here (parameters)
    In,
}

impl Position {
    fn flip(self) -> Self {
        match self {
            Position::Out => Position::In,
            Position::In => Position::Out,
        }
    }
}

impl TypeArena {
    pub fn contains_params(&self, ty: TypeId) -> bool {
        match self.get(ty) {
            MType::Param(_) => true,
            MType::Generic { args, .. } => args.iter().any(|a| self.set_contains_params(*a)),
            MType::Nullable(inner) => self.contains_params(*inner),
            MType::Function { params, result } => {
                self.contains_params(*result) || params.iter().any(|p| self.contains_params(*p))
            }
            _ => false,
        }
    }

    fn set_contains_params(&self, set: TypeSet) -> bool {
        match set {
            TypeSet::One(t) | TypeSet::SubOf(t) | TypeSet::SuperOf(t) => self.contains_params(t),
            TypeSet::All => false,
        }
    }

    /// Parameters referenced by `ty`, in first-occurrence order.
    pub fn collect_params(&self, ty: TypeId, out: &mut Vec<TypeParamId>) {
        match self.get(ty) {
            MType::Param(p) => {
                if !out.contains(p) {
                    out.push(*p);
                }
            }
            MType::Generic { args, .. } => {
                for arg in args.iter() {
                    if let TypeSet::One(t) | TypeSet::SubOf(t) | TypeSet::SuperOf(t) = *arg {
                        self.collect_params(t, out);
                    }
                }
            }
            MType::Nullable(inner) => self.collect_params(*inner, out),
            MType::Function { params, result } => {
                for p in params.iter() {
                    self.collect_params(*p, out);
                }
                self.collect_params(*result, out);
            }
            _ => {}
        }
    }

    /// A type has a stable identity for the session when it is fully closed.
    pub fn is_cacheable(&self, ty: TypeId) -> bool {
        !ty.is_error() && !self.contains_params(ty)
    }

    /// The type's own arguments keyed by its definition's parameters. Empty for
    /// anything that is not a generic instantiation.
    pub fn type_args_map(&self, ty: TypeId) -> SubstitutionMap {
        let mut map = SubstitutionMap::default();
        if let MType::Generic { def, args } = self.get(ty) {
            let params = &self.generic_def(*def).params;
            for (&param, &arg) in params.iter().zip(args.iter()) {
                map.insert(param, arg);
            }
        }
        map
    }

    /// Substitute into a read (result) position.
    pub fn substitute(&mut self, ty: TypeId, map: &SubstitutionMap) -> TypeId {
        self.substitute_at(ty, map, Position::Out)
    }

    /// Substitute into a written (parameter) position, where `SubOf` collapses to `nothing`
    /// and `SuperOf(t)` to `t`.
    pub fn substitute_in(&mut self, ty: TypeId, map: &SubstitutionMap) -> TypeId {
        self.substitute_at(ty, map, Position::In)
    }

    fn substitute_at(&mut self, ty: TypeId, map: &SubstitutionMap, pos: Position) -> TypeId {
        if map.is_empty() {
            return ty;
        }

        // Clone the interned type to release the borrow
        match self.get(ty).clone() {
            MType::Param(p) => match map.get(&p) {
                Some(set) => match pos {
                    Position::Out => set.canonical_out(),
                    Position::In => set.canonical_in(),
                },
                None => ty,
            },
            MType::Generic { def, args } => {
                if args.is_empty() {
                    return ty;
                }
                let new_args: TypeSetVec = args
                    .iter()
                    .map(|&a| self.substitute_set(a, map))
                    .collect();
                if new_args == args {
                    ty
                } else {
                    self.generic(def, &new_args)
                }
            }
            MType::Nullable(inner) => {
                let new_inner = self.substitute_at(inner, map, pos);
                if new_inner == inner {
                    ty
                } else {
                    self.nullable(new_inner)
                }
            }
            MType::Function { params, result } => {
                let new_params: TypeIdVec = params
                    .iter()
                    .map(|&p| self.substitute_at(p, map, pos.flip()))
                    .collect();
                let new_result = self.substitute_at(result, map, pos);
                if new_params == params && new_result == result {
                    ty
                } else {
                    self.function(&new_params, new_result)
                }
            }
            _ => ty,
        }
    }

    /// Substitute into a set position. Wildcards compose: `-T` with `T -> +X` admits
    /// every type.
    pub fn substitute_set(&mut self, set: TypeSet, map: &SubstitutionMap) -> TypeSet {
        if map.is_empty() {
            return set;
        }
        match set {
            TypeSet::All => TypeSet::All,
            TypeSet::One(t) => match self.mapped_param(t, map) {
                Some(replacement) => replacement,
                None => TypeSet::One(self.substitute_at(t, map, Position::Out)),
            },
            TypeSet::SubOf(t) => match self.mapped_param(t, map) {
                Some(TypeSet::One(x) | TypeSet::SubOf(x)) => TypeSet::SubOf(x),
                Some(_) => TypeSet::All,
                None => TypeSet::SubOf(self.substitute_at(t, map, Position::Out)),
            },
            TypeSet::SuperOf(t) => match self.mapped_param(t, map) {
                Some(TypeSet::One(x) | TypeSet::SuperOf(x)) => TypeSet::SuperOf(x),
                Some(_) => TypeSet::All,
                None => TypeSet::SuperOf(self.substitute_at(t, map, Position::In)),
            },
        }
    }

    fn mapped_param(&self, ty: TypeId, map: &SubstitutionMap) -> Option<TypeSet> {
        match self.get(ty) {
            MType::Param(p) => map.get(p).copied(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generic::Variance;

    #[test]
    fn substitutes_through_nested_types() {
        let mut arena = TypeArena::new();
        let int = arena.define_simple("integer", None);
        let int = arena.simple(int);
        let t = arena.define_type_param("T", Variance::Invariant, TypeSet::All);
        let list = arena.define_generic("list", &[t]);
        let t_ty = arena.param(t);
        let list_t = arena.generic_of(list, &[t_ty]);
        let list_t_opt = arena.nullable(list_t);
        let func = arena.function(&[t_ty], list_t_opt);

        let mut map = SubstitutionMap::default();
        map.insert(t, TypeSet::One(int));
        let replaced = arena.substitute(func, &map);

        let list_int = arena.generic_of(list, &[int]);
        let list_int_opt = arena.nullable(list_int);
        let expected = arena.function(&[int], list_int_opt);
        assert_eq!(replaced, expected);
        assert_eq!(arena.display(replaced), "(integer)->list<integer>?");
    }

    #[test]
    fn unaffected_type_keeps_identity() {
        let mut arena = TypeArena::new();
        let t = arena.define_type_param("T", Variance::Invariant, TypeSet::All);
        let u = arena.define_type_param("U", Variance::Invariant, TypeSet::All);
        let list = arena.define_generic("list", &[t]);
        let u_ty = arena.param(u);
        let list_u = arena.generic_of(list, &[u_ty]);

        let mut map = SubstitutionMap::default();
        map.insert(t, TypeSet::One(TypeId::ANY));
        assert_eq!(arena.substitute(list_u, &map), list_u);
    }

    #[test]
    fn wildcards_compose_in_set_positions() {
        let mut arena = TypeArena::new();
        let num = arena.define_simple("numeric", None);
        let num = arena.simple(num);
        let t = arena.define_type_param("T", Variance::Invariant, TypeSet::All);
        let t_ty = arena.param(t);

        let mut map = SubstitutionMap::default();
        map.insert(t, TypeSet::SubOf(num));
        assert_eq!(arena.substitute_set(TypeSet::One(t_ty), &map), TypeSet::SubOf(num));
        assert_eq!(arena.substitute_set(TypeSet::SubOf(t_ty), &map), TypeSet::SubOf(num));
        assert_eq!(arena.substitute_set(TypeSet::SuperOf(t_ty), &map), TypeSet::All);

        // Collapsing into type positions depends on the direction of the position.
        assert_eq!(arena.substitute(t_ty, &map), num);
        assert_eq!(arena.substitute_in(t_ty, &map), TypeId::NOTHING);
    }

    #[test]
    fn type_args_map_of_instantiation() {
        let mut arena = TypeArena::new();
        let k = arena.define_type_param("K", Variance::Invariant, TypeSet::All);
        let v = arena.define_type_param("V", Variance::Invariant, TypeSet::All);
        let map_def = arena.define_generic("map", &[k, v]);
        let ty = arena.generic(map_def, &[TypeSet::One(TypeId::ANY), TypeSet::All]);

        let args = arena.type_args_map(ty);
        assert_eq!(args.get(&k), Some(&TypeSet::One(TypeId::ANY)));
        assert_eq!(args.get(&v), Some(&TypeSet::All));
        assert!(arena.type_args_map(TypeId::ANY).is_empty());
        assert!(arena.is_cacheable(ty));
        let k_ty = arena.param(k);
        let open = arena.generic_of(map_def, &[k_ty, TypeId::ANY]);
        assert!(!arena.is_cacheable(open));
        assert!(!arena.is_cacheable(TypeId::ERROR));
    }
}
