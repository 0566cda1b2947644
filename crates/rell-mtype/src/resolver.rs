// resolver.rs
//
// Type parameter inference for one call: collect (param, type, relation) references by
// matching parameter types against argument types (and the result type against the
// expected type), then solve each parameter in declaration order.

use rell_identity::TypeParamId;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::trace;

use crate::arena::{MType, TypeArena};
use crate::function::HeaderTypeParam;
use crate::generic::Variance;
use crate::substitution::SubstitutionMap;
use crate::type_id::TypeId;
use crate::typeset::TypeSet;

/// How the recorded type relates to the parameter's solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamRelation {
    /// The solution is exactly the type
    Equal,
    /// The solution is a subtype of the type
    Sub,
    /// The solution is a supertype of the type
    Super,
    /// The type must be passable to the solution (supertype or adapter)
    Convert,
}

impl ParamRelation {
    fn flip(self) -> Self {
        match self {
            ParamRelation::Equal => ParamRelation::Equal,
            ParamRelation::Sub => ParamRelation::Super,
            ParamRelation::Super | ParamRelation::Convert => ParamRelation::Sub,
        }
    }

    /// Conversions only apply at the top level.
    fn nested(self) -> Self {
        match self {
            ParamRelation::Convert => ParamRelation::Super,
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
    lower: Option<TypeId>,
    upper: Option<TypeId>,
}

pub struct TypeParamsResolver {
    params: SmallVec<[HeaderTypeParam; 2]>,
    refs: FxHashMap<TypeParamId, Vec<(TypeId, ParamRelation)>>,
}

impl TypeParamsResolver {
    pub fn new(params: &[HeaderTypeParam]) -> Self {
        Self {
            params: params.iter().copied().collect(),
            refs: FxHashMap::default(),
        }
    }

    pub fn all_params_matched(&self) -> bool {
        self.params.iter().all(|p| self.refs.contains_key(&p.id))
    }

    /// Match a parameter type against an argument type. Returns false on a structural
    /// mismatch that no solution can fix.
    pub fn match_params_in(&mut self, arena: &TypeArena, pattern: TypeId, actual: TypeId) -> bool {
        self.match_type(arena, pattern, actual, ParamRelation::Convert)
    }

    /// Match a result type against an expected type.
    pub fn match_params_out(&mut self, arena: &TypeArena, pattern: TypeId, expected: TypeId) -> bool {
        self.match_type(arena, pattern, expected, ParamRelation::Sub)
    }

    /// Match a pattern that must be a supertype of `actual` (an extension's target).
    pub fn match_params_super(&mut self, arena: &TypeArena, pattern: TypeId, actual: TypeId) -> bool {
        self.match_type(arena, pattern, actual, ParamRelation::Super)
    }

    fn is_own(&self, param: TypeParamId) -> bool {
        self.params.iter().any(|p| p.id == param)
    }

    fn match_type(
        &mut self,
        arena: &TypeArena,
        pattern: TypeId,
        actual: TypeId,
        relation: ParamRelation,
    ) -> bool {
        if !arena.contains_params(pattern) {
            return true;
        }
        if matches!(arena.get(actual), MType::Error | MType::Nothing) {
            return true;
        }

        match arena.get(pattern) {
            MType::Param(p) => {
                if self.is_own(*p) {
                    trace!(param = ?p, ty = %arena.display(actual), ?relation, "type param ref");
                    self.refs.entry(*p).or_default().push((actual, relation));
                }
                true
            }
            MType::Nullable(inner) => match arena.get(actual) {
                MType::Null => true,
                MType::Nullable(actual_inner) => {
                    self.match_type(arena, *inner, *actual_inner, relation.nested())
                }
                _ => self.match_type(arena, *inner, actual, relation.nested()),
            },
            MType::Generic { def, args } => {
                let actual = match (arena.get(actual), relation) {
                    (MType::Nullable(inner), ParamRelation::Sub) => *inner,
                    (MType::Nullable(_), _) => return false,
                    _ => actual,
                };
                let Some((actual_def, _)) = arena.unwrap_generic(actual) else {
                    return false;
                };
                // Align both sides on one definition.
                let (pattern_args, actual_args) = match relation {
                    ParamRelation::Sub => {
                        let Some(p_super) = arena.corresponding_super_type(pattern, actual_def)
                        else {
                            return false;
                        };
                        match (arena.unwrap_generic(p_super), arena.unwrap_generic(actual)) {
                            (Some((_, pa)), Some((_, aa))) => (pa.clone(), aa.clone()),
                            _ => return false,
                        }
                    }
                    _ => {
                        let Some(a_super) = arena.corresponding_super_type(actual, *def) else {
                            return false;
                        };
                        match arena.unwrap_generic(a_super) {
                            Some((_, aa)) => (args.clone(), aa.clone()),
                            None => return false,
                        }
                    }
                };
                let aligned_def = match relation {
                    ParamRelation::Sub => actual_def,
                    _ => *def,
                };
                let params = arena.generic_def(aligned_def).params.clone();
                for (i, &param) in params.iter().enumerate() {
                    let variance = arena.type_param(param).variance;
                    if !self.match_arg(arena, pattern_args[i], actual_args[i], variance, relation) {
                        return false;
                    }
                }
                true
            }
            MType::Function { params, result } => match arena.get(actual) {
                MType::Function {
                    params: actual_params,
                    result: actual_result,
                } if actual_params.len() == params.len() => {
                    let (params, result) = (params.clone(), *result);
                    let (actual_params, actual_result) = (actual_params.clone(), *actual_result);
                    if !self.match_type(arena, result, actual_result, relation.nested()) {
                        return false;
                    }
                    params
                        .iter()
                        .zip(actual_params.iter())
                        .all(|(&p, &a)| self.match_type(arena, p, a, relation.flip()))
                }
                _ => false,
            },
            _ => true,
        }
    }

    fn match_arg(
        &mut self,
        arena: &TypeArena,
        pattern: TypeSet,
        actual: TypeSet,
        variance: Variance,
        relation: ParamRelation,
    ) -> bool {
        let widening = !matches!(relation, ParamRelation::Sub);
        match pattern {
            TypeSet::All => true,
            TypeSet::One(p) => {
                let Some(a) = actual.exact().or(actual.upper_bound()).or(actual.lower_bound())
                else {
                    return true;
                };
                let rel = match variance {
                    Variance::Out => relation.nested(),
                    Variance::In => relation.flip(),
                    Variance::Invariant => ParamRelation::Equal,
                };
                self.match_type(arena, p, a, rel)
            }
            TypeSet::SubOf(p) => match actual.upper_bound() {
                Some(a) => {
                    let rel = if widening { ParamRelation::Super } else { ParamRelation::Sub };
                    self.match_type(arena, p, a, rel)
                }
                None => true,
            },
            TypeSet::SuperOf(p) => match actual.lower_bound() {
                Some(a) => {
                    let rel = if widening { ParamRelation::Sub } else { ParamRelation::Super };
                    self.match_type(arena, p, a, rel)
                }
                None => true,
            },
        }
    }

    /// Solve all referenced parameters. `None` when the references are contradictory
    /// or a solution violates its (dependent) bounds. Parameters without references
    /// are left out of the result.
    pub fn resolve(&self, arena: &mut TypeArena) -> Option<FxHashMap<TypeParamId, TypeId>> {
        let mut resolved: FxHashMap<TypeParamId, TypeId> = FxHashMap::default();
        let mut resolved_sets = SubstitutionMap::default();

        for param in &self.params {
            let Some(refs) = self.refs.get(&param.id) else {
                continue;
            };
            let bounds = arena.substitute_set(param.bounds, &resolved_sets);
            let Some(ty) = self.resolve_param(arena, bounds, refs) else {
                trace!(param = ?param.id, "type param unresolvable");
                return None;
            };
            resolved.insert(param.id, ty);
            resolved_sets.insert(param.id, TypeSet::One(ty));
        }

        for param in &self.params {
            if let Some(&ty) = resolved.get(&param.id) {
                let bounds = arena.substitute_set(param.bounds, &resolved_sets);
                if !bounds.contains(arena, ty) {
                    trace!(param = ?param.id, ty = %arena.display(ty), "dependent bounds violated");
                    return None;
                }
            }
        }

        Some(resolved)
    }

    fn resolve_param(
        &self,
        arena: &mut TypeArena,
        bounds_set: TypeSet,
        refs: &[(TypeId, ParamRelation)],
    ) -> Option<TypeId> {
        let mut equals: SmallVec<[TypeId; 2]> = SmallVec::new();
        let mut converts: SmallVec<[TypeId; 4]> = SmallVec::new();
        let mut subs: SmallVec<[TypeId; 2]> = SmallVec::new();
        let mut supers: SmallVec<[TypeId; 2]> = SmallVec::new();
        for &(ty, relation) in refs {
            let list = match relation {
                ParamRelation::Equal => &mut equals,
                ParamRelation::Sub => &mut subs,
                ParamRelation::Super => &mut supers,
                ParamRelation::Convert => {
                    converts.push(ty);
                    continue;
                }
            };
            if !list.contains(&ty) {
                list.push(ty);
            }
        }

        let bounds = Self::bounds(arena, bounds_set, &supers, &subs)?;

        if !equals.is_empty() {
            Self::resolve_equal(arena, bounds, &equals, &converts)
        } else if !converts.is_empty() {
            Self::resolve_convert(arena, bounds, &converts)
        } else {
            bounds.lower.or(bounds.upper)
        }
    }

    fn bounds(
        arena: &mut TypeArena,
        set: TypeSet,
        supers: &[TypeId],
        subs: &[TypeId],
    ) -> Option<Bounds> {
        let lower = Self::fold(arena, set.lower_bound(), supers, TypeArena::common_super_type)?;
        let upper = Self::fold(arena, set.upper_bound(), subs, TypeArena::common_sub_type)?;
        if let (Some(l), Some(u)) = (lower, upper)
            && !arena.is_super_type_of(u, l)
        {
            return None;
        }
        Some(Bounds { lower, upper })
    }

    /// Fold `types` (and an optional seed) with `combine`. Outer `None` means the
    /// types have no common type; inner `None` means there was nothing to fold.
    fn fold(
        arena: &mut TypeArena,
        seed: Option<TypeId>,
        types: &[TypeId],
        combine: fn(&mut TypeArena, TypeId, TypeId) -> Option<TypeId>,
    ) -> Option<Option<TypeId>> {
        let mut acc = seed;
        for &ty in types {
            acc = Some(match acc {
                None => ty,
                Some(prev) => combine(arena, prev, ty)?,
            });
        }
        Some(acc)
    }

    fn in_bounds(arena: &TypeArena, ty: TypeId, bounds: Bounds) -> bool {
        bounds.lower.is_none_or(|l| arena.is_super_type_of(ty, l))
            && bounds.upper.is_none_or(|u| arena.is_super_type_of(u, ty))
    }

    fn resolve_equal(
        arena: &mut TypeArena,
        bounds: Bounds,
        equals: &[TypeId],
        converts: &[TypeId],
    ) -> Option<TypeId> {
        let [ty] = equals else {
            return None;
        };
        if !Self::in_bounds(arena, *ty, bounds) {
            return None;
        }
        converts
            .iter()
            .all(|&c| arena.conversion(*ty, c).is_some())
            .then_some(*ty)
    }

    fn resolve_convert(
        arena: &mut TypeArena,
        bounds: Bounds,
        converts: &[TypeId],
    ) -> Option<TypeId> {
        if let Some(Some(common)) =
            Self::fold(arena, bounds.lower, converts, TypeArena::common_super_type)
            && Self::in_bounds(arena, common, bounds)
        {
            return Some(common);
        }
        Self::resolve_convert_search(arena, bounds, converts)
    }

    fn resolve_convert_search(
        arena: &mut TypeArena,
        bounds: Bounds,
        converts: &[TypeId],
    ) -> Option<TypeId> {
        let candidates: SmallVec<[TypeId; 4]> = converts
            .iter()
            .copied()
            .filter(|&t| {
                Self::in_bounds(arena, t, bounds)
                    && converts.iter().all(|&c| arena.conversion(t, c).is_some())
            })
            .collect();

        match candidates.len() {
            1 => return Some(candidates[0]),
            0 => {}
            _ => return Self::resolve_convert_common(arena, bounds, None, &candidates),
        }

        for bound in [bounds.lower, bounds.upper].into_iter().flatten() {
            if Self::in_bounds(arena, bound, bounds)
                && converts.iter().all(|&c| arena.conversion(bound, c).is_some())
            {
                return Some(bound);
            }
        }

        if let Some(ty) = Self::resolve_convert_common(arena, bounds, None, converts) {
            return Some(ty);
        }
        for bound in [bounds.lower, bounds.upper].into_iter().flatten() {
            if let Some(ty) = Self::resolve_convert_common(arena, bounds, Some(bound), converts) {
                return Some(ty);
            }
        }
        None
    }

    fn resolve_convert_common(
        arena: &mut TypeArena,
        bounds: Bounds,
        first: Option<TypeId>,
        types: &[TypeId],
    ) -> Option<TypeId> {
        let common = Self::fold(arena, first, types, TypeArena::common_conversion_type)??;
        Self::in_bounds(arena, common, bounds).then_some(common)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        arena: TypeArena,
        num: TypeId,
        int: TypeId,
        dec: TypeId,
        text: TypeId,
        list: rell_identity::GenericTypeId,
    }

    fn fixture() -> Fixture {
        let mut arena = TypeArena::new();
        let num_def = arena.define_simple("numeric", None);
        let int_def = arena.define_simple("integer", Some(num_def));
        let dec_def = arena.define_simple("decimal", Some(num_def));
        arena.add_conversion(dec_def, int_def, "integer_to_decimal");
        let text_def = arena.define_simple("text", None);
        let e = arena.define_type_param("E", Variance::Invariant, TypeSet::All);
        let list = arena.define_generic("list", &[e]);
        Fixture {
            num: arena.simple(num_def),
            int: arena.simple(int_def),
            dec: arena.simple(dec_def),
            text: arena.simple(text_def),
            list,
            arena,
        }
    }

    fn param(arena: &mut TypeArena, name: &str, bounds: TypeSet) -> (HeaderTypeParam, TypeId) {
        let id = arena.define_type_param(name, Variance::Invariant, bounds);
        (HeaderTypeParam { id, bounds }, arena.param(id))
    }

    #[test]
    fn resolves_from_argument() {
        let mut f = fixture();
        let (t, t_ty) = param(&mut f.arena, "T", TypeSet::All);
        let mut resolver = TypeParamsResolver::new(&[t]);
        assert!(resolver.match_params_in(&f.arena, t_ty, f.int));
        let resolved = resolver.resolve(&mut f.arena).unwrap();
        assert_eq!(resolved[&t.id], f.int);
    }

    #[test]
    fn convert_refs_join_to_common_super_type() {
        let mut f = fixture();
        let (t, t_ty) = param(&mut f.arena, "T", TypeSet::All);
        let mut resolver = TypeParamsResolver::new(&[t]);
        assert!(resolver.match_params_in(&f.arena, t_ty, f.int));
        assert!(resolver.match_params_in(&f.arena, t_ty, f.dec));
        let resolved = resolver.resolve(&mut f.arena).unwrap();
        assert_eq!(resolved[&t.id], f.num);
    }

    #[test]
    fn convert_refs_use_adapter_when_bounded() {
        let mut f = fixture();
        // T must stay below decimal, so numeric is out and decimal is reached by adapter.
        let (t, t_ty) = param(&mut f.arena, "T", TypeSet::SubOf(f.dec));
        let mut resolver = TypeParamsResolver::new(&[t]);
        assert!(resolver.match_params_in(&f.arena, t_ty, f.int));
        assert!(resolver.match_params_in(&f.arena, t_ty, f.dec));
        let resolved = resolver.resolve(&mut f.arena).unwrap();
        assert_eq!(resolved[&t.id], f.dec);
    }

    #[test]
    fn invariant_position_requires_single_type() {
        let mut f = fixture();
        let (t, t_ty) = param(&mut f.arena, "T", TypeSet::All);
        let list_t = f.arena.generic_of(f.list, &[t_ty]);
        let list_int = f.arena.generic_of(f.list, &[f.int]);
        let list_text = f.arena.generic_of(f.list, &[f.text]);

        let mut resolver = TypeParamsResolver::new(&[t]);
        assert!(resolver.match_params_in(&f.arena, list_t, list_int));
        assert!(resolver.match_params_in(&f.arena, list_t, list_text));
        assert!(resolver.resolve(&mut f.arena).is_none());
    }

    #[test]
    fn equal_ref_accepts_convertible_argument() {
        let mut f = fixture();
        let (t, t_ty) = param(&mut f.arena, "T", TypeSet::All);
        let list_t = f.arena.generic_of(f.list, &[t_ty]);
        let list_dec = f.arena.generic_of(f.list, &[f.dec]);

        let mut resolver = TypeParamsResolver::new(&[t]);
        assert!(resolver.match_params_in(&f.arena, list_t, list_dec));
        assert!(resolver.match_params_in(&f.arena, t_ty, f.int));
        let resolved = resolver.resolve(&mut f.arena).unwrap();
        assert_eq!(resolved[&t.id], f.dec);
    }

    #[test]
    fn expected_type_resolves_result_only_param() {
        let mut f = fixture();
        let (t, t_ty) = param(&mut f.arena, "T", TypeSet::All);
        let list_t = f.arena.generic_of(f.list, &[t_ty]);
        let list_text = f.arena.generic_of(f.list, &[f.text]);

        let mut resolver = TypeParamsResolver::new(&[t]);
        assert!(!resolver.all_params_matched());
        resolver.match_params_out(&f.arena, list_t, list_text);
        assert!(resolver.all_params_matched());
        let resolved = resolver.resolve(&mut f.arena).unwrap();
        assert_eq!(resolved[&t.id], f.text);
    }

    #[test]
    fn structural_mismatch_fails_match() {
        let mut f = fixture();
        let (t, t_ty) = param(&mut f.arena, "T", TypeSet::All);
        let list_t = f.arena.generic_of(f.list, &[t_ty]);
        let mut resolver = TypeParamsResolver::new(&[t]);
        assert!(!resolver.match_params_in(&f.arena, list_t, f.int));
    }

    #[test]
    fn dependent_bounds_are_revalidated() {
        let mut f = fixture();
        let (a, a_ty) = param(&mut f.arena, "A", TypeSet::All);
        let (b, b_ty) = param(&mut f.arena, "B", TypeSet::SubOf(a_ty));

        let mut resolver = TypeParamsResolver::new(&[a, b]);
        assert!(resolver.match_params_in(&f.arena, a_ty, f.num));
        assert!(resolver.match_params_in(&f.arena, b_ty, f.int));
        let resolved = resolver.resolve(&mut f.arena).unwrap();
        assert_eq!(resolved[&b.id], f.int);

        let mut resolver = TypeParamsResolver::new(&[a, b]);
        assert!(resolver.match_params_in(&f.arena, a_ty, f.int));
        assert!(resolver.match_params_in(&f.arena, b_ty, f.text));
        assert!(resolver.resolve(&mut f.arena).is_none());
    }
}
