// query.rs
//
// Subtyping, common super/sub types, conversions and bounds checks.

use rell_identity::{GenericTypeId, Name};
use tracing::trace;

use crate::arena::{MType, TypeArena};
use crate::errors::BoundViolation;
use crate::generic::Variance;
use crate::type_id::{TypeId, TypeIdVec};
use crate::typeset::{TypeSet, TypeSetVec};

/// How a value of a source type is passed where a target type is expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    /// Source is a subtype; no adaptation.
    Direct,
    /// Source converts through a library adapter (e.g. integer to decimal).
    Adapter { adapter: Name, target: TypeId },
}

impl TypeArena {
    /// `a ⊇ b`: every value of `b` is a value of `a`.
    pub fn is_super_type_of(&self, a: TypeId, b: TypeId) -> bool {
        if a == b {
            return true;
        }
        let (ma, mb) = (self.get(a), self.get(b));
        match (ma, mb) {
            (MType::Error, _) | (_, MType::Error) => return true,
            (MType::Anything, _) | (_, MType::Nothing) => return true,
            _ => {}
        }

        if let MType::Param(p) = mb {
            // A parameter is usable as its upper bound.
            return match self.type_param(*p).bounds.upper_bound() {
                Some(upper) => self.is_super_type_of(a, upper),
                None => false,
            };
        }

        match ma {
            MType::Any => !matches!(
                mb,
                MType::Null | MType::Nullable(_) | MType::Anything | MType::Unit
            ),
            MType::Nullable(inner) => match mb {
                MType::Null => true,
                MType::Nullable(b_inner) => self.is_super_type_of(*inner, *b_inner),
                _ => self.is_super_type_of(*inner, b),
            },
            MType::Generic { def, args } => match self.corresponding_super_type(b, *def) {
                Some(b_super) => self.args_contain(*def, args, b_super),
                None => false,
            },
            MType::Function { params, result } => match mb {
                MType::Function {
                    params: b_params,
                    result: b_result,
                } => {
                    params.len() == b_params.len()
                        && self.is_super_type_of(*result, *b_result)
                        && params
                            .iter()
                            .zip(b_params.iter())
                            .all(|(&pa, &pb)| self.is_super_type_of(pb, pa))
                }
                _ => false,
            },
            _ => false,
        }
    }

    fn args_contain(&self, def: GenericTypeId, a_args: &TypeSetVec, b_super: TypeId) -> bool {
        let Some((_, b_args)) = self.unwrap_generic(b_super) else {
            return false;
        };
        let params = &self.generic_def(def).params;
        params
            .iter()
            .zip(a_args.iter().zip(b_args.iter()))
            .all(|(&param, (&a, &b))| match self.type_param(param).variance {
                Variance::Out => self.is_super_type_of(a.canonical_out(), b.canonical_out()),
                Variance::In => self.is_super_type_of(b.canonical_in(), a.canonical_in()),
                Variance::Invariant => a.is_super_set_of(self, b),
            })
    }

    /// Walk the parent chain of `ty` up to an instantiation of `def`.
    pub fn corresponding_super_type(&self, ty: TypeId, def: GenericTypeId) -> Option<TypeId> {
        let mut cursor = Some(ty);
        while let Some(current) = cursor {
            match self.get(current) {
                MType::Generic { def: d, .. } if *d == def => return Some(current),
                MType::Generic { .. } => cursor = self.parent_type(current),
                _ => return None,
            }
        }
        None
    }

    /// Least type both `a` and `b` are subtypes of. Unrelated types have none.
    pub fn common_super_type(&mut self, a: TypeId, b: TypeId) -> Option<TypeId> {
        if self.is_super_type_of(a, b) {
            return Some(a);
        }
        if self.is_super_type_of(b, a) {
            return Some(b);
        }

        match (self.get(a).clone(), self.get(b).clone()) {
            (MType::Null, _) => (b != TypeId::UNIT).then(|| self.nullable(b)),
            (_, MType::Null) => (a != TypeId::UNIT).then(|| self.nullable(a)),
            (MType::Nullable(x), _) => {
                let y = self.non_null(b);
                let common = self.common_super_type(x, y)?;
                Some(self.nullable(common))
            }
            (_, MType::Nullable(y)) => {
                let x = self.non_null(a);
                let common = self.common_super_type(x, y)?;
                Some(self.nullable(common))
            }
            (MType::Generic { .. }, MType::Generic { .. }) => self.common_generic_super(a, b),
            (
                MType::Function {
                    params: pa,
                    result: ra,
                },
                MType::Function {
                    params: pb,
                    result: rb,
                },
            ) if pa.len() == pb.len() => {
                let result = self.common_super_type(ra, rb)?;
                let mut params = TypeIdVec::new();
                for (&x, &y) in pa.iter().zip(pb.iter()) {
                    params.push(self.common_sub_type(x, y)?);
                }
                Some(self.function(&params, result))
            }
            _ => None,
        }
    }

    fn common_generic_super(&mut self, a: TypeId, b: TypeId) -> Option<TypeId> {
        let mut cursor = Some(a);
        while let Some(current) = cursor {
            let (def, a_args) = match self.unwrap_generic(current) {
                Some((def, args)) => (def, args.clone()),
                None => return None,
            };
            if let Some(b_super) = self.corresponding_super_type(b, def)
                && let Some(joined) = self.join_args(def, &a_args, b_super)
            {
                return Some(joined);
            }
            cursor = self.parent_type(current);
        }
        None
    }

    fn join_args(&mut self, def: GenericTypeId, a_args: &TypeSetVec, b_super: TypeId) -> Option<TypeId> {
        let b_args = self.unwrap_generic(b_super)?.1.clone();
        let params = self.generic_def(def).params.clone();
        let mut joined = TypeSetVec::new();
        for (i, &param) in params.iter().enumerate() {
            let (x, y) = (a_args[i], b_args[i]);
            let arg = match self.type_param(param).variance {
                Variance::Out => {
                    TypeSet::One(self.common_super_type(x.canonical_out(), y.canonical_out())?)
                }
                Variance::In => {
                    TypeSet::One(self.common_sub_type(x.canonical_in(), y.canonical_in())?)
                }
                Variance::Invariant if x == y => x,
                Variance::Invariant => return None,
            };
            joined.push(arg);
        }
        Some(self.generic(def, &joined))
    }

    /// Greatest type that is a subtype of both `a` and `b`.
    pub fn common_sub_type(&mut self, a: TypeId, b: TypeId) -> Option<TypeId> {
        if self.is_super_type_of(a, b) {
            return Some(b);
        }
        if self.is_super_type_of(b, a) {
            return Some(a);
        }
        match (self.get(a).clone(), self.get(b).clone()) {
            (MType::Nullable(x), MType::Nullable(y)) => {
                let common = self.common_sub_type(x, y)?;
                Some(self.nullable(common))
            }
            (MType::Nullable(x), _) => self.common_sub_type(x, b),
            (_, MType::Nullable(y)) => self.common_sub_type(a, y),
            (
                MType::Function {
                    params: pa,
                    result: ra,
                },
                MType::Function {
                    params: pb,
                    result: rb,
                },
            ) if pa.len() == pb.len() => {
                let result = self.common_sub_type(ra, rb)?;
                let mut params = TypeIdVec::new();
                for (&x, &y) in pa.iter().zip(pb.iter()) {
                    params.push(self.common_super_type(x, y)?);
                }
                Some(self.function(&params, result))
            }
            _ => None,
        }
    }

    /// How a `source` value is passed to a `target` slot, if it can be.
    pub fn conversion(&self, target: TypeId, source: TypeId) -> Option<Conversion> {
        if self.is_super_type_of(target, source) {
            return Some(Conversion::Direct);
        }
        let (target_inner, target_nullable) = match self.get(target) {
            MType::Nullable(inner) => (*inner, true),
            _ => (target, false),
        };
        let source_inner = match self.get(source) {
            MType::Nullable(inner) if target_nullable => *inner,
            MType::Nullable(_) => return None,
            _ => source,
        };
        let (target_def, _) = self.unwrap_generic(target_inner)?;
        let decl = self
            .generic_def(target_def)
            .conversions
            .iter()
            .find(|decl| self.corresponding_super_type(source_inner, decl.from).is_some())?;
        trace!(
            target = %self.display(target),
            source = %self.display(source),
            adapter = %decl.adapter,
            "conversion by adapter"
        );
        Some(Conversion::Adapter {
            adapter: decl.adapter.clone(),
            target: target_inner,
        })
    }

    /// A type both `a` and `b` are passable to, preferring conversions over widening.
    pub fn common_conversion_type(&mut self, a: TypeId, b: TypeId) -> Option<TypeId> {
        if self.conversion(a, b).is_some() {
            return Some(a);
        }
        if self.conversion(b, a).is_some() {
            return Some(b);
        }
        self.common_super_type(a, b)
    }

    // ========================================================================
    // Bounds
    // ========================================================================

    /// Check type arguments of `def` against the bounds of its parameters. Bounds that
    /// reference earlier parameters are checked with the actual arguments substituted.
    pub fn check_type_args(
        &mut self,
        def: GenericTypeId,
        args: &[TypeSet],
    ) -> Result<(), BoundViolation> {
        let params = self.generic_def(def).params.clone();
        let map = params.iter().copied().zip(args.iter().copied()).collect();
        for (&param, &arg) in params.iter().zip(args.iter()) {
            if arg == TypeSet::All || self.set_has_error(arg) {
                continue;
            }
            let declared = self.type_param(param).bounds;
            let bounds = self.substitute_set(declared, &map);
            if !bounds.is_super_set_of(self, arg) {
                return Err(BoundViolation {
                    type_name: self.generic_def(def).name.to_string(),
                    param: self.type_param(param).name.to_string(),
                    bounds: self.display_set(bounds),
                    arg: self.display_set(arg),
                });
            }
        }
        Ok(())
    }

    /// Check every generic instantiation nested in `ty`.
    pub fn validate_type(&mut self, ty: TypeId) -> Result<(), BoundViolation> {
        match self.get(ty).clone() {
            MType::Generic { def, args } => {
                for arg in args.iter() {
                    if let TypeSet::One(t) | TypeSet::SubOf(t) | TypeSet::SuperOf(t) = *arg {
                        self.validate_type(t)?;
                    }
                }
                self.check_type_args(def, &args)
            }
            MType::Nullable(inner) => self.validate_type(inner),
            MType::Function { params, result } => {
                for p in params.iter() {
                    self.validate_type(*p)?;
                }
                self.validate_type(result)
            }
            _ => Ok(()),
        }
    }

    fn set_has_error(&self, set: TypeSet) -> bool {
        matches!(set, TypeSet::One(t) | TypeSet::SubOf(t) | TypeSet::SuperOf(t) if t.is_error())
    }
}
