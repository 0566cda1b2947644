// function.rs
//
// Function headers: type parameters, parameters with arity/flags, and the result type.
// Binding call arguments to parameters and matching argument types against a header.

use std::fmt::Write as _;

use rell_identity::{Name, TypeParamId};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::trace;

use crate::arena::TypeArena;
use crate::errors::{BoundViolation, ModelError};
use crate::query::Conversion;
use crate::resolver::TypeParamsResolver;
use crate::substitution::SubstitutionMap;
use crate::type_id::{TypeId, TypeIdVec};
use crate::typeset::TypeSet;

/// How many arguments a parameter consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamArity {
    One,
    /// Has a default value
    ZeroOne,
    /// Consumes all remaining positional arguments, possibly none
    ZeroMany,
    /// Consumes all remaining positional arguments, at least one
    OneMany,
}

impl ParamArity {
    pub fn is_many(self) -> bool {
        matches!(self, ParamArity::ZeroMany | ParamArity::OneMany)
    }

    pub fn is_required(self) -> bool {
        matches!(self, ParamArity::One | ParamArity::OneMany)
    }

    fn label(self) -> &'static str {
        match self {
            ParamArity::One => "required",
            ParamArity::ZeroOne => "default-valued",
            ParamArity::ZeroMany | ParamArity::OneMany => "variadic",
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            ParamArity::One => "",
            ParamArity::ZeroOne => " = ...",
            ParamArity::ZeroMany => "*",
            ParamArity::OneMany => "+",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionParam {
    pub name: Option<Name>,
    pub ty: TypeId,
    pub arity: ParamArity,
    /// The argument type must equal the parameter type
    pub exact: bool,
    /// The argument type must be nullable
    pub nullable: bool,
    /// The argument is passed unevaluated
    pub lazy: bool,
}

impl FunctionParam {
    pub fn new(ty: TypeId) -> Self {
        Self {
            name: None,
            ty,
            arity: ParamArity::One,
            exact: false,
            nullable: false,
            lazy: false,
        }
    }

    pub fn named(name: impl Into<Name>, ty: TypeId) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(ty)
        }
    }

    pub fn with_arity(mut self, arity: ParamArity) -> Self {
        self.arity = arity;
        self
    }

    pub fn exact(mut self) -> Self {
        self.exact = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    pub fn has_default(&self) -> bool {
        self.arity == ParamArity::ZeroOne
    }
}

/// A type parameter of a header together with its (possibly substituted) bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeaderTypeParam {
    pub id: TypeParamId,
    pub bounds: TypeSet,
}

impl HeaderTypeParam {
    pub fn of(arena: &TypeArena, id: TypeParamId) -> Self {
        Self {
            id,
            bounds: arena.type_param(id).bounds,
        }
    }
}

/// Why arguments could not be bound to a header's parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    WrongArgCount {
        min: usize,
        max: Option<usize>,
        actual: usize,
    },
    UnknownNamedArg(Name),
    DuplicateArg(Name),
    NamedVariadic(Name),
    PositionalAfterNamed(usize),
    MissingArg(Name),
}

/// Why bound arguments did not match a header's types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchFailure {
    /// Type arguments could not be inferred consistently
    Inference,
    /// The substituted header violates a bound
    Bounds(BoundViolation),
    /// An argument is not passable to its parameter
    ArgType {
        arg: usize,
        param: TypeId,
        actual: TypeId,
    },
}

/// Argument-to-parameter assignment of one call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArgBinding {
    /// Parameter index fed by each argument, in argument order
    pub arg_params: Vec<usize>,
    /// Parameters that take their default value
    pub defaults: Vec<usize>,
}

/// A successful match of argument types against a header.
#[derive(Debug, Clone)]
pub struct HeaderMatch {
    /// The header with inferred type arguments substituted; its remaining type
    /// params are the unresolved ones.
    pub header: FunctionHeader,
    pub type_args: FxHashMap<TypeParamId, TypeId>,
    /// One conversion per argument
    pub conversions: Vec<Conversion>,
}

impl HeaderMatch {
    pub fn unresolved(&self) -> &[HeaderTypeParam] {
        self.header.type_params()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionHeader {
    type_params: SmallVec<[HeaderTypeParam; 2]>,
    result: Option<TypeId>,
    params: Vec<FunctionParam>,
}

impl FunctionHeader {
    /// Build a header, checking type parameter names, bound ordering and arity ordering.
    /// `result` is `None` when the result type is only known per call.
    pub fn new(
        arena: &TypeArena,
        type_params: &[TypeParamId],
        result: Option<TypeId>,
        params: Vec<FunctionParam>,
    ) -> Result<Self, ModelError> {
        let mut names = FxHashSet::default();
        for &id in type_params {
            let name = &arena.type_param(id).name;
            if !names.insert(name.clone()) {
                return Err(ModelError::DuplicateTypeParam {
                    name: name.to_string(),
                });
            }
        }

        for (index, &id) in type_params.iter().enumerate() {
            let mut refs = Vec::new();
            if let TypeSet::One(t) | TypeSet::SubOf(t) | TypeSet::SuperOf(t) =
                arena.type_param(id).bounds
            {
                arena.collect_params(t, &mut refs);
            }
            for dep in refs {
                let pos = type_params.iter().position(|&p| p == dep);
                if pos.is_some_and(|pos| pos >= index) {
                    return Err(ModelError::ForwardBoundReference {
                        param: arena.type_param(id).name.to_string(),
                        dependency: arena.type_param(dep).name.to_string(),
                    });
                }
            }
        }

        let mut previous = ParamArity::One;
        for (index, param) in params.iter().enumerate() {
            let ok = match previous {
                ParamArity::One => true,
                ParamArity::ZeroOne => param.arity != ParamArity::One,
                ParamArity::ZeroMany | ParamArity::OneMany => false,
            };
            if !ok {
                return Err(ModelError::ArityOrder {
                    index,
                    previous: previous.label(),
                });
            }
            previous = param.arity;
        }

        Ok(Self {
            type_params: type_params
                .iter()
                .map(|&id| HeaderTypeParam::of(arena, id))
                .collect(),
            result,
            params,
        })
    }

    pub fn type_params(&self) -> &[HeaderTypeParam] {
        &self.type_params
    }

    pub fn result(&self) -> Option<TypeId> {
        self.result
    }

    pub fn params(&self) -> &[FunctionParam] {
        &self.params
    }

    /// The same header with `outer` type params in front of its own (a type's params
    /// on its constructors).
    pub fn with_outer_type_params(&self, arena: &TypeArena, outer: &[TypeParamId]) -> Self {
        let mut type_params: SmallVec<[HeaderTypeParam; 2]> =
            outer.iter().map(|&id| HeaderTypeParam::of(arena, id)).collect();
        type_params.extend(
            self.type_params
                .iter()
                .filter(|p| !outer.contains(&p.id))
                .copied(),
        );
        Self {
            type_params,
            ..self.clone()
        }
    }

    /// Replace parameter references. Substituted type params are dropped from the header.
    pub fn substitute(&self, arena: &mut TypeArena, map: &SubstitutionMap) -> Self {
        if map.is_empty() {
            return self.clone();
        }
        let type_params = self
            .type_params
            .iter()
            .filter(|p| !map.contains_key(&p.id))
            .map(|p| HeaderTypeParam {
                id: p.id,
                bounds: arena.substitute_set(p.bounds, map),
            })
            .collect();
        let result = self.result.map(|r| arena.substitute(r, map));
        let params = self
            .params
            .iter()
            .map(|p| FunctionParam {
                ty: arena.substitute_in(p.ty, map),
                ..p.clone()
            })
            .collect();
        Self {
            type_params,
            result,
            params,
        }
    }

    /// Check every generic instantiation in the parameter and result types.
    pub fn validate(&self, arena: &mut TypeArena) -> Result<(), BoundViolation> {
        if let Some(result) = self.result {
            arena.validate_type(result)?;
        }
        for param in &self.params {
            arena.validate_type(param.ty)?;
        }
        Ok(())
    }

    /// Positional arity check: parameter index per argument, or `None` if `count`
    /// positional arguments cannot be bound.
    pub fn match_arg_count(&self, count: usize) -> Option<Vec<usize>> {
        let names = vec![None; count];
        self.bind_args(&names).ok().map(|b| b.arg_params)
    }

    /// Bind arguments (given by their optional names, in call order) to parameters.
    pub fn bind_args(&self, names: &[Option<Name>]) -> Result<ArgBinding, BindError> {
        let positional = names.iter().take_while(|n| n.is_none()).count();
        if let Some(pos) = names[positional..].iter().position(|n| n.is_none()) {
            return Err(BindError::PositionalAfterNamed(positional + pos));
        }

        let mut arg_params = Vec::with_capacity(names.len());
        let mut filled = vec![false; self.params.len()];
        let mut left = positional;
        for (index, param) in self.params.iter().enumerate() {
            if left == 0 {
                break;
            }
            let take = if param.arity.is_many() { left } else { 1 };
            arg_params.extend(std::iter::repeat_n(index, take));
            filled[index] = true;
            left -= take;
        }
        if left > 0 {
            return Err(self.wrong_count(names.len()));
        }

        for name in names[positional..].iter().flatten() {
            let Some(index) = self
                .params
                .iter()
                .position(|p| p.name.as_ref() == Some(name))
            else {
                return Err(BindError::UnknownNamedArg(name.clone()));
            };
            if filled[index] {
                return Err(BindError::DuplicateArg(name.clone()));
            }
            if self.params[index].arity.is_many() {
                return Err(BindError::NamedVariadic(name.clone()));
            }
            filled[index] = true;
            arg_params.push(index);
        }

        let mut defaults = Vec::new();
        for (index, param) in self.params.iter().enumerate() {
            if filled[index] {
                continue;
            }
            match param.arity {
                ParamArity::ZeroOne => defaults.push(index),
                ParamArity::ZeroMany => {}
                ParamArity::One | ParamArity::OneMany => {
                    return Err(match (&param.name, positional < names.len()) {
                        (Some(name), true) => BindError::MissingArg(name.clone()),
                        _ => self.wrong_count(names.len()),
                    });
                }
            }
        }

        Ok(ArgBinding {
            arg_params,
            defaults,
        })
    }

    fn wrong_count(&self, actual: usize) -> BindError {
        let min = self.params.iter().filter(|p| p.arity.is_required()).count();
        let max = if self.params.iter().any(|p| p.arity.is_many()) {
            None
        } else {
            Some(self.params.len())
        };
        BindError::WrongArgCount { min, max, actual }
    }

    /// Match argument types against the header: infer type arguments (from the
    /// arguments, then from `expected` for parameters the arguments never mention),
    /// substitute and validate, check the `exact`/`nullable` flags and compute one
    /// conversion per argument.
    pub fn match_args(
        &self,
        arena: &mut TypeArena,
        binding: &ArgBinding,
        arg_types: &[TypeId],
        expected: Option<TypeId>,
    ) -> Result<HeaderMatch, MatchFailure> {
        assert_eq!(
            binding.arg_params.len(),
            arg_types.len(),
            "binding does not cover the arguments"
        );

        let (header, type_args) = if self.type_params.is_empty() {
            (self.clone(), FxHashMap::default())
        } else {
            let mut resolver = TypeParamsResolver::new(&self.type_params);
            for (arg, (&param, &actual)) in binding.arg_params.iter().zip(arg_types).enumerate() {
                let pattern = self.params[param].ty;
                if !resolver.match_params_in(arena, pattern, actual) {
                    return Err(MatchFailure::ArgType {
                        arg,
                        param: pattern,
                        actual,
                    });
                }
            }
            if !resolver.all_params_matched()
                && let (Some(result), Some(expected)) = (self.result, expected)
            {
                resolver.match_params_out(arena, result, expected);
            }
            let type_args = resolver.resolve(arena).ok_or(MatchFailure::Inference)?;
            let map: SubstitutionMap = type_args
                .iter()
                .map(|(&id, &ty)| (id, TypeSet::One(ty)))
                .collect();
            let header = self.substitute(arena, &map);
            header.validate(arena).map_err(MatchFailure::Bounds)?;
            (header, type_args)
        };

        let mut conversions = Vec::with_capacity(arg_types.len());
        for (arg, (&param, &actual)) in binding.arg_params.iter().zip(arg_types).enumerate() {
            let p = &header.params[param];
            let mismatch = MatchFailure::ArgType {
                arg,
                param: p.ty,
                actual,
            };
            if (p.exact && actual != p.ty && !actual.is_error())
                || (p.nullable && !arena.is_nullable(actual))
            {
                return Err(mismatch);
            }
            match arena.conversion(p.ty, actual) {
                Some(conversion) => conversions.push(conversion),
                None => return Err(mismatch),
            }
        }

        trace!(
            header = %header.display(arena),
            resolved = type_args.len(),
            "header matched"
        );
        Ok(HeaderMatch {
            header,
            type_args,
            conversions,
        })
    }

    /// `(P1, P2) -> R` over all parameters, if the result type is known.
    pub fn fn_type(&self, arena: &mut TypeArena) -> Option<TypeId> {
        let params: TypeIdVec = self.params.iter().map(|p| p.ty).collect();
        let result = self.result?;
        Some(arena.function(&params, result))
    }

    pub fn display(&self, arena: &TypeArena) -> String {
        self.write_signature(arena, None)
    }

    /// `<T> name(params): result`
    pub fn display_named(&self, arena: &TypeArena, name: &str) -> String {
        self.write_signature(arena, Some(name))
    }

    fn write_signature(&self, arena: &TypeArena, name: Option<&str>) -> String {
        let mut out = String::new();
        if !self.type_params.is_empty() {
            out.push('<');
            for (i, p) in self.type_params.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(arena.type_param(p.id).name.as_str());
                if p.bounds != TypeSet::All {
                    let _ = write!(out, ":{}", arena.display_set(p.bounds));
                }
            }
            out.push('>');
            if name.is_some() {
                out.push(' ');
            }
        }
        if let Some(name) = name {
            out.push_str(name);
        }
        out.push('(');
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if let Some(name) = &p.name {
                let _ = write!(out, "{name}: ");
            }
            out.push_str(&arena.display(p.ty));
            out.push_str(p.arity.suffix());
        }
        out.push(')');
        match self.result {
            Some(result) => {
                let _ = write!(out, ": {}", arena.display(result));
            }
            None => out.push_str(": ?"),
        }
        out
    }
}
