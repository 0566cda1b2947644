// case.rs
//
// Overload cases. A case is one candidate of a function, constructor or member;
// matching it against a call's arguments yields a `CaseMatch` that compiles into a
// `CompiledCall` (reporting its diagnostics only then).

use std::rc::Rc;

use rell_identity::{Name, TypeParamId};
use rell_lmodel::{BodyMeta, DeclarationKind, Deprecated, LibFunction, SysFunction};
use rell_mtype::{
    BindError, BoundViolation, FunctionHeader, MatchFailure, ParamArity, SubstitutionMap,
    TypeArena, TypeId,
};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::args::CallArg;
use crate::call::{CallTarget, CompileContext, CompiledCall, EffectiveArg};
use crate::errors::LibError;
use crate::naming::CaseNaming;
use crate::partial::{NormalPartialTarget, PartialRejection, PartialTarget};

/// Resolved type arguments by parameter name, as function bodies see them.
pub type TypeArgNames = FxHashMap<Name, TypeId>;

pub(crate) fn type_arg_names(arena: &TypeArena, map: &SubstitutionMap) -> TypeArgNames {
    map.iter()
        .map(|(&param, set)| (arena.type_param(param).name.clone(), set.canonical_out()))
        .collect()
}

#[derive(Debug, Clone)]
pub enum LibCase {
    /// A namespace function, static member or constructor.
    Global {
        naming: CaseNaming,
        function: Rc<LibFunction>,
        /// Owner type arguments already substituted into the header
        outer_type_args: Rc<TypeArgNames>,
    },
    /// An instance member. The receiver's type arguments are applied per call.
    Member {
        name: Name,
        function: Rc<LibFunction>,
        outer_type_args: Rc<TypeArgNames>,
    },
    Deprecated {
        inner: Box<LibCase>,
        deprecated: Deprecated,
    },
}

/// Outcome of trying one case against a call.
#[derive(Debug, Clone)]
pub enum CaseAttempt {
    Matched(CaseMatch),
    /// The case does not apply to the receiver
    Skipped,
    Failed(CaseFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseFailure {
    Bind(BindError),
    Match(MatchFailure),
    /// The body has no implementation for the inferred types
    NoBody,
}

impl LibCase {
    pub fn global(naming: CaseNaming, function: Rc<LibFunction>) -> Self {
        LibCase::Global {
            naming,
            function,
            outer_type_args: Rc::default(),
        }
    }

    pub fn member(name: Name, function: Rc<LibFunction>) -> Self {
        LibCase::Member {
            name,
            function,
            outer_type_args: Rc::default(),
        }
    }

    /// Wrap in a deprecation, if any.
    pub fn deprecated(self, deprecated: Option<Deprecated>) -> Self {
        match deprecated {
            Some(deprecated) => LibCase::Deprecated {
                inner: Box::new(self),
                deprecated,
            },
            None => self,
        }
    }

    pub fn function(&self) -> &Rc<LibFunction> {
        match self {
            LibCase::Global { function, .. } | LibCase::Member { function, .. } => function,
            LibCase::Deprecated { inner, .. } => inner.function(),
        }
    }

    pub fn naming(&self) -> CaseNaming {
        match self {
            LibCase::Global { naming, .. } => naming.clone(),
            LibCase::Member { name, .. } => CaseNaming::Member { name: name.clone() },
            LibCase::Deprecated { inner, .. } => inner.naming(),
        }
    }

    pub fn full_name(&self, arena: &TypeArena, self_type: Option<TypeId>) -> String {
        self.naming().full_name(arena, self_type)
    }

    pub fn is_deprecated(&self) -> bool {
        matches!(self, LibCase::Deprecated { .. })
    }

    /// Replace type parameters of the header, remembering their names for the body.
    pub fn substitute(&self, arena: &mut TypeArena, map: &SubstitutionMap) -> Self {
        if map.is_empty() {
            return self.clone();
        }
        let extend = |arena: &TypeArena, outer: &TypeArgNames| {
            let mut names = outer.clone();
            names.extend(type_arg_names(arena, map));
            Rc::new(names)
        };
        match self {
            LibCase::Global {
                naming,
                function,
                outer_type_args,
            } => LibCase::Global {
                naming: naming.clone(),
                function: Rc::new(function.substitute(arena, map)),
                outer_type_args: extend(arena, outer_type_args),
            },
            LibCase::Member {
                name,
                function,
                outer_type_args,
            } => LibCase::Member {
                name: name.clone(),
                function: Rc::new(function.substitute(arena, map)),
                outer_type_args: extend(arena, outer_type_args),
            },
            LibCase::Deprecated { inner, deprecated } => LibCase::Deprecated {
                inner: Box::new(inner.substitute(arena, map)),
                deprecated: deprecated.clone(),
            },
        }
    }

    /// Rename for a specialized owner type.
    pub(crate) fn with_owner(&self, owner: TypeId) -> Self {
        match self {
            LibCase::Global {
                naming,
                function,
                outer_type_args,
            } => LibCase::Global {
                naming: naming.replace_self_type(owner),
                function: Rc::clone(function),
                outer_type_args: Rc::clone(outer_type_args),
            },
            LibCase::Member { .. } => self.clone(),
            LibCase::Deprecated { inner, deprecated } => LibCase::Deprecated {
                inner: Box::new(inner.with_owner(owner)),
                deprecated: deprecated.clone(),
            },
        }
    }

    /// The header as seen from `self_type`: instance members get the receiver's type
    /// arguments substituted. `None` when that substitution breaks a bound.
    pub(crate) fn effective_header(
        &self,
        arena: &mut TypeArena,
        self_type: Option<TypeId>,
    ) -> Option<FunctionHeader> {
        match self {
            LibCase::Global { function, .. } => Some(function.header.clone()),
            LibCase::Member { function, .. } => {
                let map = self_type.map(|t| arena.type_args_map(t)).unwrap_or_default();
                if map.is_empty() {
                    return Some(function.header.clone());
                }
                let header = function.header.substitute(arena, &map);
                match header.validate(arena) {
                    Ok(()) => Some(header),
                    Err(violation) => {
                        trace!(%violation, "member does not apply to receiver");
                        None
                    }
                }
            }
            LibCase::Deprecated { inner, .. } => inner.effective_header(arena, self_type),
        }
    }

    /// `name(params): result` as seen from `self_type`.
    pub fn signature(&self, arena: &mut TypeArena, self_type: Option<TypeId>, name: &str) -> Option<String> {
        let header = self.effective_header(arena, self_type)?;
        Some(header.display_named(arena, name))
    }

    fn body_type_args(
        &self,
        arena: &TypeArena,
        self_type: Option<TypeId>,
        resolved: &FxHashMap<TypeParamId, TypeId>,
    ) -> TypeArgNames {
        let mut names = match self {
            LibCase::Global {
                outer_type_args, ..
            } => (**outer_type_args).clone(),
            LibCase::Member {
                outer_type_args, ..
            } => {
                let mut names = (**outer_type_args).clone();
                if let Some(ty) = self_type {
                    names.extend(type_arg_names(arena, &arena.type_args_map(ty)));
                }
                names
            }
            LibCase::Deprecated { inner, .. } => {
                return inner.body_type_args(arena, self_type, resolved);
            }
        };
        for (&param, &ty) in resolved {
            names.insert(arena.type_param(param).name.clone(), ty);
        }
        names
    }

    /// Try the case against a call. Arguments must not contain wildcards.
    pub fn try_match(
        &self,
        arena: &mut TypeArena,
        self_type: Option<TypeId>,
        args: &[CallArg],
        hint: Option<TypeId>,
    ) -> CaseAttempt {
        if let LibCase::Deprecated { inner, deprecated } = self {
            return match inner.try_match(arena, self_type, args, hint) {
                CaseAttempt::Matched(m) => CaseAttempt::Matched(CaseMatch::Deprecated {
                    inner: Box::new(m),
                    deprecated: deprecated.clone(),
                }),
                other => other,
            };
        }
        debug_assert!(!args.iter().any(CallArg::is_wildcard), "wildcards in a plain call");

        let Some(header) = self.effective_header(arena, self_type) else {
            return CaseAttempt::Skipped;
        };
        let names: Vec<Option<Name>> = args.iter().map(|a| a.name.clone()).collect();
        let binding = match header.bind_args(&names) {
            Ok(binding) => binding,
            Err(e) => return CaseAttempt::Failed(CaseFailure::Bind(e)),
        };
        let arg_types: Vec<TypeId> = args.iter().map(|a| a.ty().unwrap_or(TypeId::ERROR)).collect();
        let function = self.full_name(arena, self_type);

        let matched = match header.match_args(arena, &binding, &arg_types, hint) {
            Ok(matched) => matched,
            Err(MatchFailure::Bounds(violation)) => {
                return CaseAttempt::Matched(CaseMatch::Error(ErrorMatch {
                    function,
                    result_type: TypeId::ERROR,
                    reason: MatchError::Bounds(violation),
                }));
            }
            Err(failure) => return CaseAttempt::Failed(CaseFailure::Match(failure)),
        };

        // Params fed only by error-typed arguments stay open; those are already reported
        let error_arg = arg_types.contains(&TypeId::ERROR);
        let unresolved = matched.unresolved();
        if !unresolved.is_empty() && error_arg {
            return CaseAttempt::Matched(CaseMatch::Error(ErrorMatch {
                function,
                result_type: TypeId::ERROR,
                reason: MatchError::ErrorArgument,
            }));
        }
        if !unresolved.is_empty() {
            let params = unresolved
                .iter()
                .map(|p| arena.type_param(p.id).name.to_string())
                .collect();
            return CaseAttempt::Matched(CaseMatch::Error(ErrorMatch {
                function,
                result_type: TypeId::ERROR,
                reason: MatchError::UnresolvedTypeParams(params),
            }));
        }
        let Some(result_type) = matched.header.result() else {
            return CaseAttempt::Matched(CaseMatch::Error(ErrorMatch {
                function,
                result_type: TypeId::ERROR,
                reason: if error_arg {
                    MatchError::ErrorArgument
                } else {
                    MatchError::NoResultType
                },
            }));
        };
        // Headers without inferred params skip validation in `match_args`
        if let Err(violation) = matched.header.validate(arena) {
            return CaseAttempt::Matched(CaseMatch::Error(ErrorMatch {
                function,
                result_type,
                reason: MatchError::Bounds(violation),
            }));
        }

        let meta = BodyMeta {
            self_type,
            result_type,
            type_args: self.body_type_args(arena, self_type, &matched.type_args),
        };
        let Some(body) = self.function().body.sys_function(&meta) else {
            return CaseAttempt::Failed(CaseFailure::NoBody);
        };

        let mut effective = Vec::with_capacity(args.len());
        for (arg, ((&param, &ty), conversion)) in binding
            .arg_params
            .iter()
            .zip(&arg_types)
            .zip(matched.conversions)
            .enumerate()
        {
            effective.push(EffectiveArg {
                arg,
                param,
                ty,
                conversion,
                lazy: matched.header.params()[param].lazy,
            });
        }

        trace!(case = %function, result = %arena.display(result_type), "case matched");
        CaseAttempt::Matched(CaseMatch::Normal(NormalMatch {
            function,
            header: matched.header,
            result_type,
            args: effective,
            defaults: binding.defaults,
            body,
        }))
    }

    /// The case as a function value, if it needs nothing from a concrete call site.
    pub fn partial_target(
        &self,
        arena: &mut TypeArena,
        self_type: Option<TypeId>,
    ) -> Result<PartialTarget, PartialRejection> {
        if let LibCase::Deprecated { inner, deprecated } = self {
            return inner
                .partial_target(arena, self_type)
                .map(|t| t.deprecated(deprecated.clone()));
        }

        let header = self
            .effective_header(arena, self_type)
            .ok_or(PartialRejection::Unsupported)?;
        if !header.type_params().is_empty()
            || header.params().iter().any(|p| p.lazy || p.arity.is_many())
        {
            return Err(PartialRejection::Unsupported);
        }
        let result = header.result().ok_or(PartialRejection::Unsupported)?;
        header
            .validate(arena)
            .map_err(|_| PartialRejection::Unsupported)?;

        let meta = BodyMeta {
            self_type,
            result_type: result,
            type_args: self.body_type_args(arena, self_type, &FxHashMap::default()),
        };
        let body = self
            .function()
            .body
            .sys_function(&meta)
            .ok_or(PartialRejection::NoBody)?;

        let function = self.full_name(arena, self_type);
        let min_params = header
            .params()
            .iter()
            .take_while(|p| p.arity == ParamArity::One)
            .count();
        Ok(PartialTarget::Normal(Rc::new(NormalPartialTarget {
            signature: header.display_named(arena, &function),
            function,
            params: header.params().iter().map(|p| p.ty).collect(),
            result,
            min_params,
            body,
        })))
    }
}

/// A fully resolved match.
#[derive(Debug, Clone)]
pub struct NormalMatch {
    pub function: String,
    pub header: FunctionHeader,
    pub result_type: TypeId,
    pub args: Vec<EffectiveArg>,
    pub defaults: Vec<usize>,
    pub body: SysFunction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    UnresolvedTypeParams(Vec<String>),
    NoResultType,
    Bounds(BoundViolation),
    /// An argument is already an error; nothing more to report.
    ErrorArgument,
}

/// A selected case that could not be resolved completely. Compiles to an error.
#[derive(Debug, Clone)]
pub struct ErrorMatch {
    pub function: String,
    pub result_type: TypeId,
    pub reason: MatchError,
}

impl ErrorMatch {
    fn to_error(&self, span: miette::SourceSpan) -> Option<LibError> {
        let function = self.function.clone();
        let error = match &self.reason {
            MatchError::UnresolvedTypeParams(params) => LibError::UnresolvedTypeParams {
                function,
                params: params.clone(),
                span,
            },
            MatchError::NoResultType => LibError::NoResultType { function, span },
            MatchError::Bounds(violation) => LibError::BoundViolation {
                violation: violation.clone(),
                span,
            },
            MatchError::ErrorArgument => return None,
        };
        Some(error)
    }
}

#[derive(Debug, Clone)]
pub enum CaseMatch {
    Normal(NormalMatch),
    Error(ErrorMatch),
    Deprecated {
        inner: Box<CaseMatch>,
        deprecated: Deprecated,
    },
}

impl CaseMatch {
    pub fn result_type(&self) -> TypeId {
        match self {
            CaseMatch::Normal(m) => m.result_type,
            CaseMatch::Error(m) => m.result_type,
            CaseMatch::Deprecated { inner, .. } => inner.result_type(),
        }
    }

    pub fn is_error(&self) -> bool {
        match self {
            CaseMatch::Normal(_) => false,
            CaseMatch::Error(_) => true,
            CaseMatch::Deprecated { inner, .. } => inner.is_error(),
        }
    }

    pub fn deprecated(self, deprecated: Deprecated) -> Self {
        CaseMatch::Deprecated {
            inner: Box::new(self),
            deprecated,
        }
    }

    /// Compile into a call. Error matches and deprecations report here, once per compile.
    pub fn compile(&self, ctx: &mut CompileContext<'_>) -> CompiledCall {
        self.compile_nested(ctx, false)
    }

    fn compile_nested(&self, ctx: &mut CompileContext<'_>, deprecation_reported: bool) -> CompiledCall {
        match self {
            CaseMatch::Deprecated { inner, deprecated } => {
                if !deprecation_reported {
                    ctx.deprecated(DeclarationKind::Function, deprecated);
                }
                inner.compile_nested(ctx, true)
            }
            CaseMatch::Normal(m) => CompiledCall::Call {
                result_type: m.result_type,
                target: CallTarget {
                    full_name: m.function.clone(),
                    body: m.body.clone(),
                },
                args: m.args.clone(),
                defaults: m.defaults.clone(),
            },
            CaseMatch::Error(m) => {
                if let Some(error) = m.to_error(ctx.site.span.into()) {
                    ctx.error(error);
                }
                CompiledCall::Error {
                    result_type: m.result_type,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests;
