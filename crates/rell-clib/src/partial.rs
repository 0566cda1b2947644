// partial.rs
//
// Partial application: turning a function (or some of its cases) into a function
// value, `f(*)`, `f(1, *)`, or a bare reference against an expected function type.

use std::rc::Rc;

use rell_lmodel::{DeclarationKind, Deprecated, SysFunction};
use rell_mtype::{TypeArena, TypeId, TypeIdVec};
use tracing::{debug, instrument};

use crate::args::{ArgValue, CallArg};
use crate::call::{BoundArg, CallTarget, CompileContext, CompiledCall};
use crate::case::LibCase;
use crate::errors::LibError;

/// Why a case cannot be a function value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialRejection {
    /// Generic, lazy or variadic, or the result type is unknown
    Unsupported,
    /// The body does not resolve without a call site
    NoBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalPartialTarget {
    pub function: String,
    pub signature: String,
    pub params: TypeIdVec,
    pub result: TypeId,
    /// Leading parameters without a default
    pub min_params: usize,
    pub body: SysFunction,
}

#[derive(Debug, Clone)]
pub enum PartialTarget {
    Normal(Rc<NormalPartialTarget>),
    Deprecated {
        inner: Box<PartialTarget>,
        deprecated: Deprecated,
    },
}

/// A target chosen for a function value, using its first `param_count` parameters.
#[derive(Debug, Clone)]
pub struct PartialMatch {
    pub target: PartialTarget,
    pub param_count: usize,
    pub exact: bool,
}

impl PartialTarget {
    pub fn deprecated(self, deprecated: Deprecated) -> Self {
        PartialTarget::Deprecated {
            inner: Box::new(self),
            deprecated,
        }
    }

    pub fn normal(&self) -> &NormalPartialTarget {
        match self {
            PartialTarget::Normal(target) => target,
            PartialTarget::Deprecated { inner, .. } => inner.normal(),
        }
    }

    fn outer_deprecation(&self) -> Option<&Deprecated> {
        match self {
            PartialTarget::Normal(_) => None,
            PartialTarget::Deprecated { deprecated, .. } => Some(deprecated),
        }
    }

    /// All parameters, no questions asked.
    pub fn match_unconditional(&self) -> PartialMatch {
        PartialMatch {
            target: self.clone(),
            param_count: self.normal().params.len(),
            exact: true,
        }
    }

    /// Match against an expected function type. Trailing parameters with defaults may
    /// be left out.
    pub fn match_fn_type(&self, arena: &mut TypeArena, fn_type: TypeId) -> Option<PartialMatch> {
        let target = self.normal();
        let count = arena.unwrap_function(fn_type)?.0.len();
        let total = target.params.len();
        if count != total && !(target.min_params <= count && count < total) {
            return None;
        }
        let own = arena.function(&target.params[..count], target.result);
        if !arena.is_super_type_of(fn_type, own) {
            return None;
        }
        Some(PartialMatch {
            target: self.clone(),
            param_count: count,
            exact: own == fn_type,
        })
    }
}

/// Pick the target for a function value. `Err` carries the tied candidates.
fn select_target(
    arena: &mut TypeArena,
    targets: &[PartialTarget],
    hint: Option<TypeId>,
) -> Result<PartialMatch, Vec<PartialTarget>> {
    let Some(hint) = hint else {
        return match targets {
            [single] => Ok(single.match_unconditional()),
            _ => Err(targets.to_vec()),
        };
    };

    if let [single] = targets {
        // A mismatching hint is left to the assignment check of the caller
        return Ok(single
            .match_fn_type(arena, hint)
            .unwrap_or_else(|| single.match_unconditional()));
    }

    let matches: Vec<PartialMatch> = targets
        .iter()
        .filter_map(|t| t.match_fn_type(arena, hint))
        .collect();
    if let [single] = matches.as_slice() {
        return Ok(single.clone());
    }
    let exact: Vec<&PartialMatch> = matches.iter().filter(|m| m.exact).collect();
    if let [single] = exact.as_slice() {
        return Ok((*single).clone());
    }

    let tied: Vec<PartialTarget> = if !exact.is_empty() {
        exact.iter().map(|m| m.target.clone()).collect()
    } else if !matches.is_empty() {
        matches.into_iter().map(|m| m.target).collect()
    } else {
        targets.to_vec()
    };
    Err(tied)
}

/// The case's name when every case shares it, otherwise the name as written at the call.
fn message_name(
    arena: &TypeArena,
    ctx: &CompileContext<'_>,
    cases: &[LibCase],
    self_type: Option<TypeId>,
) -> String {
    let mut names = cases.iter().map(|case| case.full_name(arena, self_type));
    match names.next() {
        Some(first) if names.all(|name| name == first) => first,
        _ => ctx.site.spelling(),
    }
}

/// Compile a partial application of `cases`.
#[instrument(level = "debug", skip_all, fields(cases = cases.len(), args = args.len()))]
pub fn compile_partial(
    arena: &mut TypeArena,
    ctx: &mut CompileContext<'_>,
    cases: &[LibCase],
    self_type: Option<TypeId>,
    args: &[CallArg],
    hint: Option<TypeId>,
) -> CompiledCall {
    let function = message_name(arena, ctx, cases, self_type);

    if let Some(named) = args.iter().find(|a| a.name.is_some()) {
        ctx.error(LibError::PartialNamedArg {
            function,
            span: named.span().into(),
        });
        return CompiledCall::error();
    }

    let mut targets = Vec::new();
    let mut bad_case = None;
    for case in cases {
        match case.partial_target(arena, self_type) {
            Ok(target) => targets.push(target),
            Err(PartialRejection::NoBody) => {
                if bad_case.is_none() {
                    let name = case.full_name(arena, self_type);
                    bad_case = case.signature(arena, self_type, &name);
                }
            }
            Err(PartialRejection::Unsupported) => {}
        }
    }

    let span = ctx.site.span.into();
    if targets.is_empty() {
        let error = match bad_case {
            Some(case) => LibError::PartialBadCase { case, span },
            None => LibError::PartialNotSupported { function, span },
        };
        ctx.error(error);
        return CompiledCall::error();
    }

    let selected = match select_target(arena, &targets, hint) {
        Ok(selected) => selected,
        Err(tied) => {
            let candidates = tied
                .iter()
                .map(|t| t.normal().signature.clone())
                .collect::<Vec<_>>()
                .join(", ");
            debug!(%function, %candidates, "ambiguous function value");
            ctx.error(LibError::PartialAmbiguous {
                function,
                candidates,
                span,
            });
            return CompiledCall::error();
        }
    };
    bind_partial(arena, ctx, &function, &selected, args)
}

fn bind_partial(
    arena: &mut TypeArena,
    ctx: &mut CompileContext<'_>,
    function: &str,
    selected: &PartialMatch,
    args: &[CallArg],
) -> CompiledCall {
    let target = selected.target.normal();
    let params = &target.params[..selected.param_count];

    // A trailing wildcard stands for all remaining parameters
    let trailing = args.last().is_some_and(CallArg::is_wildcard);
    let fixed = if trailing { args.len() - 1 } else { args.len() };
    if fixed > params.len() || (!trailing && args.len() != params.len()) {
        ctx.error(LibError::WrongArgCount {
            function: function.to_string(),
            expected: params.len().to_string(),
            actual: args.len(),
            span: ctx.site.span.into(),
        });
        return CompiledCall::error();
    }

    let mut bound_args = Vec::new();
    let mut wildcard_params = Vec::new();
    let mut failed = false;
    for (index, arg) in args[..fixed].iter().enumerate() {
        match arg.value {
            ArgValue::Wildcard(_) => wildcard_params.push(index),
            ArgValue::Expr(expr) => match arena.conversion(params[index], expr.ty) {
                Some(conversion) => bound_args.push(BoundArg {
                    arg: index,
                    param: index,
                    ty: expr.ty,
                    conversion,
                }),
                None => {
                    ctx.error(LibError::PartialArgType {
                        function: function.to_string(),
                        index: index + 1,
                        expected: arena.display(params[index]),
                        actual: arena.display(expr.ty),
                        span: expr.span.into(),
                    });
                    failed = true;
                }
            },
        }
    }
    if failed {
        return CompiledCall::error();
    }
    if trailing {
        wildcard_params.extend(fixed..params.len());
    }

    let open: TypeIdVec = wildcard_params.iter().map(|&i| params[i]).collect();
    let fn_type = arena.function(&open, target.result);
    if let Some(deprecated) = selected.target.outer_deprecation() {
        ctx.deprecated(DeclarationKind::Function, deprecated);
    }
    CompiledCall::Partial {
        fn_type,
        target: CallTarget {
            full_name: target.function.clone(),
            body: target.body.clone(),
        },
        bound_args,
        wildcard_params,
    }
}
