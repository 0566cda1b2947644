// matching.rs
//
// Overload resolution over a list of cases: first match in declaration order wins.

use rell_identity::Name;
use rell_mtype::{BindError, FunctionParam, MatchFailure, TypeArena, TypeId};
use tracing::{debug, instrument, trace};

use crate::args::CallArg;
use crate::call::{CompileContext, CompiledCall};
use crate::case::{CaseAttempt, CaseFailure, CaseMatch, LibCase};
use crate::errors::LibError;

/// No case matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoMatch {
    /// Cases that applied to the receiver and were tried
    pub attempted: usize,
    /// Index and failure of the only attempted case
    pub failure: Option<(usize, CaseFailure)>,
}

#[instrument(level = "debug", skip(arena, cases, args), fields(cases = cases.len(), args = args.len()))]
pub fn match_call(
    arena: &mut TypeArena,
    cases: &[LibCase],
    self_type: Option<TypeId>,
    args: &[CallArg],
    hint: Option<TypeId>,
) -> Result<CaseMatch, NoMatch> {
    let mut attempted = 0;
    let mut last_failure = None;
    for (index, case) in cases.iter().enumerate() {
        match case.try_match(arena, self_type, args, hint) {
            CaseAttempt::Matched(m) => {
                debug!(
                    case = index,
                    result = %arena.display(m.result_type()),
                    error = m.is_error(),
                    "call matched"
                );
                return Ok(m);
            }
            CaseAttempt::Skipped => trace!(case = index, "case skipped for receiver"),
            CaseAttempt::Failed(failure) => {
                trace!(case = index, ?failure, "case failed");
                attempted += 1;
                last_failure = Some((index, failure));
            }
        }
    }
    debug!(attempted, "no case matched");
    Err(NoMatch {
        attempted,
        failure: if attempted == 1 { last_failure } else { None },
    })
}

/// Report a failed resolution. Exactly one diagnostic, unless an argument already
/// has the error type.
pub fn report_no_match(
    arena: &TypeArena,
    ctx: &mut CompileContext<'_>,
    cases: &[LibCase],
    self_type: Option<TypeId>,
    args: &[CallArg],
    no_match: &NoMatch,
) -> CompiledCall {
    if args.iter().any(|a| a.ty().is_some_and(TypeId::is_error)) {
        return CompiledCall::error();
    }
    let function = match cases.first() {
        Some(case) => case.full_name(arena, self_type),
        None => ctx.site.spelling(),
    };
    let specific = no_match
        .failure
        .as_ref()
        .and_then(|(_, failure)| specific_error(arena, ctx, &function, failure, args));
    let error = specific.unwrap_or_else(|| LibError::NoMatchingCase {
        arg_types: args
            .iter()
            .map(|a| a.ty().map_or_else(|| "*".to_string(), |t| arena.display(t)))
            .collect(),
        function,
        span: ctx.site.span.into(),
    });
    ctx.error(error);
    CompiledCall::error()
}

fn specific_error(
    arena: &TypeArena,
    ctx: &CompileContext<'_>,
    function: &str,
    failure: &CaseFailure,
    args: &[CallArg],
) -> Option<LibError> {
    let function = function.to_string();
    let span = ctx.site.span.into();
    let error = match failure {
        CaseFailure::Bind(BindError::WrongArgCount { min, max, actual }) => LibError::WrongArgCount {
            function,
            expected: match max {
                Some(max) if max == min => min.to_string(),
                Some(max) => format!("{min}-{max}"),
                None => format!("{min}+"),
            },
            actual: *actual,
            span,
        },
        CaseFailure::Bind(BindError::UnknownNamedArg(arg)) => LibError::UnknownNamedArg {
            function,
            arg: arg.to_string(),
            span,
        },
        CaseFailure::Bind(BindError::DuplicateArg(arg)) => LibError::DuplicateNamedArg {
            function,
            arg: arg.to_string(),
            span,
        },
        CaseFailure::Bind(BindError::NamedVariadic(arg)) => LibError::NamedVariadicArg {
            function,
            arg: arg.to_string(),
            span,
        },
        CaseFailure::Bind(BindError::PositionalAfterNamed(index)) => LibError::PositionalAfterNamed {
            function,
            index: index + 1,
            span: args.get(*index).map_or(span, |a| a.span().into()),
        },
        CaseFailure::Bind(BindError::MissingArg(arg)) => LibError::MissingArg {
            function,
            arg: arg.to_string(),
            span,
        },
        CaseFailure::Match(MatchFailure::ArgType { arg, param, actual }) => LibError::ArgType {
            function,
            index: arg + 1,
            expected: arena.display(*param),
            actual: arena.display(*actual),
            span: args.get(*arg).map_or(span, |a| a.span().into()),
        },
        CaseFailure::Match(MatchFailure::Inference | MatchFailure::Bounds(_)) | CaseFailure::NoBody => {
            return None;
        }
    };
    Some(error)
}

/// Resolve and compile a call in one go.
pub fn compile_call(
    arena: &mut TypeArena,
    ctx: &mut CompileContext<'_>,
    cases: &[LibCase],
    self_type: Option<TypeId>,
    args: &[CallArg],
    hint: Option<TypeId>,
) -> CompiledCall {
    match match_call(arena, cases, self_type, args, hint) {
        Ok(m) => m.compile(ctx),
        Err(no_match) => report_no_match(arena, ctx, cases, self_type, args, &no_match),
    }
}

/// The expected type for the argument at `index` (or named `name`), when all cases
/// that have such a parameter agree on a closed type.
pub fn param_type_hint(
    arena: &mut TypeArena,
    cases: &[LibCase],
    self_type: Option<TypeId>,
    index: usize,
    name: Option<&Name>,
) -> Option<TypeId> {
    let mut hint = None;
    for case in cases {
        let Some(header) = case.effective_header(arena, self_type) else {
            continue;
        };
        let param = match name {
            Some(name) => header.params().iter().find(|p| p.name.as_ref() == Some(name)),
            None => positional_param(header.params(), index),
        };
        let Some(param) = param else {
            continue;
        };
        if arena.contains_params(param.ty) {
            return None;
        }
        match hint {
            None => hint = Some(param.ty),
            Some(ty) if ty != param.ty => return None,
            Some(_) => {}
        }
    }
    hint
}

fn positional_param(params: &[FunctionParam], index: usize) -> Option<&FunctionParam> {
    for (i, param) in params.iter().enumerate() {
        if param.arity.is_many() || i == index {
            return Some(param);
        }
    }
    None
}
