use super::*;

use rell_identity::{GenericTypeId, QualifiedName, Span};
use rell_lmodel::FunctionBody;
use rell_mtype::{FunctionParam, TypeSet, Variance};

use crate::args::CallSite;
use crate::diagnostics::{Diagnostics, Severity};
use crate::options::CompilerOptions;

struct Fixture {
    arena: TypeArena,
    int: TypeId,
    text: TypeId,
    boxed: GenericTypeId,
    sorted: GenericTypeId,
    /// The `T` of `box<T>`
    box_t: TypeId,
}

/// `comparable`, `integer: comparable`, `text`, `box<T>`, `sorted<S: -comparable>`.
fn fixture() -> Fixture {
    let mut arena = TypeArena::new();
    let comparable = arena.define_simple("comparable", None);
    let int = arena.define_simple("integer", Some(comparable));
    let text = arena.define_simple("text", None);
    let comparable = arena.simple(comparable);
    let int = arena.simple(int);
    let text = arena.simple(text);

    let t = arena.define_type_param("T", Variance::Invariant, TypeSet::All);
    let boxed = arena.define_generic("box", &[t]);
    let s = arena.define_type_param("S", Variance::Invariant, TypeSet::SubOf(comparable));
    let sorted = arena.define_generic("sorted", &[s]);
    let box_t = arena.param(t);
    Fixture {
        arena,
        int,
        text,
        boxed,
        sorted,
        box_t,
    }
}

fn function(arena: &TypeArena, type_params: &[TypeParamId], result: Option<TypeId>, body: FunctionBody) -> Rc<LibFunction> {
    Rc::new(LibFunction {
        qualified_name: QualifiedName::parse("f").unwrap(),
        header: FunctionHeader::new(arena, type_params, result, vec![]).unwrap(),
        body,
    })
}

fn direct(name: &str) -> FunctionBody {
    FunctionBody::direct(SysFunction::new(name))
}

fn global(function: Rc<LibFunction>) -> LibCase {
    LibCase::global(CaseNaming::Qualified(QualifiedName::parse("f").unwrap()), function)
}

fn compile(m: &CaseMatch, options: CompilerOptions) -> (CompiledCall, Diagnostics) {
    let site = CallSite::new(QualifiedName::parse("f").unwrap(), Span::default());
    let mut diagnostics = Diagnostics::new();
    let mut ctx = CompileContext {
        diagnostics: &mut diagnostics,
        options: &options,
        site: &site,
    };
    let call = m.compile(&mut ctx);
    (call, diagnostics)
}

fn matched(attempt: CaseAttempt) -> CaseMatch {
    match attempt {
        CaseAttempt::Matched(m) => m,
        other => panic!("expected a match, got {other:?}"),
    }
}

#[test]
fn member_case_skipped_when_receiver_breaks_a_bound() {
    let Fixture {
        mut arena,
        int,
        text,
        boxed,
        sorted,
        box_t,
    } = fixture();
    let sorted_t = arena.generic_of(sorted, &[box_t]);
    let case = LibCase::member(Name::new("sorted"), function(&arena, &[], Some(sorted_t), direct("box_sorted")));

    let box_text = arena.generic_of(boxed, &[text]);
    assert!(matches!(
        case.try_match(&mut arena, Some(box_text), &[], None),
        CaseAttempt::Skipped
    ));

    let box_int = arena.generic_of(boxed, &[int]);
    let m = matched(case.try_match(&mut arena, Some(box_int), &[], None));
    assert_eq!(arena.display(m.result_type()), "sorted<integer>");
    assert_eq!(case.full_name(&arena, Some(box_int)), "box<integer>.sorted");
}

#[test]
fn unresolved_type_parameter_is_an_error_match() {
    let Fixture {
        mut arena, int, boxed, ..
    } = fixture();
    let r = arena.define_type_param("R", Variance::Invariant, TypeSet::All);
    let r_ty = arena.param(r);
    let box_r = arena.generic_of(boxed, &[r_ty]);
    let case = global(function(&arena, &[r], Some(box_r), direct("box_make")));

    let m = matched(case.try_match(&mut arena, None, &[], None));
    assert!(m.is_error());
    let (call, diagnostics) = compile(&m, CompilerOptions::default());
    assert!(call.is_error());
    assert_eq!(diagnostics.codes(), vec!["fn:sys:unresolved_type_params:f:R"]);

    // The expected type resolves it
    let box_int = arena.generic_of(boxed, &[int]);
    let m = matched(case.try_match(&mut arena, None, &[], Some(box_int)));
    assert!(!m.is_error());
    assert_eq!(m.result_type(), box_int);
}

#[test]
fn unknown_result_type_is_an_error_match() {
    let Fixture { mut arena, .. } = fixture();
    let case = global(function(&arena, &[], None, direct("f")));
    let m = matched(case.try_match(&mut arena, None, &[], None));
    let (_, diagnostics) = compile(&m, CompilerOptions::default());
    assert_eq!(diagnostics.codes(), vec!["fn:sys:no_res_type:f"]);
}

#[test]
fn inferred_header_breaking_a_bound_degrades_the_case() {
    let Fixture {
        mut arena,
        text,
        boxed,
        sorted,
        ..
    } = fixture();
    let r = arena.define_type_param("R", Variance::Invariant, TypeSet::All);
    let r_ty = arena.param(r);
    let box_r = arena.generic_of(boxed, &[r_ty]);
    let sorted_r = arena.generic_of(sorted, &[r_ty]);
    let generic = global(Rc::new(LibFunction {
        qualified_name: QualifiedName::parse("f").unwrap(),
        header: FunctionHeader::new(&arena, &[r], Some(sorted_r), vec![FunctionParam::new(box_r)]).unwrap(),
        body: direct("f_sorted"),
    }));
    let box_text = arena.generic_of(boxed, &[text]);
    let fallback = global(Rc::new(LibFunction {
        qualified_name: QualifiedName::parse("f").unwrap(),
        header: FunctionHeader::new(&arena, &[], Some(text), vec![FunctionParam::new(box_text)]).unwrap(),
        body: direct("f_text"),
    }));
    let args = [CallArg::expr(box_text, Span::default())];

    // The later case would match, but selection stops at the broken one
    let m = crate::matching::match_call(&mut arena, &[generic, fallback], None, &args, None)
        .expect("the generic case is selected");
    assert!(m.is_error());
    let (call, diagnostics) = compile(&m, CompilerOptions::default());
    assert!(call.is_error());
    assert_eq!(diagnostics.codes(), vec!["param_bounds:sorted:S:-comparable:text"]);
}

#[test]
fn delegating_body_chooses_per_receiver() {
    let Fixture {
        mut arena,
        int,
        text,
        boxed,
        ..
    } = fixture();
    let body = FunctionBody::delegating(move |meta| {
        (meta.type_arg("T") == Some(int)).then(|| SysFunction::new("box_int_describe"))
    });
    let case = LibCase::member(Name::new("describe"), function(&arena, &[], Some(text), body));

    let box_int = arena.generic_of(boxed, &[int]);
    match matched(case.try_match(&mut arena, Some(box_int), &[], None)) {
        CaseMatch::Normal(m) => assert_eq!(m.body.runtime_name.as_str(), "box_int_describe"),
        other => panic!("expected a normal match, got {other:?}"),
    }

    let box_text = arena.generic_of(boxed, &[text]);
    assert!(matches!(
        case.try_match(&mut arena, Some(box_text), &[], None),
        CaseAttempt::Failed(CaseFailure::NoBody)
    ));
    assert_eq!(
        case.partial_target(&mut arena, Some(box_text)).unwrap_err(),
        PartialRejection::NoBody
    );
}

#[test]
fn nested_deprecation_reports_once_with_outer_severity() {
    let Fixture { mut arena, int, .. } = fixture();
    let case = global(function(&arena, &[], Some(int), direct("f")))
        .deprecated(Some(Deprecated::warning()))
        .deprecated(Some(Deprecated::error()));
    assert!(case.is_deprecated());

    let m = matched(case.try_match(&mut arena, None, &[], None));
    let (call, diagnostics) = compile(&m, CompilerOptions::default());
    assert!(!call.is_error());
    assert_eq!(diagnostics.codes(), vec!["deprecated:FUNCTION:[f]"]);
    assert_eq!(diagnostics.items()[0].severity, Severity::Error);
}

#[test]
fn deprecated_error_option_escalates_warnings() {
    let Fixture { mut arena, int, .. } = fixture();
    let case = global(function(&arena, &[], Some(int), direct("f"))).deprecated(Some(Deprecated::warning()));
    let m = matched(case.try_match(&mut arena, None, &[], None));

    let (_, diagnostics) = compile(&m, CompilerOptions::default());
    assert_eq!(diagnostics.items()[0].severity, Severity::Warning);

    let options = CompilerOptions {
        deprecated_error: true,
    };
    let (_, diagnostics) = compile(&m, options);
    assert_eq!(diagnostics.items()[0].severity, Severity::Error);
}

#[test]
fn generic_case_is_not_a_function_value() {
    let Fixture { mut arena, int, .. } = fixture();
    let r = arena.define_type_param("R", Variance::Invariant, TypeSet::All);
    let r_ty = arena.param(r);
    let generic = global(function(&arena, &[r], Some(r_ty), direct("g")));
    assert_eq!(
        generic.partial_target(&mut arena, None).unwrap_err(),
        PartialRejection::Unsupported
    );

    let header = FunctionHeader::new(
        &arena,
        &[],
        Some(int),
        vec![
            FunctionParam::new(int),
            FunctionParam::new(int).with_arity(ParamArity::ZeroOne),
        ],
    )
    .unwrap();
    let plain = global(Rc::new(LibFunction {
        qualified_name: QualifiedName::parse("f").unwrap(),
        header,
        body: direct("f"),
    }));
    let target = plain.partial_target(&mut arena, None).unwrap();
    let normal = target.normal();
    assert_eq!(normal.params.len(), 2);
    assert_eq!(normal.min_params, 1);
    assert_eq!(normal.signature, "f(integer, integer = ...): integer");
}

#[test]
fn substitution_records_type_argument_names() {
    let Fixture {
        mut arena,
        int,
        boxed,
        box_t,
        ..
    } = fixture();
    let box_def_t = arena.unwrap_param(box_t).unwrap();
    let body = FunctionBody::delegating(move |meta| {
        (meta.type_arg("T") == Some(int)).then(|| SysFunction::new("box_int_of"))
    });
    let box_t_ty = arena.generic_of(boxed, &[box_t]);
    let header = FunctionHeader::new(&arena, &[box_def_t], Some(box_t_ty), vec![FunctionParam::new(box_t)]).unwrap();
    let case = global(Rc::new(LibFunction {
        qualified_name: QualifiedName::parse("box.of").unwrap(),
        header,
        body,
    }));

    let mut map = SubstitutionMap::default();
    map.insert(box_def_t, TypeSet::One(int));
    let specialized = case.substitute(&mut arena, &map);
    let args = [CallArg::expr(int, Span::default())];
    match matched(specialized.try_match(&mut arena, None, &args, None)) {
        CaseMatch::Normal(m) => {
            assert_eq!(m.body.runtime_name.as_str(), "box_int_of");
            assert!(m.header.type_params().is_empty());
        }
        other => panic!("expected a normal match, got {other:?}"),
    }
}
