// Call resolution against the fixture library: overloads, inference, conversions,
// named arguments, deprecation and function values.

mod common;

use common::{Lib, arg, site, wildcard};
use rell_clib::{CallArg, CompiledCall, CompilerOptions, RegistryEntry, Severity};
use rell_identity::Span;
use rell_mtype::{Conversion, TypeSet};

fn body(call: &CompiledCall) -> &str {
    call.target().expect("call compiled").body.runtime_name.as_str()
}

fn global(lib: &Lib, name: &str) -> std::rc::Rc<rell_clib::GlobalFunction> {
    match lib.session.registry().lookup(&site(name).name) {
        Some(RegistryEntry::Function(function)) => function.clone(),
        other => panic!("{name} is not a function: {other:?}"),
    }
}

#[test]
fn overloads_resolve_by_argument_type() {
    let mut lib = Lib::new();
    let (int, text, boolean) = (lib.int, lib.text, lib.boolean);

    let call = lib.session.call_function(&site("f"), &[arg(int)], None);
    assert_eq!(call.result_type(), int);
    assert_eq!(body(&call), "f_integer");

    let call = lib.session.call_function(&site("f"), &[arg(text)], None);
    assert_eq!(call.result_type(), text);
    assert_eq!(body(&call), "f_text");
    assert!(lib.session.diagnostics().is_empty());

    let call = lib.session.call_function(&site("f"), &[arg(boolean)], None);
    assert!(call.is_error());
    assert_eq!(lib.codes(), vec!["expr_call_argtypes:[f]:boolean"]);
}

#[test]
fn first_declared_case_wins() {
    let mut lib = Lib::new();
    let int = lib.int;
    let call = lib.session.call_function(&site("show"), &[arg(int)], None);
    assert_eq!(body(&call), "show_comparable");
}

#[test]
fn error_typed_arguments_are_not_reported_again() {
    let mut lib = Lib::new();
    let error = lib.session.arena().error();
    let call = lib.session.call_function(&site("f"), &[arg(error)], None);
    assert!(call.is_error());
    assert!(lib.session.diagnostics().is_empty());
}

#[test]
fn type_params_fed_only_by_errors_stay_silent() {
    let mut lib = Lib::new();
    let int = lib.int;
    let error = lib.session.arena().error();

    let call = lib.session.call_function(&site("max"), &[arg(error), arg(error)], None);
    assert!(call.is_error());
    assert!(lib.session.diagnostics().is_empty());

    let call = lib.session.call_function(&site("max"), &[arg(error), arg(int)], None);
    assert_eq!(call.result_type(), int);
    assert!(lib.session.diagnostics().is_empty());
}

#[test]
fn single_case_failures_are_specific() {
    let mut lib = Lib::new();
    let (int, text) = (lib.int, lib.text);

    lib.session.call_function(&site("add"), &[arg(int)], None);
    lib.session.call_function(&site("add"), &[arg(int), arg(text)], None);
    lib.session.call_function(&site("add"), &[arg(int), CallArg::named("c", int, Span::default())], None);
    assert_eq!(
        lib.codes(),
        vec![
            "fn:sys:arg_count:add:2:1",
            "expr_call_argtype:[add]:2:integer:text",
            "expr:call:unknown_named_arg:[add]:c",
        ]
    );
}

#[test]
fn named_arguments_bind_by_name() {
    let mut lib = Lib::new();
    let int = lib.int;
    let args = [
        CallArg::named("b", int, Span::default()),
        CallArg::named("a", int, Span::default()),
    ];
    let call = lib.session.call_function(&site("add"), &args, None);
    let CompiledCall::Call { args, .. } = call else {
        panic!("expected a call, got {call:?}");
    };
    let params: Vec<usize> = args.iter().map(|a| a.param).collect();
    assert_eq!(params, vec![1, 0]);
}

#[test]
fn integer_argument_converts_to_decimal() {
    let mut lib = Lib::new();
    let (int, decimal) = (lib.int, lib.decimal);
    let call = lib.session.call_function(&site("round"), &[arg(int)], None);
    assert_eq!(call.result_type(), decimal);
    let CompiledCall::Call { args, .. } = call else {
        panic!("expected a call, got {call:?}");
    };
    assert!(matches!(
        &args[0].conversion,
        Conversion::Adapter { adapter, target } if adapter.as_str() == "integer_to_decimal" && *target == decimal
    ));
}

#[test]
fn generic_function_infers_from_arguments() {
    let mut lib = Lib::new();
    let (int, boolean) = (lib.int, lib.boolean);

    let call = lib.session.call_function(&site("max"), &[arg(int), arg(int)], None);
    assert_eq!(call.result_type(), int);
    assert!(lib.session.diagnostics().is_empty());

    let call = lib.session.call_function(&site("max"), &[arg(boolean), arg(boolean)], None);
    assert!(call.is_error());
    assert_eq!(lib.session.diagnostics().errors().count(), 1);
}

#[test]
fn names_resolve_through_namespaces() {
    let mut lib = Lib::new();
    let text = lib.text;

    let call = lib.session.call_function(&site("crypto.sha256"), &[arg(text)], None);
    assert_eq!(call.result_type(), text);
    assert_eq!(call.target().unwrap().full_name, "crypto.sha256");
    assert!(matches!(
        lib.session.resolve_name(&site("crypto")),
        Some(RegistryEntry::Namespace { .. })
    ));

    assert!(lib.session.call_function(&site("nope"), &[], None).is_error());
    assert!(lib.session.call_function(&site("MAX_INT"), &[], None).is_error());
    assert_eq!(lib.codes(), vec!["unknown_name:nope", "expr_call_nofn:MAX_INT"]);
}

#[test]
fn deprecated_function_warns_with_replacement() {
    let mut lib = Lib::new();
    let int = lib.int;
    let call = lib.session.call_function(&site("old_abs"), &[arg(int)], None);
    assert!(!call.is_error());
    assert_eq!(lib.codes(), vec!["deprecated:FUNCTION:[old_abs]:abs"]);
    assert_eq!(lib.session.diagnostics().items()[0].severity, Severity::Warning);
}

#[test]
fn alias_reports_its_own_deprecation_once() {
    let mut lib = Lib::new();
    let int = lib.int;
    let call = lib.session.call_function(&site("older_abs"), &[arg(int)], None);
    assert!(!call.is_error());
    assert_eq!(lib.codes(), vec!["deprecated:FUNCTION:[older_abs]"]);
    assert_eq!(lib.session.diagnostics().items()[0].severity, Severity::Error);
}

#[test]
fn deprecated_error_option_makes_warnings_errors() {
    let mut lib = Lib::with_options(CompilerOptions {
        deprecated_error: true,
    });
    let int = lib.int;
    lib.session.call_function(&site("old_abs"), &[arg(int)], None);
    assert!(lib.session.diagnostics().has_errors());
}

#[test]
fn type_instantiation_checks_bounds() {
    let mut lib = Lib::new();
    let (int, text, boolean) = (lib.int, lib.text, lib.boolean);

    let ty = lib.session.instantiate(&site("map"), &[TypeSet::One(text), TypeSet::One(int)]);
    assert_eq!(lib.display(ty), "map<text,integer>");

    let ty = lib.session.instantiate(&site("map"), &[TypeSet::One(boolean), TypeSet::One(int)]);
    assert!(ty.is_error());
    let ty = lib.session.instantiate(&site("f"), &[TypeSet::One(int)]);
    assert!(ty.is_error());
    assert_eq!(
        lib.codes(),
        vec!["param_bounds:map:K:-comparable:boolean", "unknown_name:f"]
    );
}

// ============================================================================
// Function values
// ============================================================================

#[test]
fn function_value_matches_expected_type_by_arity() {
    let mut lib = Lib::new();
    let int = lib.int;
    let unary = lib.function_type(&[int], int);
    let binary = lib.function_type(&[int, int], int);

    let add = global(&lib, "add");
    let target = add.cases()[0]
        .partial_target(lib.session.arena_mut(), None)
        .expect("add has a fixed body");
    assert!(target.match_fn_type(lib.session.arena_mut(), unary).is_none());
    let exact = target
        .match_fn_type(lib.session.arena_mut(), binary)
        .expect("two integers");
    assert!(exact.exact);
    assert_eq!(exact.param_count, 2);

    let value = lib.session.function_value(&site("add"), Some(binary));
    assert_eq!(value.result_type(), binary);

    // A single candidate is chosen anyway; the caller's assignment check rejects it
    let value = lib.session.function_value(&site("add"), Some(unary));
    assert_eq!(value.result_type(), binary);
    assert!(!lib.session.arena().is_super_type_of(unary, value.result_type()));
    assert!(lib.session.diagnostics().is_empty());
}

#[test]
fn wildcards_leave_parameters_open() {
    let mut lib = Lib::new();
    let int = lib.int;
    let call = lib.session.call_function(&site("add"), &[arg(int), wildcard()], None);
    let CompiledCall::Partial {
        fn_type,
        bound_args,
        wildcard_params,
        ..
    } = call
    else {
        panic!("expected a partial application, got {call:?}");
    };
    assert_eq!(lib.display(fn_type), "(integer)->integer");
    assert_eq!(bound_args.len(), 1);
    assert_eq!(wildcard_params, vec![1]);

    let named = [CallArg::named("a", int, Span::default()), wildcard()];
    assert!(lib.session.call_function(&site("add"), &named, None).is_error());
    assert_eq!(lib.codes(), vec!["expr:call:partial_named_arg:[add]"]);
}

#[test]
fn overloaded_function_value_needs_an_expected_type() {
    let mut lib = Lib::new();
    let text = lib.text;
    let f = global(&lib, "f");

    let call = lib.session.compile_partial_global(&site("f"), &f, &[wildcard()], None);
    assert!(call.is_error());
    assert_eq!(lib.codes(), vec!["expr:call:partial_ambiguous:[f]"]);

    let hint = lib.function_type(&[text], text);
    let call = lib.session.compile_partial_global(&site("f"), &f, &[wildcard()], Some(hint));
    assert_eq!(body(&call), "f_text");
}

#[test]
fn argument_hints_need_agreeing_cases() {
    let mut lib = Lib::new();
    let int = lib.int;
    let add = global(&lib, "add");
    let f = global(&lib, "f");
    assert_eq!(lib.session.param_type_hint(add.cases(), None, 1, None), Some(int));
    assert_eq!(lib.session.param_type_hint(f.cases(), None, 0, None), None);
}
