// Member tables: own facets, extensions, constructors and the member cache.

mod common;

use common::{Lib, arg, site};
use rell_clib::{CompiledCall, RegistryEntry, Severity, ValueMember};

fn runtime_name(call: &CompiledCall) -> String {
    call.target().expect("call compiled").body.runtime_name.to_string()
}

#[test]
fn member_of_generic_type_substitutes_receiver_arguments() {
    let mut lib = Lib::new();
    let int = lib.int;
    let box_int = lib.of(lib.boxed, &[int]);
    let call = lib.session.call_member(&site("get"), box_int, &[], None);
    assert_eq!(call.result_type(), int);
    assert_eq!(call.target().unwrap().full_name, "box<integer>.get");
}

#[test]
fn raw_constructor_infers_type_arguments() {
    let mut lib = Lib::new();
    let (int, text) = (lib.int, lib.text);
    let Some(RegistryEntry::Type { typedef, .. }) = lib.session.resolve_name(&site("pair")) else {
        panic!("pair is not a type");
    };
    let call = lib
        .session
        .call_constructor(&site("pair"), typedef.self_type(), &[arg(int), arg(text)], None);
    assert_eq!(lib.display(call.result_type()), "pair<integer,text>");

    // Explicit type arguments fix the parameter types
    let pair_int_int = lib.of(lib.pair, &[int, int]);
    let call = lib
        .session
        .call_constructor(&site("pair"), pair_int_int, &[arg(int), arg(text)], None);
    assert!(call.is_error());
    assert_eq!(lib.codes(), vec!["expr_call_argtype:[pair<integer,integer>]:2:integer:text"]);
}

#[test]
fn variadic_constructor_and_static_function() {
    let mut lib = Lib::new();
    let int = lib.int;
    let list_int = lib.of(lib.list, &[int]);

    let call = lib.session.call_constructor(&site("list"), list_int, &[arg(int), arg(int), arg(int)], None);
    assert_eq!(call.result_type(), list_int);
    let call = lib.session.call_constructor(&site("list"), list_int, &[], None);
    assert_eq!(call.result_type(), list_int);

    let call = lib.session.call_static(&site("of"), list_int, &[arg(int)], None);
    assert_eq!(call.result_type(), list_int);
    assert_eq!(call.target().unwrap().full_name, "list<integer>.of");
    assert!(lib.session.diagnostics().is_empty());
}

#[test]
fn missing_members_are_reported() {
    let mut lib = Lib::new();
    let int = lib.int;
    let box_int = lib.of(lib.boxed, &[int]);
    assert!(lib.session.call_member(&site("nope"), box_int, &[], None).is_error());
    assert!(lib.session.call_constructor(&site("box"), box_int, &[], None).is_error());
    assert_eq!(
        lib.codes(),
        vec!["unknown_member:[box<integer>]:nope", "expr:call:no_constructor:box<integer>"]
    );

    // Nothing more to say about an error-typed receiver
    let error = lib.session.arena().error();
    assert!(lib.session.call_member(&site("get"), error, &[], None).is_error());
    assert_eq!(lib.session.diagnostics().len(), 2);
}

#[test]
fn member_alias_reports_deprecation() {
    let mut lib = Lib::new();
    let int = lib.int;
    let list_int = lib.of(lib.list, &[int]);
    let call = lib.session.call_member(&site("len"), list_int, &[], None);
    assert_eq!(call.result_type(), int);
    assert_eq!(runtime_name(&call), "list_size");
    assert_eq!(lib.codes(), vec!["deprecated:FUNCTION:[len]:size"]);
    assert_eq!(lib.session.diagnostics().items()[0].severity, Severity::Warning);
}

#[test]
fn delegating_body_depends_on_type_arguments() {
    let mut lib = Lib::new();
    let (int, text) = (lib.int, lib.text);
    let list_int = lib.of(lib.list, &[int]);
    let list_text = lib.of(lib.list, &[text]);

    let call = lib.session.call_member(&site("sum"), list_int, &[], None);
    assert_eq!(runtime_name(&call), "list_sum_integer");

    let call = lib.session.call_member(&site("sum"), list_text, &[], None);
    assert!(call.is_error());
    assert_eq!(lib.codes(), vec!["expr_call_argtypes:[list<text>.sum]:"]);
}

// ============================================================================
// Extensions
// ============================================================================

#[test]
fn extension_members_are_specialized_for_the_receiver() {
    let mut lib = Lib::new();
    let text = lib.text;
    let list_text = lib.of(lib.list, &[text]);

    let members = lib.session.members_of(list_text);
    assert!(members.value_function("firstOrNull").is_some());
    let signatures = members.signatures(lib.session.arena_mut(), list_text);
    assert!(signatures.contains(&"firstOrNull(): text?".to_string()), "{signatures:?}");

    let call = lib.session.call_member(&site("firstOrNull"), list_text, &[], None);
    assert_eq!(lib.display(call.result_type()), "text?");
    assert_eq!(runtime_name(&call), "list_first_or_null");
}

#[test]
fn extension_does_not_apply_outside_its_target() {
    let mut lib = Lib::new();
    let text = lib.text;
    let box_text = lib.of(lib.boxed, &[text]);
    let members = lib.session.members_of(box_text);
    assert!(members.value_members_named("firstOrNull").is_empty());
    assert_eq!(lib.session.members_of(text).value_members.len(), 0);
}

#[test]
fn own_members_come_before_extension_members() {
    let mut lib = Lib::new();
    let int = lib.int;
    let list_int = lib.of(lib.list, &[int]);
    let members = lib.session.members_of(list_int);
    let names: Vec<&str> = members.value_members.iter().map(|m| m.name().as_str()).collect();
    assert_eq!(names.last(), Some(&"firstOrNull"));
    assert!(names.starts_with(&["size", "get", "add"]));
    assert!(matches!(members.value_members[0], ValueMember::Function(_)));
}

// ============================================================================
// Constructors with bounded parameter types
// ============================================================================

#[test]
fn constructor_breaking_bounds_is_kept_and_reported_at_call() {
    let mut lib = Lib::new();
    let (int, boolean) = (lib.int, lib.boolean);

    let holder_int = lib.of(lib.holder, &[int]);
    let sorted_int = lib.of(lib.sorted, &[int]);
    let call = lib.session.call_constructor(&site("holder"), holder_int, &[arg(sorted_int)], None);
    assert_eq!(call.result_type(), holder_int);
    assert!(lib.session.diagnostics().is_empty());

    // No constructor validates for holder<boolean>, so all of them stay
    let holder_bool = lib.of(lib.holder, &[boolean]);
    let members = lib.session.members_of(holder_bool);
    assert_eq!(members.constructor.as_ref().map(|c| c.cases().len()), Some(1));

    let sorted_bool = lib.of(lib.sorted, &[boolean]);
    let call = lib.session.call_constructor(&site("holder"), holder_bool, &[arg(sorted_bool)], None);
    assert!(call.is_error());
    assert_eq!(lib.codes(), vec!["param_bounds:sorted:S:-comparable:boolean"]);
    assert_eq!(lib.session.diagnostics().items()[0].severity, Severity::Error);
}

// ============================================================================
// Member cache
// ============================================================================

#[test]
fn closed_types_are_computed_once() {
    let mut lib = Lib::new();
    let int = lib.int;
    let list_int = lib.of(lib.list, &[int]);

    let first = lib.session.members_of(list_int);
    let second = lib.session.members_of(list_int);
    assert!(std::rc::Rc::ptr_eq(&first, &second));
    assert_eq!(lib.session.cache().computations(), 1);
    assert_eq!(lib.session.cache().hits(), 1);
    assert_eq!(lib.session.cache().len(), 1);
}

#[test]
fn types_with_free_parameters_are_not_cached() {
    let mut lib = Lib::new();
    let Some(RegistryEntry::Type { typedef, .. }) = lib.session.resolve_name(&site("list")) else {
        panic!("list is not a type");
    };
    let raw = typedef.self_type();

    lib.session.members_of(raw);
    lib.session.members_of(raw);
    assert_eq!(lib.session.cache().computations(), 2);
    assert_eq!(lib.session.cache().hits(), 0);
    assert!(lib.session.cache().is_empty());
}

#[test]
fn instantiations_differ_only_by_substitution() {
    let mut lib = Lib::new();
    let (int, text) = (lib.int, lib.text);
    let list_int = lib.of(lib.list, &[int]);
    let list_text = lib.of(lib.list, &[text]);

    let ints = lib.session.members_of(list_int);
    let ints = ints.signatures(lib.session.arena_mut(), list_int);
    let texts = lib.session.members_of(list_text);
    let texts = texts.signatures(lib.session.arena_mut(), list_text);
    assert_eq!(ints.len(), texts.len());
    for (a, b) in ints.iter().zip(&texts) {
        assert_eq!(a.replace("integer", "text"), *b);
    }
}
