// Shared fixture: a small standard library and a session over it.

#![allow(dead_code)]

use std::rc::Rc;

use rell_clib::{CallArg, CallSite, CompilerOptions, LibSession, Registry};
use rell_identity::{GenericTypeId, QualifiedName, Span};
use rell_lmodel::{
    Deprecated, FunctionBody, FunctionDecl, LibModule, ModuleBuilder, SysFunction, TypeParamDecl,
};
use rell_mtype::{FunctionParam, ParamArity, TypeArena, TypeId, TypeSet};
use tracing_subscriber::EnvFilter;

/// Set `RELL_LOG=debug` to see resolution traces in test output.
pub fn init_tracing() {
    if let Ok(filter) = EnvFilter::try_from_env("RELL_LOG") {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init();
    }
}

pub struct Lib {
    pub session: LibSession,
    pub int: TypeId,
    pub decimal: TypeId,
    pub text: TypeId,
    pub boolean: TypeId,
    pub list: GenericTypeId,
    pub map: GenericTypeId,
    pub boxed: GenericTypeId,
    pub pair: GenericTypeId,
    pub sorted: GenericTypeId,
    pub holder: GenericTypeId,
}

impl Lib {
    pub fn new() -> Self {
        Self::with_options(CompilerOptions::default())
    }

    pub fn with_options(options: CompilerOptions) -> Self {
        init_tracing();
        let mut arena = TypeArena::new();
        let module = stdlib(&mut arena);
        let registry = Registry::convert(&module, &mut arena).expect("stdlib converts");
        let [list, map, boxed, pair, sorted, holder, int, decimal, text, boolean] = [
            "list", "map", "box", "pair", "sorted", "holder", "integer", "decimal", "text", "boolean",
        ]
        .map(|name| arena.find_generic(name).expect("declared type"));
        let [int, decimal, text, boolean] = [int, decimal, text, boolean].map(|g| arena.common_type(g));
        Lib {
            session: LibSession::new(arena, Rc::new(registry), options),
            int,
            decimal,
            text,
            boolean,
            list,
            map,
            boxed,
            pair,
            sorted,
            holder,
        }
    }

    pub fn of(&mut self, generic: GenericTypeId, args: &[TypeId]) -> TypeId {
        self.session.arena_mut().generic_of(generic, args)
    }

    pub fn function_type(&mut self, params: &[TypeId], result: TypeId) -> TypeId {
        self.session.arena_mut().function(params, result)
    }

    pub fn display(&self, ty: TypeId) -> String {
        self.session.arena().display(ty)
    }

    pub fn codes(&self) -> Vec<String> {
        self.session.diagnostics().codes()
    }
}

pub fn site(name: &str) -> CallSite {
    CallSite::new(QualifiedName::parse(name).expect("valid name"), Span::new(0, name.len(), 1, 1))
}

pub fn arg(ty: TypeId) -> CallArg {
    CallArg::expr(ty, Span::default())
}

pub fn wildcard() -> CallArg {
    CallArg::wildcard(Span::default())
}

fn sys(name: &str) -> FunctionBody {
    FunctionBody::direct(SysFunction::new(name))
}

fn stdlib(arena: &mut TypeArena) -> LibModule {
    ModuleBuilder::build(arena, "rell", |b| {
        let comparable = b.declare_simple("comparable", None);
        let int = b.declare_simple("integer", Some(&comparable));
        let decimal = b.declare_simple("decimal", Some(&comparable));
        let text = b.declare_simple("text", Some(&comparable));
        let boolean = b.declare_simple("boolean", None);
        b.add_conversion(&decimal, &int, "integer_to_decimal");
        for ty in [&comparable, &int, &decimal, &text, &boolean] {
            b.type_def(ty, |_| Ok(()))?;
        }
        let (int, decimal, text, boolean) = (
            int.self_type,
            decimal.self_type,
            text.self_type,
            boolean.self_type,
        );
        let comparable = comparable.self_type;

        let list = b.declare_type("list", &[TypeParamDecl::new("T")]);
        let list_t = list.param(0);
        b.type_def(&list, |t| {
            t.constructor(
                FunctionDecl::constructor(sys("list_new"))
                    .param(FunctionParam::named("values", list_t).with_arity(ParamArity::ZeroMany)),
            )?;
            t.static_function(
                "of",
                FunctionDecl::new(list.self_type, sys("list_of"))
                    .param(FunctionParam::named("values", list_t).with_arity(ParamArity::ZeroMany)),
            )?;
            t.function("size", FunctionDecl::new(int, sys("list_size")))?;
            t.function(
                "get",
                FunctionDecl::new(list_t, sys("list_get")).param(FunctionParam::named("index", int)),
            )?;
            t.function(
                "add",
                FunctionDecl::new(boolean, sys("list_add")).param(FunctionParam::named("value", list_t)),
            )?;
            t.alias("len", "size", Some(Deprecated::warning().use_instead("size")))?;
            let sum = FunctionBody::delegating(move |meta| {
                (meta.type_arg("T") == Some(int)).then(|| SysFunction::new("list_sum_integer"))
            });
            t.function("sum", FunctionDecl::new(list_t, sum))
        })?;

        let key = TypeParamDecl::new("K").bounded(TypeSet::SubOf(comparable));
        let map = b.declare_type("map", &[key, TypeParamDecl::new("V")]);
        let map_v = map.param(1);
        b.type_def(&map, |t| {
            t.constructor(FunctionDecl::constructor(sys("map_new")))?;
            t.function(
                "get",
                FunctionDecl::new(map_v, sys("map_get")).param(FunctionParam::named("key", map.param(0))),
            )
        })?;

        let boxed = b.declare_type("box", &[TypeParamDecl::new("T")]);
        b.type_def(&boxed, |t| t.function("get", FunctionDecl::new(boxed.param(0), sys("box_get"))))?;

        let pair = b.declare_type("pair", &[TypeParamDecl::new("A"), TypeParamDecl::new("B")]);
        b.type_def(&pair, |t| {
            t.constructor(
                FunctionDecl::constructor(sys("pair_new"))
                    .param(FunctionParam::named("a", pair.param(0)))
                    .param(FunctionParam::named("b", pair.param(1))),
            )
        })?;

        // A constructor that only type-checks for comparable arguments
        let sorted = b.declare_type(
            "sorted",
            &[TypeParamDecl::new("S").bounded(TypeSet::SubOf(comparable))],
        );
        b.type_def(&sorted, |_| Ok(()))?;
        let holder = b.declare_type("holder", &[TypeParamDecl::new("T")]);
        let sorted_t = b.arena().generic_of(sorted.generic, &[holder.param(0)]);
        b.type_def(&holder, |t| {
            t.constructor(
                FunctionDecl::constructor(sys("holder_new")).param(FunctionParam::named("items", sorted_t)),
            )
        })?;

        let (ext_t, ext_t_ty) = b.type_param(TypeParamDecl::new("T"));
        let ext_list = b.arena().generic_of(list.generic, &[ext_t_ty]);
        let first_or_null = b.arena().nullable(ext_t_ty);
        b.extension("list_ext", &[ext_t], ext_list, |e| {
            e.function("firstOrNull", FunctionDecl::new(first_or_null, sys("list_first_or_null")))
        })?;

        b.function(
            "f",
            FunctionDecl::new(int, sys("f_integer")).param(FunctionParam::named("x", int)),
        )?;
        b.function(
            "f",
            FunctionDecl::new(text, sys("f_text")).param(FunctionParam::named("x", text)),
        )?;
        // Both apply to integers; declaration order decides
        b.function(
            "show",
            FunctionDecl::new(text, sys("show_comparable")).param(FunctionParam::new(comparable)),
        )?;
        b.function(
            "show",
            FunctionDecl::new(text, sys("show_integer")).param(FunctionParam::new(int)),
        )?;
        // Integers reach the decimal case only through a conversion
        b.function(
            "round",
            FunctionDecl::new(decimal, sys("round")).param(FunctionParam::named("value", decimal)),
        )?;
        b.function(
            "add",
            FunctionDecl::new(int, sys("add"))
                .param(FunctionParam::named("a", int))
                .param(FunctionParam::named("b", int)),
        )?;

        let (max_t, max_t_ty) = b.type_param(TypeParamDecl::new("T").bounded(TypeSet::SubOf(comparable)));
        b.function(
            "max",
            FunctionDecl::new(max_t_ty, sys("max"))
                .type_params(&[max_t])
                .param(FunctionParam::new(max_t_ty))
                .param(FunctionParam::new(max_t_ty)),
        )?;

        let old = b.function(
            "old_abs",
            FunctionDecl::new(int, sys("abs"))
                .param(FunctionParam::new(int))
                .deprecated(Deprecated::warning().use_instead("abs")),
        )?;
        b.alias("older_abs", &old, Some(Deprecated::error()));

        b.constant("MAX_INT", int, "9223372036854775807");

        b.namespace("crypto", |b| {
            b.function(
                "sha256",
                FunctionDecl::new(text, sys("sha256")).param(FunctionParam::new(text)),
            )?;
            Ok(())
        })?;
        Ok(())
    })
    .expect("stdlib declarations are valid")
}
