// function.rs
//
// Library functions and their opaque bodies.

use std::fmt;
use std::rc::Rc;

use rell_identity::{Name, QualifiedName};
use rell_mtype::{FunctionHeader, SubstitutionMap, TypeArena, TypeId};
use rustc_hash::FxHashMap;

/// The callable a resolved call compiles to. Opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SysFunction {
    /// Name of the interpreter-side implementation
    pub runtime_name: Name,
    /// Name of the query-language function, when usable inside queries
    pub db_name: Option<Name>,
    pub pure: bool,
}

impl SysFunction {
    pub fn new(runtime_name: impl Into<Name>) -> Self {
        Self {
            runtime_name: runtime_name.into(),
            db_name: None,
            pure: false,
        }
    }

    pub fn with_db(mut self, db_name: impl Into<Name>) -> Self {
        self.db_name = Some(db_name.into());
        self
    }

    pub fn pure(mut self) -> Self {
        self.pure = true;
        self
    }
}

/// What a delegating body gets to pick its implementation.
#[derive(Debug, Clone)]
pub struct BodyMeta {
    pub self_type: Option<TypeId>,
    pub result_type: TypeId,
    pub type_args: FxHashMap<Name, TypeId>,
}

impl BodyMeta {
    pub fn type_arg(&self, name: &str) -> Option<TypeId> {
        self.type_args.get(&Name::new(name)).copied()
    }
}

type BodySelector = dyn Fn(&BodyMeta) -> Option<SysFunction>;

#[derive(Clone)]
pub enum FunctionBody {
    Direct(SysFunction),
    /// Chooses the implementation per call; `None` means the case does not apply.
    Delegating(Rc<BodySelector>),
}

impl FunctionBody {
    pub fn direct(function: SysFunction) -> Self {
        FunctionBody::Direct(function)
    }

    pub fn delegating(select: impl Fn(&BodyMeta) -> Option<SysFunction> + 'static) -> Self {
        FunctionBody::Delegating(Rc::new(select))
    }

    pub fn sys_function(&self, meta: &BodyMeta) -> Option<SysFunction> {
        match self {
            FunctionBody::Direct(f) => Some(f.clone()),
            FunctionBody::Delegating(select) => select(meta),
        }
    }
}

impl fmt::Debug for FunctionBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionBody::Direct(sys) => f.debug_tuple("Direct").field(&sys.runtime_name).finish(),
            FunctionBody::Delegating(_) => f.write_str("Delegating(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LibFunction {
    pub qualified_name: QualifiedName,
    pub header: FunctionHeader,
    pub body: FunctionBody,
}

impl LibFunction {
    pub fn simple_name(&self) -> &Name {
        self.qualified_name.last()
    }

    /// `function name(params): result`, under `name` (an alias spelling, say).
    pub fn signature(&self, arena: &TypeArena, name: &str) -> String {
        format!("function {}", self.header.display_named(arena, name))
    }

    pub fn substitute(&self, arena: &mut TypeArena, map: &SubstitutionMap) -> Self {
        Self {
            qualified_name: self.qualified_name.clone(),
            header: self.header.substitute(arena, map),
            body: self.body.clone(),
        }
    }
}
