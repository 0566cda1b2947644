// member.rs
//
// Members of a type. `TypeBody` is what conversion makes of one type definition or
// extension; `TypeMembers` is the merged view of a concrete type (own facet, then
// every applicable extension).

use std::rc::Rc;

use rell_identity::{Name, QualifiedName, TypeParamId};
use rell_lmodel::{Deprecated, FunctionBody, LibFunction, TypeDefAlias, TypeDefFunction, TypeDefMember};
use rell_mtype::{SubstitutionMap, TypeArena, TypeId};

use crate::case::LibCase;
use crate::errors::RegistryError;
use crate::function::{GlobalFunction, MemberFunction};
use crate::naming::CaseNaming;

#[derive(Debug, Clone)]
pub enum StaticMember {
    Constant {
        name: Name,
        ty: TypeId,
        value: String,
        deprecated: Option<Deprecated>,
    },
    Function(Rc<GlobalFunction>),
}

impl StaticMember {
    pub fn name(&self) -> &Name {
        match self {
            StaticMember::Constant { name, .. } => name,
            StaticMember::Function(f) => f.simple_name(),
        }
    }

    pub fn as_function(&self) -> Option<&Rc<GlobalFunction>> {
        match self {
            StaticMember::Function(f) => Some(f),
            StaticMember::Constant { .. } => None,
        }
    }

    fn specialize(&self, arena: &mut TypeArena, owner: TypeId, map: &SubstitutionMap) -> Self {
        match self {
            StaticMember::Constant {
                name,
                ty,
                value,
                deprecated,
            } => StaticMember::Constant {
                name: name.clone(),
                ty: arena.substitute(*ty, map),
                value: value.clone(),
                deprecated: deprecated.clone(),
            },
            StaticMember::Function(f) => StaticMember::Function(Rc::new(f.specialize(arena, owner, map))),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ValueMember {
    Property {
        name: Name,
        ty: TypeId,
        body: FunctionBody,
        deprecated: Option<Deprecated>,
    },
    Function(Rc<MemberFunction>),
}

impl ValueMember {
    pub fn name(&self) -> &Name {
        match self {
            ValueMember::Property { name, .. } => name,
            ValueMember::Function(f) => f.name(),
        }
    }

    pub fn as_function(&self) -> Option<&Rc<MemberFunction>> {
        match self {
            ValueMember::Function(f) => Some(f),
            ValueMember::Property { .. } => None,
        }
    }

    /// Property types always follow the receiver; function cases only when
    /// `functions` is set (own members re-derive the receiver per call).
    fn substitute(&self, arena: &mut TypeArena, map: &SubstitutionMap, functions: bool) -> Self {
        match self {
            ValueMember::Property {
                name,
                ty,
                body,
                deprecated,
            } => ValueMember::Property {
                name: name.clone(),
                ty: arena.substitute(*ty, map),
                body: body.clone(),
                deprecated: deprecated.clone(),
            },
            ValueMember::Function(f) if functions => {
                ValueMember::Function(Rc::new(f.substitute(arena, map)))
            }
            ValueMember::Function(f) => ValueMember::Function(Rc::clone(f)),
        }
    }
}

/// Converted members of one type definition or extension, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct TypeBody {
    pub static_members: Vec<StaticMember>,
    pub value_members: Vec<ValueMember>,
}

impl TypeBody {
    /// The body as seen on `owner`, an instantiation with type arguments `map`.
    pub(crate) fn instantiate(
        &self,
        arena: &mut TypeArena,
        owner: TypeId,
        map: &SubstitutionMap,
        substitute_functions: bool,
    ) -> TypeBody {
        TypeBody {
            static_members: self
                .static_members
                .iter()
                .map(|m| m.specialize(arena, owner, map))
                .collect(),
            value_members: self
                .value_members
                .iter()
                .map(|m| m.substitute(arena, map, substitute_functions))
                .collect(),
        }
    }
}

/// Everything callable or readable on one concrete type.
#[derive(Debug, Default)]
pub struct TypeMembers {
    pub constructor: Option<Rc<GlobalFunction>>,
    pub static_members: Vec<StaticMember>,
    pub value_members: Vec<ValueMember>,
}

impl TypeMembers {
    pub fn value_members_named(&self, name: &str) -> Vec<&ValueMember> {
        self.value_members
            .iter()
            .filter(|m| m.name().as_str() == name)
            .collect()
    }

    pub fn static_members_named(&self, name: &str) -> Vec<&StaticMember> {
        self.static_members
            .iter()
            .filter(|m| m.name().as_str() == name)
            .collect()
    }

    /// The first value member called `name`, if it is a function. Later members of
    /// the same name (from extensions) are shadowed.
    pub fn value_function(&self, name: &str) -> Option<&Rc<MemberFunction>> {
        self.value_members_named(name).first()?.as_function()
    }

    pub fn static_function(&self, name: &str) -> Option<&Rc<GlobalFunction>> {
        self.static_members_named(name).first()?.as_function()
    }

    pub(crate) fn extend(&mut self, body: TypeBody) {
        self.static_members.extend(body.static_members);
        self.value_members.extend(body.value_members);
    }

    /// Human-readable declarations of all members, as seen from `self_type`.
    pub fn signatures(&self, arena: &mut TypeArena, self_type: TypeId) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(ctor) = &self.constructor {
            for case in ctor.cases() {
                if let Some(signature) = case.signature(arena, None, "constructor") {
                    out.push(signature);
                }
            }
        }
        for member in &self.static_members {
            match member {
                StaticMember::Constant { name, ty, .. } => {
                    out.push(format!("static {}: {}", name, arena.display(*ty)));
                }
                StaticMember::Function(f) => {
                    for case in f.cases() {
                        if let Some(signature) = case.signature(arena, None, f.simple_name().as_str()) {
                            out.push(format!("static {signature}"));
                        }
                    }
                }
            }
        }
        for member in &self.value_members {
            match member {
                ValueMember::Property { name, ty, .. } => {
                    out.push(format!("{}: {}", name, arena.display(*ty)));
                }
                ValueMember::Function(f) => {
                    for case in f.cases() {
                        if let Some(signature) = case.signature(arena, Some(self_type), f.name().as_str()) {
                            out.push(signature);
                        }
                    }
                }
            }
        }
        out
    }
}

enum Draft<M> {
    Member(M),
    Functions { name: Name, cases: Vec<LibCase> },
}

fn push_case<M>(drafts: &mut Vec<Draft<M>>, name: &Name, case: LibCase) {
    for draft in drafts.iter_mut() {
        if let Draft::Functions { name: n, cases } = draft
            && n == name
        {
            cases.push(case);
            return;
        }
    }
    drafts.push(Draft::Functions {
        name: name.clone(),
        cases: vec![case],
    });
}

struct BodyConverter<'a> {
    arena: &'a TypeArena,
    owner: TypeId,
    owner_params: &'a [TypeParamId],
    statics: Vec<Draft<StaticMember>>,
    values: Vec<Draft<ValueMember>>,
}

impl BodyConverter<'_> {
    fn function(&mut self, name: &Name, f: &TypeDefFunction, deprecated: Option<Deprecated>) {
        if f.is_static {
            let function = LibFunction {
                qualified_name: f.function.qualified_name.clone(),
                header: f.function.header.with_outer_type_params(self.arena, self.owner_params),
                body: f.function.body.clone(),
            };
            let naming = CaseNaming::TypeMember {
                owner: self.owner,
                name: name.clone(),
            };
            let case = LibCase::global(naming, Rc::new(function)).deprecated(deprecated);
            push_case(&mut self.statics, name, case);
        } else {
            let case = LibCase::member(name.clone(), Rc::clone(&f.function)).deprecated(deprecated);
            push_case(&mut self.values, name, case);
        }
    }

    fn constant(&mut self, name: &Name, member: &TypeDefMember, alias: Option<&Deprecated>) {
        match member {
            TypeDefMember::Constant(c) => self.statics.push(Draft::Member(StaticMember::Constant {
                name: name.clone(),
                ty: c.ty,
                value: c.value.clone(),
                deprecated: alias.or(c.deprecated.as_ref()).cloned(),
            })),
            TypeDefMember::Property(p) => self.values.push(Draft::Member(ValueMember::Property {
                name: name.clone(),
                ty: p.ty,
                body: p.body.clone(),
                deprecated: alias.or(p.deprecated.as_ref()).cloned(),
            })),
            _ => {}
        }
    }

    fn finish(self) -> TypeBody {
        let arena = self.arena;
        let static_members = self
            .statics
            .into_iter()
            .map(|draft| match draft {
                Draft::Member(m) => m,
                Draft::Functions { name, cases } => {
                    let full_name = cases
                        .first()
                        .map_or_else(|| name.to_string(), |c| c.full_name(arena, None));
                    StaticMember::Function(Rc::new(GlobalFunction::new(full_name, name, cases)))
                }
            })
            .collect();
        let value_members = self
            .values
            .into_iter()
            .map(|draft| match draft {
                Draft::Member(m) => m,
                Draft::Functions { name, cases } => {
                    ValueMember::Function(Rc::new(MemberFunction::new(name, cases)))
                }
            })
            .collect();
        TypeBody {
            static_members,
            value_members,
        }
    }
}

/// Follow an alias (possibly through other aliases) to the member it names.
fn alias_target<'m>(
    members: &'m [TypeDefMember],
    alias: &TypeDefAlias,
    type_name: &QualifiedName,
) -> Result<&'m TypeDefMember, RegistryError> {
    let mut index = alias.target;
    for _ in 0..=members.len() {
        match members.get(index) {
            Some(TypeDefMember::Alias(next)) => index = next.target,
            Some(TypeDefMember::Constructor(_)) | None => break,
            Some(member) => return Ok(member),
        }
    }
    Err(RegistryError::BadAlias {
        type_name: type_name.str(),
        alias: alias.simple_name.to_string(),
    })
}

/// Convert the members of a type definition or extension owned by `owner`, whose
/// type parameters are `owner_params`. Constructors are left to the caller.
pub(crate) fn convert_body(
    arena: &TypeArena,
    owner: TypeId,
    owner_params: &[TypeParamId],
    type_name: &QualifiedName,
    members: &[TypeDefMember],
) -> Result<TypeBody, RegistryError> {
    let mut converter = BodyConverter {
        arena,
        owner,
        owner_params,
        statics: Vec::new(),
        values: Vec::new(),
    };
    for member in members {
        match member {
            TypeDefMember::Constant(c) => converter.constant(&c.simple_name, member, None),
            TypeDefMember::Property(p) => converter.constant(&p.simple_name, member, None),
            TypeDefMember::Constructor(_) => {}
            TypeDefMember::Function(f) => {
                converter.function(f.function.simple_name(), f, f.deprecated.clone());
            }
            TypeDefMember::Alias(alias) => match alias_target(members, alias, type_name)? {
                TypeDefMember::Function(f) => {
                    converter.function(&alias.simple_name, f, alias.deprecated.clone());
                }
                target => converter.constant(&alias.simple_name, target, alias.deprecated.as_ref()),
            },
        }
    }
    Ok(converter.finish())
}
