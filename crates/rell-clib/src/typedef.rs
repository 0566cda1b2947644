// typedef.rs
//
// The own facet of a library type: constructors and members of one type definition,
// specialized per instantiation.

use std::rc::Rc;

use rell_identity::{GenericTypeId, Name, QualifiedName, TypeParamId};
use rell_lmodel::{Deprecated, LibFunction, TypeDef, TypeDefMember};
use rell_mtype::{FunctionHeader, TypeArena, TypeId};
use smallvec::SmallVec;
use tracing::debug;

use crate::case::{type_arg_names, LibCase};
use crate::errors::RegistryError;
use crate::function::GlobalFunction;
use crate::member::{convert_body, TypeBody, TypeMembers};
use crate::naming::CaseNaming;

/// A declared constructor, with its own header (result = the type's common type).
#[derive(Debug, Clone)]
struct ConstructorDecl {
    function: Rc<LibFunction>,
    deprecated: Option<Deprecated>,
}

#[derive(Debug)]
pub struct LibTypeDef {
    model: Rc<TypeDef>,
    self_type: TypeId,
    params: SmallVec<[TypeParamId; 2]>,
    constructors: Vec<ConstructorDecl>,
    /// Constructor of the raw type (`list(...)`), with the type's parameters inferred
    raw_constructor: Option<Rc<GlobalFunction>>,
    body: TypeBody,
}

impl LibTypeDef {
    pub(crate) fn convert(arena: &mut TypeArena, model: &Rc<TypeDef>) -> Result<Self, RegistryError> {
        let params = arena.generic_def(model.generic).params.clone();
        let self_type = arena.common_type(model.generic);

        let constructors: Vec<ConstructorDecl> = model
            .members
            .iter()
            .filter_map(|m| match m {
                TypeDefMember::Constructor(c) => Some(ConstructorDecl {
                    function: Rc::new(LibFunction {
                        qualified_name: model.qualified_name.clone(),
                        header: c.header.clone(),
                        body: c.body.clone(),
                    }),
                    deprecated: c.deprecated.clone(),
                }),
                _ => None,
            })
            .collect();

        let raw_constructor = (!constructors.is_empty()).then(|| {
            let cases = constructors
                .iter()
                .map(|c| {
                    let function = LibFunction {
                        header: c.function.header.with_outer_type_params(arena, &params),
                        ..(*c.function).clone()
                    };
                    LibCase::global(CaseNaming::Constructor { owner: self_type }, Rc::new(function))
                        .deprecated(c.deprecated.clone())
                })
                .collect();
            let name = arena.generic_def(model.generic).name.clone();
            Rc::new(GlobalFunction::new(name.to_string(), name, cases))
        });

        let body = convert_body(arena, self_type, &params, &model.qualified_name, &model.members)?;
        debug!(
            name = %model.qualified_name.str(),
            constructors = constructors.len(),
            statics = body.static_members.len(),
            values = body.value_members.len(),
            "type converted"
        );
        Ok(Self {
            model: Rc::clone(model),
            self_type,
            params,
            constructors,
            raw_constructor,
            body,
        })
    }

    pub fn model(&self) -> &Rc<TypeDef> {
        &self.model
    }

    pub fn name(&self) -> &QualifiedName {
        &self.model.qualified_name
    }

    pub fn simple_name(&self) -> &Name {
        self.model.simple_name()
    }

    pub fn generic(&self) -> GenericTypeId {
        self.model.generic
    }

    pub fn is_generic(&self) -> bool {
        !self.params.is_empty()
    }

    pub fn is_hidden(&self) -> bool {
        self.model.hidden
    }

    /// The common type: the definition applied to its own parameters.
    pub fn self_type(&self) -> TypeId {
        self.self_type
    }

    pub fn params(&self) -> &[TypeParamId] {
        &self.params
    }

    pub fn body(&self) -> &TypeBody {
        &self.body
    }

    fn is_raw(&self, arena: &TypeArena, ty: TypeId) -> bool {
        ty == self.self_type || !self.is_generic() || arena.type_args_map(ty).is_empty()
    }

    /// Constructors of `ty`. Constructors whose specialized header breaks a bound are
    /// dropped, unless that leaves none; then all are kept and the call reports.
    pub fn constructor_for(&self, arena: &mut TypeArena, ty: TypeId) -> Option<Rc<GlobalFunction>> {
        if self.constructors.is_empty() {
            return None;
        }
        if self.is_raw(arena, ty) {
            return self.raw_constructor.clone();
        }

        let map = arena.type_args_map(ty);
        let mut specialized: Vec<(FunctionHeader, &ConstructorDecl)> = Vec::new();
        for c in &self.constructors {
            let header = c.function.header.substitute(arena, &map);
            if header.validate(arena).is_ok() {
                specialized.push((header, c));
            }
        }
        if specialized.is_empty() {
            debug!(ty = %arena.display(ty), "no constructor fits the type arguments, keeping all");
            for c in &self.constructors {
                specialized.push((c.function.header.substitute(arena, &map), c));
            }
        }

        let names = Rc::new(type_arg_names(arena, &map));
        let cases = specialized
            .into_iter()
            .map(|(header, c)| {
                let function = LibFunction {
                    qualified_name: c.function.qualified_name.clone(),
                    header,
                    body: c.function.body.clone(),
                };
                LibCase::Global {
                    naming: CaseNaming::Constructor { owner: ty },
                    function: Rc::new(function),
                    outer_type_args: Rc::clone(&names),
                }
                .deprecated(c.deprecated.clone())
            })
            .collect();
        Some(Rc::new(GlobalFunction::new(
            arena.display(ty),
            self.simple_name().clone(),
            cases,
        )))
    }

    /// Own members as seen on `ty`, an instantiation of this definition.
    pub fn members_for(&self, arena: &mut TypeArena, ty: TypeId) -> TypeMembers {
        let constructor = self.constructor_for(arena, ty);
        let body = if self.is_raw(arena, ty) {
            self.body.clone()
        } else {
            let map = arena.type_args_map(ty);
            self.body.instantiate(arena, ty, &map, false)
        };
        TypeMembers {
            constructor,
            static_members: body.static_members,
            value_members: body.value_members,
        }
    }
}
