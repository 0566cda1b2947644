// extension.rs
//
// Extension facets: members attached to every subtype of a pattern type, with the
// extension's type parameters inferred from the receiver.

use std::rc::Rc;

use rell_identity::{ExtensionId, QualifiedName};
use rell_lmodel::TypeExtension;
use rell_mtype::{HeaderTypeParam, SubstitutionMap, TypeArena, TypeId, TypeParamsResolver, TypeSet};
use smallvec::SmallVec;
use tracing::trace;

use crate::errors::RegistryError;
use crate::member::{convert_body, TypeBody};

#[derive(Debug)]
pub struct LibTypeExtension {
    model: Rc<TypeExtension>,
    type_params: SmallVec<[HeaderTypeParam; 2]>,
    body: TypeBody,
}

impl LibTypeExtension {
    pub(crate) fn convert(arena: &TypeArena, model: &Rc<TypeExtension>) -> Result<Self, RegistryError> {
        let type_params = model
            .type_params
            .iter()
            .map(|&p| HeaderTypeParam::of(arena, p))
            .collect();
        let body = convert_body(
            arena,
            model.self_type,
            &model.type_params,
            &model.qualified_name,
            &model.members,
        )?;
        Ok(Self {
            model: Rc::clone(model),
            type_params,
            body,
        })
    }

    pub fn id(&self) -> ExtensionId {
        self.model.id
    }

    pub fn name(&self) -> &QualifiedName {
        &self.model.qualified_name
    }

    pub fn self_type(&self) -> TypeId {
        self.model.self_type
    }

    /// `SubOf(self_type)`
    pub fn target(&self) -> TypeSet {
        self.model.target()
    }

    pub fn body(&self) -> &TypeBody {
        &self.body
    }

    /// Whether the extension applies to `ty`, and with which type arguments.
    pub fn match_type(&self, arena: &mut TypeArena, ty: TypeId) -> Option<SubstitutionMap> {
        if ty.is_error() {
            return None;
        }
        if self.type_params.is_empty() {
            return self.target().contains(arena, ty).then(SubstitutionMap::default);
        }

        let mut resolver = TypeParamsResolver::new(&self.type_params);
        if !resolver.match_params_super(arena, self.model.self_type, ty) || !resolver.all_params_matched() {
            return None;
        }
        let resolved = resolver.resolve(arena)?;
        let map: SubstitutionMap = resolved
            .into_iter()
            .map(|(param, t)| (param, TypeSet::One(t)))
            .collect();
        let target = arena.substitute(self.model.self_type, &map);
        TypeSet::SubOf(target).contains(arena, ty).then_some(map)
    }

    /// Members for `ty`, if the extension applies.
    pub fn members_for(&self, arena: &mut TypeArena, ty: TypeId) -> Option<TypeBody> {
        let map = self.match_type(arena, ty)?;
        trace!(extension = %self.name().str(), ty = %arena.display(ty), "extension applies");
        Some(self.body.instantiate(arena, ty, &map, true))
    }
}
