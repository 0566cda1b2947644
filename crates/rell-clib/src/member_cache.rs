// member_cache.rs
//
// Per-type member tables. Computing members specializes every own and extension
// member for the type, so results are kept for types that are stable keys (no
// free type parameters).

use std::rc::Rc;

use rell_mtype::{TypeArena, TypeId};
use rustc_hash::FxHashMap;
use tracing::{instrument, trace};

use crate::member::TypeMembers;
use crate::registry::Registry;

#[derive(Debug, Default)]
pub struct MemberCache {
    entries: FxHashMap<TypeId, Rc<TypeMembers>>,
    computations: usize,
    hits: usize,
}

impl MemberCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(level = "debug", skip(self, arena, registry))]
    pub fn members_of(&mut self, arena: &mut TypeArena, registry: &Registry, ty: TypeId) -> Rc<TypeMembers> {
        if let Some(members) = self.entries.get(&ty) {
            self.hits += 1;
            trace!("member cache hit");
            return Rc::clone(members);
        }
        let members = Rc::new(compute_members(arena, registry, ty));
        self.computations += 1;
        if arena.is_cacheable(ty) {
            self.entries.insert(ty, Rc::clone(&members));
        } else {
            trace!("type has free parameters, not cached");
        }
        members
    }

    /// Member tables built so far, cached or not.
    pub fn computations(&self) -> usize {
        self.computations
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Own facet first, then extensions in registration order.
pub fn compute_members(arena: &mut TypeArena, registry: &Registry, ty: TypeId) -> TypeMembers {
    let mut members = match registry.typedef_of_type(arena, ty) {
        Some(typedef) => typedef.members_for(arena, ty),
        None => TypeMembers::default(),
    };
    for extension in registry.extensions() {
        if let Some(body) = extension.members_for(arena, ty) {
            members.extend(body);
        }
    }
    members
}
