// function.rs
//
// Overload sets: a named list of cases, resolved together.

use rell_identity::Name;
use rell_mtype::{SubstitutionMap, TypeArena, TypeId};

use crate::case::LibCase;

/// A namespace function, static member or constructor.
#[derive(Debug, Clone)]
pub struct GlobalFunction {
    name: String,
    simple_name: Name,
    cases: Vec<LibCase>,
}

impl GlobalFunction {
    pub fn new(name: impl Into<String>, simple_name: Name, cases: Vec<LibCase>) -> Self {
        Self {
            name: name.into(),
            simple_name,
            cases,
        }
    }

    /// Full name used in diagnostics (`crypto.sha256`, `list<integer>.from`).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn simple_name(&self) -> &Name {
        &self.simple_name
    }

    pub fn cases(&self) -> &[LibCase] {
        &self.cases
    }

    /// Specialize a static member for one instantiation of its owner.
    pub(crate) fn specialize(&self, arena: &mut TypeArena, owner: TypeId, map: &SubstitutionMap) -> Self {
        let cases: Vec<LibCase> = self
            .cases
            .iter()
            .map(|c| c.substitute(arena, map).with_owner(owner))
            .collect();
        let name = cases
            .first()
            .map_or_else(|| self.name.clone(), |c| c.full_name(arena, None));
        Self {
            name,
            simple_name: self.simple_name.clone(),
            cases,
        }
    }
}

/// An instance member function of a type or extension.
#[derive(Debug, Clone)]
pub struct MemberFunction {
    name: Name,
    cases: Vec<LibCase>,
}

impl MemberFunction {
    pub fn new(name: Name, cases: Vec<LibCase>) -> Self {
        Self { name, cases }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn cases(&self) -> &[LibCase] {
        &self.cases
    }

    pub(crate) fn substitute(&self, arena: &mut TypeArena, map: &SubstitutionMap) -> Self {
        Self {
            name: self.name.clone(),
            cases: self.cases.iter().map(|c| c.substitute(arena, map)).collect(),
        }
    }
}
