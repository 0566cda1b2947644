// generic.rs
//
// Definitions behind generic types and type parameters.

use rell_identity::{GenericTypeId, Name, TypeParamId};
use smallvec::SmallVec;

use crate::type_id::TypeIdVec;
use crate::typeset::TypeSet;

/// Declared variance of a generic type parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variance {
    Invariant,
    /// Covariant (`out T`)
    Out,
    /// Contravariant (`in T`)
    In,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParamDef {
    pub name: Name,
    pub variance: Variance,
    /// The set every argument for this parameter must be contained in. May reference
    /// parameters declared before this one.
    pub bounds: TypeSet,
}

/// Supertype of a generic type definition, written in terms of the definition's own
/// parameters (`list<T> : collection<T>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericParent {
    pub def: GenericTypeId,
    pub args: TypeIdVec,
}

/// "Values of type `from` convert to the owning type through `adapter`."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionDecl {
    pub from: GenericTypeId,
    pub adapter: Name,
}

#[derive(Debug, Clone)]
pub struct GenericTypeDef {
    pub name: Name,
    pub params: SmallVec<[TypeParamId; 2]>,
    pub parent: Option<GenericParent>,
    pub conversions: Vec<ConversionDecl>,
}

impl GenericTypeDef {
    pub fn is_generic(&self) -> bool {
        !self.params.is_empty()
    }
}
