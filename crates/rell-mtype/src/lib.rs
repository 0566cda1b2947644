// lib.rs
//
// Structural type model: interned types, type sets, generic type definitions,
// substitution, subtyping, type parameter resolution and function headers.

mod arena;
mod errors;
mod function;
mod generic;
mod query;
mod resolver;
mod substitution;
mod type_id;
mod typeset;


pub use arena::{MType, TypeArena};
pub use errors::{BoundViolation, ModelError};
pub use function::{
    ArgBinding, BindError, FunctionHeader, FunctionParam, HeaderMatch, HeaderTypeParam, MatchFailure,
    ParamArity,
};
pub use generic::{ConversionDecl, GenericParent, GenericTypeDef, TypeParamDef, Variance};
pub use query::Conversion;
pub use resolver::{ParamRelation, TypeParamsResolver};
pub use substitution::SubstitutionMap;
pub use type_id::{TypeId, TypeIdVec};
pub use typeset::{TypeSet, TypeSetVec};
