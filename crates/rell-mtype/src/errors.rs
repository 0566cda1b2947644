// errors.rs
//
// Errors raised by the type model. `ModelError` is a declaration bug in the library
// (reported once, at conversion); `BoundViolation` is input-dependent and becomes a
// user diagnostic.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("duplicate type parameter '{name}'")]
    DuplicateTypeParam { name: String },

    #[error("bounds of type parameter '{param}' reference '{dependency}', which is not declared before it")]
    ForwardBoundReference { param: String, dependency: String },

    #[error("parameter #{index} cannot follow a {previous} parameter")]
    ArityOrder {
        index: usize,
        previous: &'static str,
    },

    #[error("wrong number of type arguments for type '{name}': {actual} instead of {expected}")]
    WrongTypeArgCount {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("type '{name}' cannot be its own supertype")]
    CyclicParent { name: String },
}

/// A type argument outside the bounds of its parameter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Type parameter '{param}' of type '{type_name}' does not allow '{arg}'")]
pub struct BoundViolation {
    pub type_name: String,
    pub param: String,
    pub bounds: String,
    pub arg: String,
}

impl BoundViolation {
    pub fn code(&self) -> String {
        format!(
            "param_bounds:{}:{}:{}:{}",
            self.type_name, self.param, self.bounds, self.arg
        )
    }
}
