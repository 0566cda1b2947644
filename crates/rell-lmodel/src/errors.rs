// errors.rs

use rell_mtype::ModelError;
use thiserror::Error;

/// Error in a library declaration, found while building the model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeclError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("alias '{alias}' in type '{type_name}' refers to unknown member '{target}'")]
    UnknownAliasTarget {
        type_name: String,
        alias: String,
        target: String,
    },

    #[error("constructor declared in extension '{name}'")]
    ConstructorInExtension { name: String },
}
