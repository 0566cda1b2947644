// errors.rs
//! Library call resolution errors (E4xxx).
//!
//! Every variant also renders the legacy string code used by the Rell test suites
//! (`LibError::code`), e.g. `expr_call_argtypes:[f]:boolean`.

#![allow(unused_assignments)] // False positives from thiserror derive

use std::fmt;

use miette::{Diagnostic, SourceSpan};
use rell_lmodel::{DeclError, DeclarationKind};
use rell_mtype::BoundViolation;
use thiserror::Error;

/// `, use 'X' instead` suffix of a deprecation message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UseInstead(pub Option<String>);

impl fmt::Display for UseInstead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(name) => write!(f, ", use '{name}' instead"),
            None => Ok(()),
        }
    }
}

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum LibError {
    #[error("Function '{function}' undefined for arguments ({})", .arg_types.join(", "))]
    #[diagnostic(code(E4001))]
    NoMatchingCase {
        function: String,
        arg_types: Vec<String>,
        #[label("no matching overload")]
        span: SourceSpan,
    },

    #[error("Failed to infer type arguments for function '{function}': [{}]", .params.join(", "))]
    #[diagnostic(
        code(E4002),
        help("specify the expected type, or pass arguments that mention every type parameter")
    )]
    UnresolvedTypeParams {
        function: String,
        params: Vec<String>,
        #[label("type arguments unknown")]
        span: SourceSpan,
    },

    #[error("Return type is unknown for function '{function}'")]
    #[diagnostic(code(E4003))]
    NoResultType {
        function: String,
        #[label("result type unknown")]
        span: SourceSpan,
    },

    #[error("{violation}")]
    #[diagnostic(code(E4004))]
    BoundViolation {
        violation: BoundViolation,
        #[label("bound violated")]
        span: SourceSpan,
    },

    #[error("Partial application not supported for function '{function}'")]
    #[diagnostic(code(E4005))]
    PartialNotSupported {
        function: String,
        #[label("cannot be used as a function value")]
        span: SourceSpan,
    },

    #[error("Cannot determine which variant of function '{function}' to use")]
    #[diagnostic(code(E4006), help("candidates: {candidates}"))]
    PartialAmbiguous {
        function: String,
        candidates: String,
        #[label("ambiguous function value")]
        span: SourceSpan,
    },

    #[error("Partial application not supported for function {case}")]
    #[diagnostic(code(E4007))]
    PartialBadCase {
        case: String,
        #[label("cannot be used as a function value")]
        span: SourceSpan,
    },

    #[error(
        "Wrong argument type for parameter {index} of function '{function}': {actual} instead of {expected}"
    )]
    #[diagnostic(code(E4008))]
    PartialArgType {
        function: String,
        index: usize,
        expected: String,
        actual: String,
        #[label("wrong argument type")]
        span: SourceSpan,
    },

    #[error("{kind} '{name}' is deprecated{use_instead}")]
    #[diagnostic(code(E4009))]
    Deprecated {
        kind: DeclarationKind,
        name: String,
        use_instead: UseInstead,
        #[label("deprecated")]
        span: SourceSpan,
    },

    #[error("Wrong number of type arguments for type '{name}': {actual} instead of {expected}")]
    #[diagnostic(code(E4010))]
    WrongTypeArgCount {
        name: String,
        expected: usize,
        actual: usize,
        #[label("wrong number of type arguments")]
        span: SourceSpan,
    },

    #[error("Type '{name}' is not generic")]
    #[diagnostic(code(E4011))]
    NotGeneric {
        name: String,
        #[label("takes no type arguments")]
        span: SourceSpan,
    },

    #[error("Type arguments not specified for generic type '{name}'")]
    #[diagnostic(code(E4012))]
    NoTypeArgs {
        name: String,
        #[label("type arguments missing")]
        span: SourceSpan,
    },

    #[error("Wrong number of arguments for function '{function}': {actual} instead of {expected}")]
    #[diagnostic(code(E4013))]
    WrongArgCount {
        function: String,
        expected: String,
        actual: usize,
        #[label("wrong number of arguments")]
        span: SourceSpan,
    },

    #[error("Function '{function}' has no parameter '{arg}'")]
    #[diagnostic(code(E4014))]
    UnknownNamedArg {
        function: String,
        arg: String,
        #[label("unknown parameter")]
        span: SourceSpan,
    },

    #[error("Parameter '{arg}' specified more than once")]
    #[diagnostic(code(E4015))]
    DuplicateNamedArg {
        function: String,
        arg: String,
        #[label("already specified")]
        span: SourceSpan,
    },

    #[error("Variadic parameter '{arg}' of function '{function}' cannot be passed by name")]
    #[diagnostic(code(E4016))]
    NamedVariadicArg {
        function: String,
        arg: String,
        #[label("passed by name")]
        span: SourceSpan,
    },

    #[error("Unnamed argument #{index} follows a named argument")]
    #[diagnostic(code(E4017), help("move positional arguments before named ones"))]
    PositionalAfterNamed {
        function: String,
        index: usize,
        #[label("positional argument")]
        span: SourceSpan,
    },

    #[error("Argument '{arg}' of function '{function}' is not specified")]
    #[diagnostic(code(E4018))]
    MissingArg {
        function: String,
        arg: String,
        #[label("missing argument")]
        span: SourceSpan,
    },

    #[error(
        "Wrong argument type for parameter {index} of function '{function}': {actual} instead of {expected}"
    )]
    #[diagnostic(code(E4019))]
    ArgType {
        function: String,
        index: usize,
        expected: String,
        actual: String,
        #[label("wrong argument type")]
        span: SourceSpan,
    },

    #[error("Named arguments cannot be used in a partial application of function '{function}'")]
    #[diagnostic(code(E4020))]
    PartialNamedArg {
        function: String,
        #[label("named argument")]
        span: SourceSpan,
    },

    #[error("Unknown name: '{name}'")]
    #[diagnostic(code(E4021))]
    UnknownName {
        name: String,
        #[label("not found")]
        span: SourceSpan,
    },

    #[error("Type '{type_name}' has no member function '{name}'")]
    #[diagnostic(code(E4022))]
    UnknownMember {
        type_name: String,
        name: String,
        #[label("unknown member")]
        span: SourceSpan,
    },

    #[error("'{name}' is not a function")]
    #[diagnostic(code(E4023))]
    NotAFunction {
        name: String,
        #[label("cannot be called")]
        span: SourceSpan,
    },

    #[error("Type '{name}' has no constructor")]
    #[diagnostic(code(E4024))]
    NoConstructor {
        name: String,
        #[label("cannot be constructed")]
        span: SourceSpan,
    },
}

impl LibError {
    /// The legacy string code of the diagnostic.
    pub fn code(&self) -> String {
        match self {
            LibError::NoMatchingCase {
                function,
                arg_types,
                ..
            } => format!("expr_call_argtypes:[{function}]:{}", arg_types.join(",")),
            LibError::UnresolvedTypeParams {
                function, params, ..
            } => format!("fn:sys:unresolved_type_params:{function}:{}", params.join(",")),
            LibError::NoResultType { function, .. } => format!("fn:sys:no_res_type:{function}"),
            LibError::BoundViolation { violation, .. } => violation.code(),
            LibError::PartialNotSupported { function, .. } => {
                format!("expr:call:partial_not_supported:[{function}]")
            }
            LibError::PartialAmbiguous { function, .. } => {
                format!("expr:call:partial_ambiguous:[{function}]")
            }
            LibError::PartialBadCase { case, .. } => format!("expr:call:partial_bad_case:[{case}]"),
            LibError::PartialArgType {
                function,
                index,
                expected,
                actual,
                ..
            } => format!("expr:call:partial_arg_type:[{function}]:{index}:{expected}:{actual}"),
            LibError::Deprecated {
                kind,
                name,
                use_instead,
                ..
            } => match &use_instead.0 {
                Some(replacement) => format!("deprecated:{}:[{name}]:{replacement}", kind.code()),
                None => format!("deprecated:{}:[{name}]", kind.code()),
            },
            LibError::WrongTypeArgCount {
                name,
                expected,
                actual,
                ..
            } => format!("type:generic:wrong_arg_count:{name}:{expected}:{actual}"),
            LibError::NotGeneric { name, .. } => format!("type:not_generic:{name}"),
            LibError::NoTypeArgs { name, .. } => format!("type:generic:no_args:{name}"),
            LibError::WrongArgCount {
                function,
                expected,
                actual,
                ..
            } => format!("fn:sys:arg_count:{function}:{expected}:{actual}"),
            LibError::UnknownNamedArg { function, arg, .. } => {
                format!("expr:call:unknown_named_arg:[{function}]:{arg}")
            }
            LibError::DuplicateNamedArg { function, arg, .. } => {
                format!("expr:call:named_arg_dup:[{function}]:{arg}")
            }
            LibError::NamedVariadicArg { function, arg, .. } => {
                format!("expr:call:named_arg_variadic:[{function}]:{arg}")
            }
            LibError::PositionalAfterNamed {
                function, index, ..
            } => format!("expr:call:positional_after_named:[{function}]:{index}"),
            LibError::MissingArg { function, arg, .. } => {
                format!("expr:call:missing_arg:[{function}]:{arg}")
            }
            LibError::ArgType {
                function,
                index,
                expected,
                actual,
                ..
            } => format!("expr_call_argtype:[{function}]:{index}:{expected}:{actual}"),
            LibError::PartialNamedArg { function, .. } => {
                format!("expr:call:partial_named_arg:[{function}]")
            }
            LibError::UnknownName { name, .. } => format!("unknown_name:{name}"),
            LibError::UnknownMember {
                type_name, name, ..
            } => format!("unknown_member:[{type_name}]:{name}"),
            LibError::NotAFunction { name, .. } => format!("expr_call_nofn:{name}"),
            LibError::NoConstructor { name, .. } => format!("expr:call:no_constructor:{name}"),
        }
    }
}

/// A defect in library declarations, found while building the registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("extension '{name}' is already registered")]
    DuplicateExtension { name: String },

    #[error("alias '{alias}' of type '{type_name}' does not point to a member")]
    BadAlias { type_name: String, alias: String },

    #[error(transparent)]
    Decl(#[from] DeclError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> SourceSpan {
        (0, 1).into()
    }

    #[test]
    fn no_match_code_lists_argument_types() {
        let error = LibError::NoMatchingCase {
            function: "f".to_string(),
            arg_types: vec!["boolean".to_string(), "text".to_string()],
            span: span(),
        };
        assert_eq!(error.code(), "expr_call_argtypes:[f]:boolean,text");
        assert_eq!(error.to_string(), "Function 'f' undefined for arguments (boolean, text)");
    }

    #[test]
    fn unresolved_params_message_uses_brackets() {
        let error = LibError::UnresolvedTypeParams {
            function: "empty".to_string(),
            params: vec!["K".to_string(), "V".to_string()],
            span: span(),
        };
        assert_eq!(error.code(), "fn:sys:unresolved_type_params:empty:K,V");
        assert_eq!(
            error.to_string(),
            "Failed to infer type arguments for function 'empty': [K, V]"
        );
    }

    #[test]
    fn deprecation_with_and_without_replacement() {
        let plain = LibError::Deprecated {
            kind: DeclarationKind::Function,
            name: "old".to_string(),
            use_instead: UseInstead(None),
            span: span(),
        };
        assert_eq!(plain.code(), "deprecated:FUNCTION:[old]");
        assert_eq!(plain.to_string(), "Function 'old' is deprecated");

        let replaced = LibError::Deprecated {
            kind: DeclarationKind::Type,
            name: "old_t".to_string(),
            use_instead: UseInstead(Some("new_t".to_string())),
            span: span(),
        };
        assert_eq!(replaced.code(), "deprecated:TYPE:[old_t]:new_t");
        assert_eq!(replaced.to_string(), "Type 'old_t' is deprecated, use 'new_t' instead");
    }

    #[test]
    fn bound_violation_keeps_model_code() {
        let error = LibError::BoundViolation {
            violation: BoundViolation {
                type_name: "set".to_string(),
                param: "T".to_string(),
                bounds: "-comparable".to_string(),
                arg: "list<integer>".to_string(),
            },
            span: span(),
        };
        assert_eq!(error.code(), "param_bounds:set:T:-comparable:list<integer>");
    }
}
