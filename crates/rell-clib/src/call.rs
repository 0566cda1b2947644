// call.rs
//
// Compiled call representation handed back to the expression compiler, and the
// context a match compiles in.

use rell_lmodel::{DeclarationKind, Deprecated, SysFunction};
use rell_mtype::{Conversion, TypeId};

use crate::args::CallSite;
use crate::diagnostics::Diagnostics;
use crate::errors::{LibError, UseInstead};
use crate::options::CompilerOptions;

/// The resolved callee of a call or function value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallTarget {
    pub full_name: String,
    /// Runtime implementation and, if any, its query-language counterpart
    pub body: SysFunction,
}

/// One actual argument as passed to the callee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveArg {
    /// Index in the call's argument list
    pub arg: usize,
    /// Index of the parameter it feeds
    pub param: usize,
    pub ty: TypeId,
    pub conversion: Conversion,
    pub lazy: bool,
}

/// An argument fixed by a partial application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundArg {
    pub arg: usize,
    pub param: usize,
    pub ty: TypeId,
    pub conversion: Conversion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompiledCall {
    Call {
        result_type: TypeId,
        target: CallTarget,
        args: Vec<EffectiveArg>,
        /// Parameters left to their default values
        defaults: Vec<usize>,
    },
    /// A function value: the wildcard parameters stay open.
    Partial {
        fn_type: TypeId,
        target: CallTarget,
        bound_args: Vec<BoundArg>,
        wildcard_params: Vec<usize>,
    },
    /// Resolution failed and a diagnostic was reported.
    Error { result_type: TypeId },
}

impl CompiledCall {
    pub fn error() -> Self {
        CompiledCall::Error {
            result_type: TypeId::ERROR,
        }
    }

    pub fn result_type(&self) -> TypeId {
        match self {
            CompiledCall::Call { result_type, .. } | CompiledCall::Error { result_type } => *result_type,
            CompiledCall::Partial { fn_type, .. } => *fn_type,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CompiledCall::Error { .. })
    }

    pub fn target(&self) -> Option<&CallTarget> {
        match self {
            CompiledCall::Call { target, .. } | CompiledCall::Partial { target, .. } => Some(target),
            CompiledCall::Error { .. } => None,
        }
    }
}

/// Where a match is compiled: the call site and the diagnostic sink.
pub struct CompileContext<'c> {
    pub diagnostics: &'c mut Diagnostics,
    pub options: &'c CompilerOptions,
    pub site: &'c CallSite,
}

impl CompileContext<'_> {
    pub fn error(&mut self, error: LibError) {
        self.diagnostics.add_error(error, self.site.span);
    }

    /// Report a use of a deprecated declaration, named as spelled at the call site.
    pub fn deprecated(&mut self, kind: DeclarationKind, deprecated: &Deprecated) {
        let name = self.site.spelling();
        report_deprecated(self.diagnostics, self.options, kind, name, deprecated, self.site);
    }
}

pub(crate) fn report_deprecated(
    diagnostics: &mut Diagnostics,
    options: &CompilerOptions,
    kind: DeclarationKind,
    name: String,
    deprecated: &Deprecated,
    site: &CallSite,
) {
    let error = LibError::Deprecated {
        kind,
        name,
        use_instead: UseInstead(deprecated.use_instead.as_ref().map(|n| n.to_string())),
        span: site.span.into(),
    };
    if deprecated.error || options.deprecated_error {
        diagnostics.add_error(error, site.span);
    } else {
        diagnostics.add_warning(error, site.span);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;
    use rell_identity::{QualifiedName, Span};

    fn site(name: &str) -> CallSite {
        CallSite::new(QualifiedName::parse(name).unwrap(), Span::new(0, 4, 1, 1))
    }

    #[test]
    fn deprecation_severity_follows_options() {
        let site = site("old");
        let mut diagnostics = Diagnostics::new();
        let lenient = CompilerOptions::default();
        let strict = CompilerOptions {
            deprecated_error: true,
        };

        let mut ctx = CompileContext {
            diagnostics: &mut diagnostics,
            options: &lenient,
            site: &site,
        };
        ctx.deprecated(DeclarationKind::Function, &Deprecated::warning());
        ctx.deprecated(DeclarationKind::Function, &Deprecated::error());
        let mut ctx = CompileContext {
            diagnostics: &mut diagnostics,
            options: &strict,
            site: &site,
        };
        ctx.deprecated(DeclarationKind::Function, &Deprecated::warning().use_instead("new"));

        let severities: Vec<_> = diagnostics.items().iter().map(|d| d.severity).collect();
        assert_eq!(
            severities,
            vec![Severity::Warning, Severity::Error, Severity::Error]
        );
        assert_eq!(diagnostics.items()[2].code(), "deprecated:FUNCTION:[old]:new");
    }

    #[test]
    fn error_call_has_error_type() {
        let call = CompiledCall::error();
        assert!(call.is_error());
        assert!(call.result_type().is_error());
        assert!(call.target().is_none());
    }
}
