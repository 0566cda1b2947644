// diagnostics.rs
//
// The diagnostic sink resolution reports into. Resolution never fails outright: each
// failed call site adds exactly one diagnostic here and yields an error-typed result.

use rell_identity::Span;

use crate::errors::LibError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub span: Span,
    pub error: LibError,
}

impl Diagnostic {
    /// Legacy string code (`expr_call_argtypes:[f]:boolean`).
    pub fn code(&self) -> String {
        self.error.code()
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, error: LibError, span: Span) {
        self.add(Severity::Error, error, span);
    }

    pub fn add_warning(&mut self, error: LibError, span: Span) {
        self.add(Severity::Warning, error, span);
    }

    pub fn add(&mut self, severity: Severity, error: LibError, span: Span) {
        tracing::debug!(code = %error.code(), ?severity, "diagnostic");
        self.items.push(Diagnostic {
            severity,
            span,
            error,
        });
    }

    pub fn items(&self) -> &[Diagnostic] {
        &self.items
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| !d.is_error())
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Codes of all diagnostics in report order.
    pub fn codes(&self) -> Vec<String> {
        self.items.iter().map(Diagnostic::code).collect()
    }

    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severities_are_kept_apart() {
        let mut diagnostics = Diagnostics::new();
        let span = Span::new(3, 7, 1, 4);
        diagnostics.add_warning(
            LibError::NotGeneric {
                name: "integer".to_string(),
                span: span.into(),
            },
            span,
        );
        diagnostics.add_error(
            LibError::NoTypeArgs {
                name: "list".to_string(),
                span: span.into(),
            },
            span,
        );

        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.warnings().count(), 1);
        assert_eq!(
            diagnostics.codes(),
            vec!["type:not_generic:integer", "type:generic:no_args:list"]
        );
        assert_eq!(diagnostics.items()[1].message(), "Type arguments not specified for generic type 'list'");

        let taken = diagnostics.take();
        assert_eq!(taken.len(), 2);
        assert!(diagnostics.is_empty());
    }
}
