// span.rs
//
// Source location span for diagnostics.

/// Source location of a call site or name reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Span {
    pub start: usize, // Byte offset
    pub end: usize,   // Byte offset (exclusive)
    pub line: u32,    // 1-indexed
    pub column: u32,  // 1-indexed
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: self.line,
            column: self.column,
        }
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        // miette uses (offset, length)
        (span.start, span.end.saturating_sub(span.start)).into()
    }
}

impl From<&Span> for miette::SourceSpan {
    fn from(span: &Span) -> Self {
        (*span).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_covers_both() {
        let a = Span::new(4, 8, 1, 5);
        let b = Span::new(10, 12, 1, 11);
        let m = a.merge(b);
        assert_eq!((m.start, m.end), (4, 12));
    }

    #[test]
    fn converts_to_source_span() {
        let s: miette::SourceSpan = Span::new(3, 7, 1, 4).into();
        assert_eq!(s.offset(), 3);
        assert_eq!(s.len(), 4);
    }
}
