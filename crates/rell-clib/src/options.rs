// options.rs

/// Compiler switches that affect library resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompilerOptions {
    /// Report every use of a deprecated declaration as an error
    pub deprecated_error: bool,
}

impl CompilerOptions {
    pub const ENV_DEPRECATED_ERROR: &'static str = "RELL_DEPRECATED_ERROR";

    /// Defaults, overridden by `RELL_DEPRECATED_ERROR=1|true`.
    pub fn from_env() -> Self {
        let deprecated_error = std::env::var(Self::ENV_DEPRECATED_ERROR)
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        Self { deprecated_error }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_values() {
        assert!(parse_flag("1"));
        assert!(parse_flag(" TRUE "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn default_reports_warnings() {
        assert!(!CompilerOptions::default().deprecated_error);
    }
}
