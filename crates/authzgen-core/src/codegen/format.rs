/// The rendered text did not parse as a Rust file and was left unformatted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to format generated source at {line}:{column}: {message}")]
pub struct FormatError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// Pretty-prints Rust source text.
pub fn format_source(source: &str) -> Result<String, FormatError> {
    let file = syn::parse_file(source).map_err(|err| {
        let start = err.span().start();
        FormatError {
            message: err.to_string(),
            line: start.line,
            // proc-macro2 columns are 0-based.
            column: start.column + 1,
        }
    })?;
    Ok(prettyplease::unparse(&file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_valid_source() {
        let formatted = format_source("pub struct User { id : String }").unwrap();

        assert_eq!(formatted, "pub struct User {\n    id: String,\n}\n");
    }

    #[test]
    fn invalid_source_reports_position() {
        let err = format_source("pub struct {\n").unwrap_err();

        assert_eq!(err.line, 1);
        assert!(err.column > 1);
        let msg = err.to_string();
        assert!(msg.starts_with("failed to format generated source at 1:"));
    }

    #[test]
    fn formatting_is_idempotent() {
        let once = format_source("fn a() -> u8 { 1 } fn b() {}").unwrap();
        let twice = format_source(&once).unwrap();

        assert_eq!(once, twice);
    }
}
