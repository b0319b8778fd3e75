mod format;
mod helpers;
mod template;

pub use format::{FormatError, format_source};
pub use helpers::{camelcase, extract_type};
pub use template::render;

use crate::model::Schema;

/// First line of every generated file.
pub const GENERATED_HEADER: &str = "// Code generated by authzgen. DO NOT EDIT.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    #[error("schema name `{0}` does not produce a valid Rust identifier")]
    InvalidIdentifier(String),
    #[error("definition '{object_type}' generates type `{type_name}`, which is reserved")]
    ReservedTypeName {
        type_name: String,
        object_type: String,
    },
    #[error("definition '{object_type}' generates method `{method}` more than once")]
    DuplicateMethodName { object_type: String, method: String },
    #[error("definitions '{first}' and '{second}' both generate type `{type_name}`")]
    DuplicateTypeName {
        type_name: String,
        first: String,
        second: String,
    },
}

/// Output of the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub source: String,
    /// Set when formatting failed and `source` holds the unformatted text.
    pub format_error: Option<FormatError>,
}

pub fn generate(schema: &Schema) -> Result<Generated, GenerateError> {
    Ok(assemble(render(schema)?))
}

/// Formats rendered text and prepends the header. Falls back to the raw
/// text when formatting fails.
pub fn assemble(rendered: String) -> Generated {
    match format_source(&rendered) {
        Ok(formatted) => Generated {
            source: format!("{GENERATED_HEADER}\n\n{formatted}"),
            format_error: None,
        },
        Err(err) => Generated {
            source: format!("{GENERATED_HEADER}\n\n{rendered}\n"),
            format_error: Some(err),
        },
    }
}
