use std::io;
use std::path::PathBuf;

use authzgen_core::CompileError;

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("no schema file given (use --schema <path> or pass it as the first argument)")]
    MissingSchema,

    #[error("failed to read schema '{}': {source}", path.display())]
    ReadSchema {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no .zed schema files found in directory '{}'", path.display())]
    NoSchemaFiles { path: PathBuf },

    #[error("failed to write artifact '{}': {source}", path.display())]
    WriteArtifact {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to generate code: {0}")]
    Compile(#[from] CompileError),
}

impl CliError {
    /// Usage errors exit with 2, everything else with 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::MissingSchema => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_schema_is_a_usage_error() {
        assert_eq!(CliError::MissingSchema.exit_code(), 2);
        assert_eq!(
            CliError::NoSchemaFiles {
                path: PathBuf::from("schemas")
            }
            .exit_code(),
            1
        );
    }

    #[test]
    fn read_error_names_the_path() {
        let err = CliError::ReadSchema {
            path: PathBuf::from("missing.zed"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };

        assert_eq!(
            err.to_string(),
            "failed to read schema 'missing.zed': no such file"
        );
    }

    #[test]
    fn compile_error_keeps_stage_message() {
        let compile_err =
            authzgen_core::compile("definition foo", &Default::default()).unwrap_err();
        let err: CliError = compile_err.into();

        let msg = err.to_string();
        assert!(
            msg.starts_with("failed to generate code: syntax error: "),
            "unexpected message: {msg}"
        );
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn config_error_converts() {
        let err: CliError = ConfigError::Validation("bad".to_string()).into();

        assert_eq!(
            err.to_string(),
            "configuration error: config validation failed: bad"
        );
    }
}
