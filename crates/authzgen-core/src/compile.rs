use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::codegen::{self, FormatError, GenerateError};
use crate::model::{self, DEFAULT_PACKAGE};
use crate::schema::token::TokenKind;
use crate::schema::{
    self, ParseError, SchemaLimits, SemanticError, ValidationError, check_semantics,
    validate_schema_limits,
};

/// Extension of the generated artifact file.
pub const ARTIFACT_EXTENSION: &str = "rs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Package used when the first definition carries no prefix.
    pub default_package: String,
    pub limits: SchemaLimits,
    pub file_extension: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            default_package: DEFAULT_PACKAGE.to_string(),
            limits: SchemaLimits::default(),
            file_extension: ARTIFACT_EXTENSION.to_string(),
        }
    }
}

/// Generated output of one compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub package: String,
    /// `<package>.<extension>`, relative to the output location.
    pub file_name: String,
    pub source: String,
    /// The formatter rejected the rendered text; `source` is unformatted.
    pub format_error: Option<FormatError>,
    pub definition_count: usize,
    /// Tokens consumed, end of input excluded.
    pub token_count: usize,
}

/// Destination for generated artifacts.
pub trait ArtifactWriter {
    fn write_artifact(&self, file_name: &str, contents: &str) -> io::Result<()>;
}

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("syntax error: {0}")]
    Syntax(#[from] ParseError),

    #[error("semantic error: {0}")]
    Semantic(#[from] SemanticError),

    #[error("schema validation errors: {}", format_validation_errors(.0))]
    Limits(Vec<ValidationError>),

    #[error("generation failed: {0}")]
    Generate(#[from] GenerateError),

    #[error("compilation cancelled")]
    Cancelled,

    #[error("failed to write artifact '{file_name}': {source}")]
    Write {
        file_name: String,
        #[source]
        source: io::Error,
    },
}

impl From<Vec<ValidationError>> for CompileError {
    fn from(errors: Vec<ValidationError>) -> Self {
        CompileError::Limits(errors)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub struct Compiler {
    options: CompileOptions,
    cancel: Option<Arc<AtomicBool>>,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            cancel: None,
        }
    }

    /// Checks `flag` between stages; once it is set the compile stops with
    /// [`CompileError::Cancelled`].
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn compile(&self, source: &str) -> Result<Artifact, CompileError> {
        self.checkpoint()?;
        let tokens = schema::tokenize(source);
        let token_count = tokens.iter().filter(|t| !t.is(TokenKind::Eof)).count();

        self.checkpoint()?;
        let definitions = schema::parse(&tokens)?;

        self.checkpoint()?;
        check_semantics(&definitions)?;
        validate_schema_limits(&definitions, &self.options.limits)?;

        self.checkpoint()?;
        let model = model::extract(&definitions, &self.options.default_package);

        self.checkpoint()?;
        let generated = codegen::generate(&model)?;

        Ok(Artifact {
            file_name: format!("{}.{}", model.package, self.options.file_extension),
            package: model.package,
            source: generated.source,
            format_error: generated.format_error,
            definition_count: model.definitions.len(),
            token_count,
        })
    }

    /// Compiles and hands the artifact to `writer`. Nothing is written unless
    /// every stage succeeded.
    pub fn compile_to<W: ArtifactWriter + ?Sized>(
        &self,
        source: &str,
        writer: &W,
    ) -> Result<Artifact, CompileError> {
        let artifact = self.compile(source)?;
        self.checkpoint()?;
        writer
            .write_artifact(&artifact.file_name, &artifact.source)
            .map_err(|source| CompileError::Write {
                file_name: artifact.file_name.clone(),
                source,
            })?;
        Ok(artifact)
    }

    fn checkpoint(&self) -> Result<(), CompileError> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(CompileError::Cancelled),
            _ => Ok(()),
        }
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompileOptions::default())
    }
}

/// One-shot compile with `options`.
pub fn compile(source: &str, options: &CompileOptions) -> Result<Artifact, CompileError> {
    Compiler::new(options.clone()).compile(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct MemoryWriter {
        files: RefCell<Vec<(String, String)>>,
    }

    impl ArtifactWriter for MemoryWriter {
        fn write_artifact(&self, file_name: &str, contents: &str) -> io::Result<()> {
            self.files
                .borrow_mut()
                .push((file_name.to_string(), contents.to_string()));
            Ok(())
        }
    }

    struct FailingWriter;

    impl ArtifactWriter for FailingWriter {
        fn write_artifact(&self, _file_name: &str, _contents: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }
    }

    const SCHEMA: &str = r#"
        definition user {}

        definition document {
            relation owner: user
            relation viewer: user | group#member
            permission view = viewer + owner
        }
    "#;

    const MISSING_COLON: &str = "definition foo { relation r bar }";

    #[test]
    fn compile_produces_named_artifact() {
        let artifact = compile(SCHEMA, &CompileOptions::default()).unwrap();

        assert_eq!(artifact.package, "authz");
        assert_eq!(artifact.file_name, "authz.rs");
        assert_eq!(artifact.definition_count, 2);
        assert!(artifact.format_error.is_none());
        assert!(artifact.source.contains("pub struct Document"));
    }

    #[test]
    fn token_count_excludes_end_of_input() {
        let artifact = compile("definition user {}", &CompileOptions::default()).unwrap();

        assert_eq!(artifact.token_count, 4);
    }

    #[test]
    fn prefixed_schema_names_the_artifact() {
        let options = CompileOptions {
            file_extension: "gen.rs".to_string(),
            ..Default::default()
        };
        let artifact = compile("definition acme/user {}", &options).unwrap();

        assert_eq!(artifact.file_name, "acme.gen.rs");
    }

    #[test]
    fn custom_default_package_is_used() {
        let options = CompileOptions {
            default_package: "acl".to_string(),
            ..Default::default()
        };
        let artifact = compile("definition user {}", &options).unwrap();

        assert_eq!(artifact.package, "acl");
    }

    #[test]
    fn syntax_error_is_reported() {
        let err = compile("definition foo", &CompileOptions::default()).unwrap_err();

        assert!(matches!(err, CompileError::Syntax(ref e) if e.line() == 1));
        assert!(err.to_string().starts_with("syntax error: "));
    }

    #[test]
    fn semantic_error_is_reported() {
        let err = compile(
            "definition a {}\ndefinition a {}",
            &CompileOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(err, CompileError::Semantic(ref e) if e.line() == 2));
    }

    #[test]
    fn limit_errors_are_collected() {
        let options = CompileOptions {
            limits: SchemaLimits {
                max_definitions: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = compile(SCHEMA, &options).unwrap_err();

        assert!(matches!(err, CompileError::Limits(ref errors) if errors.len() == 1));
        let msg = err.to_string();
        assert!(msg.contains("too many definitions: 2 exceeds limit of 1"));
    }

    #[test]
    fn generate_error_is_reported() {
        let err = compile(
            "definition a/user {} definition b/user {}",
            &CompileOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            CompileError::Generate(GenerateError::DuplicateTypeName { .. })
        ));
    }

    #[test]
    fn compile_to_writes_once_on_success() {
        let writer = MemoryWriter::default();

        let artifact = Compiler::default().compile_to(SCHEMA, &writer).unwrap();

        let files = writer.files.borrow();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].0, "authz.rs");
        assert_eq!(files[0].1, artifact.source);
    }

    #[test]
    fn compile_to_writes_nothing_on_failure() {
        let writer = MemoryWriter::default();
        let compiler = Compiler::default();

        let result = compiler.compile_to(MISSING_COLON, &writer);

        assert!(result.is_err());
        assert!(writer.files.borrow().is_empty());
    }

    #[test]
    fn write_failure_names_the_file() {
        let err = Compiler::default()
            .compile_to(SCHEMA, &FailingWriter)
            .unwrap_err();

        assert!(
            matches!(err, CompileError::Write { ref file_name, .. } if file_name == "authz.rs")
        );
        assert!(err.to_string().contains("read-only"));
    }

    #[test]
    fn cancelled_compile_stops_before_any_stage() {
        let flag = Arc::new(AtomicBool::new(true));
        let writer = MemoryWriter::default();

        let err = Compiler::default()
            .with_cancel_flag(flag)
            .compile_to(SCHEMA, &writer)
            .unwrap_err();

        assert!(matches!(err, CompileError::Cancelled));
        assert!(writer.files.borrow().is_empty());
    }

    #[test]
    fn unset_cancel_flag_does_not_interfere() {
        let flag = Arc::new(AtomicBool::new(false));

        let compiler = Compiler::default().with_cancel_flag(Arc::clone(&flag));

        assert!(compiler.compile(SCHEMA).is_ok());
        flag.store(true, Ordering::Relaxed);
        assert!(matches!(compiler.compile(SCHEMA), Err(CompileError::Cancelled)));
    }
}
