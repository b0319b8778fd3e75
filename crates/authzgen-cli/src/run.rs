use std::path::PathBuf;

use authzgen_core::{Artifact, ArtifactWriter, CompileError, Compiler};

use crate::cli::{Cli, is_stdout};
use crate::config::AppConfig;
use crate::error::CliError;
use crate::input::read_schema;
use crate::output::{FsWriter, StdoutWriter};

/// Where the artifact ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    File(PathBuf),
    Stdout,
    /// `--check`: nothing written.
    Skipped,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub artifact: Artifact,
    pub destination: Destination,
}

/// Reads the schema, compiles it and writes the artifact.
pub fn run(cli: &Cli, config: &AppConfig) -> Result<RunOutcome, CliError> {
    let schema_path = cli.schema_path().ok_or(CliError::MissingSchema)?;

    let mut config = config.clone();
    if let Some(package) = &cli.package {
        config.codegen.default_package = package.clone();
        config.validate()?;
    }

    let source = read_schema(schema_path)?;
    tracing::info!(
        path = %schema_path.display(),
        files = source.files.len(),
        bytes = source.text.len(),
        "schema read"
    );

    let compiler = Compiler::new(config.to_compile_options());

    if cli.check {
        let artifact = compiler.compile(&source.text)?;
        log_compiled(&artifact);
        return Ok(RunOutcome {
            artifact,
            destination: Destination::Skipped,
        });
    }

    let output_dir = cli
        .output_dir()
        .map(PathBuf::from)
        .unwrap_or_else(|| config.codegen.output_dir.clone());

    if is_stdout(&output_dir) {
        let artifact = compile_with(&compiler, &source.text, &StdoutWriter, |_| {
            PathBuf::from(crate::cli::STDOUT_MARKER)
        })?;
        return Ok(RunOutcome {
            artifact,
            destination: Destination::Stdout,
        });
    }

    let writer = FsWriter::new(output_dir);
    let artifact = compile_with(&compiler, &source.text, &writer, |file_name| {
        writer.artifact_path(file_name)
    })?;
    let path = writer.artifact_path(&artifact.file_name);
    tracing::info!(path = %path.display(), "artifact written");

    Ok(RunOutcome {
        artifact,
        destination: Destination::File(path),
    })
}

fn compile_with<W: ArtifactWriter>(
    compiler: &Compiler,
    source: &str,
    writer: &W,
    artifact_path: impl Fn(&str) -> PathBuf,
) -> Result<Artifact, CliError> {
    match compiler.compile_to(source, writer) {
        Ok(artifact) => {
            log_compiled(&artifact);
            Ok(artifact)
        }
        Err(CompileError::Write { file_name, source }) => Err(CliError::WriteArtifact {
            path: artifact_path(&file_name),
            source,
        }),
        Err(err) => Err(err.into()),
    }
}

fn log_compiled(artifact: &Artifact) {
    tracing::info!(
        package = %artifact.package,
        definitions = artifact.definition_count,
        tokens = artifact.token_count,
        "compile finished"
    );
    if let Some(err) = &artifact.format_error {
        tracing::warn!(error = %err, "formatter rejected generated source, emitting unformatted output");
    }
}
