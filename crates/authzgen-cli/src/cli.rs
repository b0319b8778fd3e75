use std::path::{Path, PathBuf};

use clap::Parser;

/// Output location that streams the artifact to stdout.
pub const STDOUT_MARKER: &str = "-";

#[derive(Debug, Parser)]
#[command(
    name = "authzgen",
    version,
    about = "Generate typed authorization bindings from a schema"
)]
pub struct Cli {
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Schema file, or directory of `.zed` files.
    #[arg(short, long = "schema")]
    pub schema: Option<PathBuf>,

    /// Output directory, or `-` for stdout.
    #[arg(short, long = "output")]
    pub output: Option<PathBuf>,

    /// Package used when the first definition has no prefix.
    #[arg(short, long)]
    pub package: Option<String>,

    /// Compile without writing anything.
    #[arg(long)]
    pub check: bool,

    #[arg(value_name = "SCHEMA")]
    pub schema_arg: Option<PathBuf>,

    #[arg(value_name = "OUTPUT_DIR")]
    pub output_arg: Option<PathBuf>,
}

impl Cli {
    /// `--schema`, else the first positional argument.
    pub fn schema_path(&self) -> Option<&Path> {
        self.schema.as_deref().or(self.schema_arg.as_deref())
    }

    /// Second positional argument, else `--output`.
    pub fn output_dir(&self) -> Option<&Path> {
        self.output_arg.as_deref().or(self.output.as_deref())
    }
}

pub fn is_stdout(path: &Path) -> bool {
    path.as_os_str() == STDOUT_MARKER
}
