use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use authzgen_core::ArtifactWriter;
use tempfile::NamedTempFile;

/// Writes artifacts into a directory, creating it if needed.
///
/// Contents go to a temp file in the same directory which is then renamed
/// over the target, so readers never observe a partial artifact.
#[derive(Debug, Clone)]
pub struct FsWriter {
    dir: PathBuf,
}

impl FsWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn artifact_path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}

impl ArtifactWriter for FsWriter {
    fn write_artifact(&self, file_name: &str, contents: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.artifact_path(file_name))
            .map_err(|e| e.error)?;
        Ok(())
    }
}

/// Streams artifacts to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutWriter;

impl ArtifactWriter for StdoutWriter {
    fn write_artifact(&self, _file_name: &str, contents: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(contents.as_bytes())?;
        stdout.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_artifact_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let writer = FsWriter::new(dir.path());

        writer.write_artifact("authz.rs", "pub struct User;\n").unwrap();

        let written = fs::read_to_string(dir.path().join("authz.rs")).unwrap();
        assert_eq!(written, "pub struct User;\n");
    }

    #[test]
    fn artifact_path_is_inside_output_dir() {
        let writer = FsWriter::new("gen");

        assert_eq!(writer.artifact_path("authz.rs"), PathBuf::from("gen/authz.rs"));
    }

    #[test]
    fn creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("gen").join("authz");
        let writer = FsWriter::new(&out);

        writer.write_artifact("acl.rs", "// empty\n").unwrap();

        assert!(out.join("acl.rs").is_file());
    }

    #[test]
    fn replaces_existing_artifact_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let writer = FsWriter::new(dir.path());
        fs::write(dir.path().join("authz.rs"), "old contents that are longer").unwrap();

        writer.write_artifact("authz.rs", "new").unwrap();

        let replaced = fs::read_to_string(dir.path().join("authz.rs")).unwrap();
        assert_eq!(replaced, "new");
        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn output_dir_that_is_a_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not_a_dir");
        fs::write(&file, "").unwrap();

        let result = FsWriter::new(&file).write_artifact("authz.rs", "x");

        assert!(result.is_err());
    }
}
