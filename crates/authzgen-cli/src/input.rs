use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CliError;

pub const SCHEMA_EXTENSION: &str = "zed";

/// Schema text together with the files it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSource {
    pub text: String,
    pub files: Vec<PathBuf>,
}

/// Reads a schema file, or every `.zed` file directly inside a directory.
///
/// Directory entries are read in file-name order and joined with a newline.
pub fn read_schema(path: &Path) -> Result<SchemaSource, CliError> {
    let read_err = |source| CliError::ReadSchema {
        path: path.to_path_buf(),
        source,
    };

    let metadata = fs::metadata(path).map_err(read_err)?;
    if !metadata.is_dir() {
        let text = fs::read_to_string(path).map_err(read_err)?;
        return Ok(SchemaSource {
            text,
            files: vec![path.to_path_buf()],
        });
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(path).map_err(read_err)? {
        let entry_path = entry.map_err(read_err)?.path();
        if entry_path.is_file()
            && entry_path.extension().is_some_and(|ext| ext == SCHEMA_EXTENSION)
        {
            files.push(entry_path);
        }
    }
    if files.is_empty() {
        return Err(CliError::NoSchemaFiles {
            path: path.to_path_buf(),
        });
    }
    files.sort();

    let mut parts = Vec::with_capacity(files.len());
    for file in &files {
        let text = fs::read_to_string(file).map_err(|source| CliError::ReadSchema {
            path: file.clone(),
            source,
        })?;
        parts.push(text);
    }

    Ok(SchemaSource {
        text: parts.join("\n"),
        files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.zed");
        fs::write(&path, "definition user {}").unwrap();

        let source = read_schema(&path).unwrap();

        assert_eq!(source.text, "definition user {}");
        assert_eq!(source.files, vec![path]);
    }

    #[test]
    fn file_extension_is_not_checked_for_single_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.txt");
        fs::write(&path, "definition user {}").unwrap();

        assert!(read_schema(&path).is_ok());
    }

    #[test]
    fn directory_files_are_joined_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.zed"), "definition b {}").unwrap();
        fs::write(dir.path().join("a.zed"), "definition a {}").unwrap();
        fs::write(dir.path().join("notes.md"), "ignored").unwrap();
        fs::create_dir(dir.path().join("nested.zed")).unwrap();

        let source = read_schema(dir.path()).unwrap();

        assert_eq!(source.text, "definition a {}\ndefinition b {}");
        assert_eq!(source.files.len(), 2);
    }

    #[test]
    fn directory_without_schemas_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("readme.md"), "nothing here").unwrap();

        let err = read_schema(dir.path()).unwrap_err();

        assert!(matches!(err, CliError::NoSchemaFiles { ref path } if path == dir.path()));
    }

    #[test]
    fn missing_path_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.zed");

        let err = read_schema(&path).unwrap_err();

        assert!(matches!(err, CliError::ReadSchema { path: ref p, .. } if *p == path));
    }
}
