//! Font file I/O.

use std::{
    fs::{create_dir_all, write},
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct FontFile {
    path: PathBuf,
}

impl FontFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `data`, replacing any existing file.
    pub fn write(&self, data: impl AsRef<[u8]>) -> Result<()> {
        write(&self.path, data).map_err(|source| io_error(&self.path, source))
    }

    pub fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            create_dir_all(parent).map_err(|source| io_error(parent, source))?;
        }
        Ok(())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io { path: path.to_path_buf(), source }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_write_requires_parent_dir() {
        let dir = TempDir::new().unwrap();
        let file = FontFile::new(dir.path().join("fonts/nested/icons.ttf"));
        assert!(matches!(file.write(b"data"), Err(Error::Io { .. })));

        file.ensure_parent_dir().unwrap();
        file.write(b"data").unwrap();
        assert_eq!(fs::read(file.path()).unwrap(), b"data");
    }

    #[test]
    fn test_write_overwrites() {
        let dir = TempDir::new().unwrap();
        let file = FontFile::new(dir.path().join("icons.woff"));
        file.write(b"old contents").unwrap();
        file.write(b"new").unwrap();
        assert_eq!(fs::read(file.path()).unwrap(), b"new");
    }

    #[test]
    fn test_write_failure_reports_path() {
        let file = FontFile::new("/nonexistent/fonts/icons.ttf");
        let err = file.write(b"data").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/fonts/icons.ttf"));
    }
}
