//! Test utilities for creating, growing, truncating and rotating temporary log files.

#[cfg(test)]
use std::fs::{File, OpenOptions};
#[cfg(test)]
use std::io::Write;
#[cfg(test)]
use std::path::{Path, PathBuf};

#[cfg(test)]
pub struct TempLogFile {
    pub path: PathBuf,
    _temp_dir: tempfile::TempDir,
}

#[cfg(test)]
impl TempLogFile {
    /// Create a new, empty temporary log file for testing
    pub fn new() -> std::io::Result<Self> {
        let log = Self::missing()?;
        File::create(&log.path)?;
        Ok(log)
    }

    /// A path inside a fresh temp dir where no file exists yet
    pub fn missing() -> std::io::Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join("test.log");

        Ok(Self {
            path,
            _temp_dir: temp_dir,
        })
    }

    /// Create a temporary log file whose content is `content` plus a newline
    pub fn with_content(content: &str) -> std::io::Result<Self> {
        let temp_file = Self::new()?;
        temp_file.append_content(content)?;
        Ok(temp_file)
    }

    /// Append `content` followed by a newline
    pub fn append_content(&self, content: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;

        writeln!(file, "{}", content)?;
        file.flush()?;
        Ok(())
    }

    /// Append raw bytes, without adding a terminator
    pub fn append_raw(&self, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(())
    }

    /// Truncate the file in place, keeping its identity
    pub fn truncate(&self) -> std::io::Result<()> {
        File::create(&self.path)?;
        Ok(())
    }

    /// Truncate in place, then write `bytes`
    pub fn rewrite(&self, bytes: &[u8]) -> std::io::Result<()> {
        self.truncate()?;
        self.append_raw(bytes)
    }

    /// Replace the file with a new one holding `content` (log rotation)
    pub fn rotate(&self, content: &str) -> std::io::Result<()> {
        let replacement = self.path.with_extension("log.new");
        std::fs::write(&replacement, content)?;
        std::fs::rename(&replacement, &self.path)
    }

    /// Get the path to the temporary file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_log_file_creation() {
        let temp_file = TempLogFile::new().unwrap();
        assert!(temp_file.path().exists());
    }

    #[test]
    fn test_missing_has_no_file() {
        let temp_file = TempLogFile::missing().unwrap();
        assert!(!temp_file.path().exists());
    }

    #[test]
    fn test_append_content_and_raw() {
        let temp_file = TempLogFile::with_content("line 1").unwrap();
        temp_file.append_raw(b"line 2\r\n").unwrap();

        let content = std::fs::read(temp_file.path()).unwrap();
        assert_eq!(content, b"line 1\nline 2\r\n");
    }

    #[test]
    fn test_rewrite() {
        let temp_file = TempLogFile::with_content("initial content").unwrap();
        temp_file.rewrite(b"new").unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert_eq!(content, "new");
    }

    #[test]
    fn test_rotate_replaces_content() {
        let temp_file = TempLogFile::with_content("old").unwrap();
        temp_file.rotate("new\n").unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert_eq!(content, "new\n");
        assert!(!temp_file.path().with_extension("log.new").exists());
    }
}
