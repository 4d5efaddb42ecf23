//! Output directory layout
//!
//! ```text
//! <root>/
//!   publish_files/   lookUpTable_<mode>.csv, books_<mode>.jsonl.zst, index.json
//!   books/           books_<mode>.jsonl (uncompressed staging copy)
//!   verification.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BookError, Result};

/// Index file name inside the publish directory
pub const INDEX_FILE: &str = "index.json";

/// Verification report file name inside the root
pub const VERIFICATION_FILE: &str = "verification.json";

/// Publish and staging directories for one generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
    publish_dir: PathBuf,
    books_dir: PathBuf,
}

impl OutputLayout {
    /// Standard layout under `root`
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            publish_dir: root.join("publish_files"),
            books_dir: root.join("books"),
            root,
        }
    }

    /// Create both directories (idempotent)
    pub fn ensure(&self) -> Result<()> {
        for dir in [&self.publish_dir, &self.books_dir] {
            fs::create_dir_all(dir).map_err(BookError::at(dir))?;
        }
        Ok(())
    }

    pub fn publish_dir(&self) -> &Path {
        &self.publish_dir
    }

    pub fn books_dir(&self) -> &Path {
        &self.books_dir
    }

    /// Lookup table file name for a mode
    pub fn table_file(mode_name: &str) -> String {
        format!("lookUpTable_{}.csv", mode_name)
    }

    /// Uncompressed book file name for a mode
    pub fn book_file(mode_name: &str) -> String {
        format!("books_{}.jsonl", mode_name)
    }

    /// Compressed book file name for a mode
    pub fn compressed_book_file(mode_name: &str, extension: &str) -> String {
        format!("{}{}", Self::book_file(mode_name), extension)
    }

    pub fn table_path(&self, mode_name: &str) -> PathBuf {
        self.publish_dir.join(Self::table_file(mode_name))
    }

    pub fn staging_book_path(&self, mode_name: &str) -> PathBuf {
        self.books_dir.join(Self::book_file(mode_name))
    }

    pub fn compressed_book_path(&self, mode_name: &str, extension: &str) -> PathBuf {
        self.publish_dir
            .join(Self::compressed_book_file(mode_name, extension))
    }

    pub fn index_path(&self) -> PathBuf {
        self.publish_dir.join(INDEX_FILE)
    }

    pub fn verification_path(&self) -> PathBuf {
        self.root.join(VERIFICATION_FILE)
    }
}
