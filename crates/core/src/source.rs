//! Where raw recordings and bead metadata come from.
//!
//! The viewer never reads files directly; it goes through [`SeriesArchive`]
//! for recordings and [`MetadataSource`] for the bead table, so that an
//! unpacked upload folder, a single CSV, or any other backing store can be
//! plugged in.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source '{0}' not found")]
    NotFound(String),
    #[error("cannot fetch metadata from {location}: {reason}")]
    FetchFailed { location: String, reason: String },
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("cannot list archive: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A collection of raw recording CSVs addressed by member name.
pub trait SeriesArchive {
    /// Member names ending in `.csv`, sorted.
    fn list_csv_members(&self) -> Result<Vec<String>, SourceError>;

    /// Raw bytes of one member.
    fn open_member(&self, name: &str) -> Result<Vec<u8>, SourceError>;
}

/// Supplies the bead metadata table as CSV bytes.
pub trait MetadataSource {
    /// Human-readable location for messages.
    fn location(&self) -> String;

    fn fetch(&self) -> Result<Vec<u8>, SourceError>;
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn read(path: &Path, member: &str) -> Result<Vec<u8>, SourceError> {
    std::fs::read(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => SourceError::NotFound(member.to_string()),
        _ => SourceError::Io {
            path: path.display().to_string(),
            source,
        },
    })
}

/// A directory of CSVs, e.g. an extracted upload. Member names are
/// `/`-separated paths relative to the root.
#[derive(Debug, Clone)]
pub struct DirArchive {
    root: PathBuf,
}

impl DirArchive {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(SourceError::NotFound(root.display().to_string()));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn member_path(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        safe.then(|| self.root.join(relative))
    }
}

impl SeriesArchive for DirArchive {
    fn list_csv_members(&self) -> Result<Vec<String>, SourceError> {
        let mut members = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() || !is_csv(entry.path()) {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let name: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            members.push(name.join("/"));
        }
        members.sort();
        Ok(members)
    }

    fn open_member(&self, name: &str) -> Result<Vec<u8>, SourceError> {
        let path = self
            .member_path(name)
            .ok_or_else(|| SourceError::NotFound(name.to_string()))?;
        read(&path, name)
    }
}

/// A lone CSV, exposed as a one-member archive named by its file name.
#[derive(Debug, Clone)]
pub struct SingleFile {
    path: PathBuf,
    name: String,
}

impl SingleFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }
}

impl SeriesArchive for SingleFile {
    fn list_csv_members(&self) -> Result<Vec<String>, SourceError> {
        if self.path.is_file() && is_csv(&self.path) {
            Ok(vec![self.name.clone()])
        } else {
            Ok(Vec::new())
        }
    }

    fn open_member(&self, name: &str) -> Result<Vec<u8>, SourceError> {
        if name != self.name {
            return Err(SourceError::NotFound(name.to_string()));
        }
        read(&self.path, name)
    }
}

/// Open a directory as [`DirArchive`] or a file as [`SingleFile`].
pub fn open_archive(path: &Path) -> Result<Box<dyn SeriesArchive>, SourceError> {
    if path.is_dir() {
        Ok(Box::new(DirArchive::open(path)?))
    } else if path.is_file() {
        Ok(Box::new(SingleFile::new(path)))
    } else {
        Err(SourceError::NotFound(path.display().to_string()))
    }
}

/// Metadata read from a local CSV file.
#[derive(Debug, Clone)]
pub struct FileMetadata {
    path: PathBuf,
}

impl FileMetadata {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MetadataSource for FileMetadata {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<Vec<u8>, SourceError> {
        std::fs::read(&self.path).map_err(|e| SourceError::FetchFailed {
            location: self.location(),
            reason: e.to_string(),
        })
    }
}
