//! Uploaded files as seen by the file predicates
//!
//! The decoder that produced the record owns the multipart parsing; the engine
//! only needs the declared size and a way to read the bytes back.

use std::fmt;
use std::io;
use std::path::PathBuf;

use bytes::Bytes;

/// Where an upload's content lives.
#[derive(Clone)]
enum Source {
    Memory(Bytes),
    Disk(PathBuf),
}

/// A file attached to a record, e.g. one part of a multipart form.
///
/// Cloning is cheap: in-memory content is reference counted.
///
/// # Examples
///
/// ```rust,ignore
/// use nebula_rules::FileUpload;
///
/// let avatar = FileUpload::in_memory("avatar.png", png_bytes);
/// assert_eq!(avatar.size(), png_bytes.len() as u64);
/// ```
#[derive(Clone)]
pub struct FileUpload {
    name: String,
    size: u64,
    source: Source,
}

impl FileUpload {
    /// Creates an upload whose content is held in memory.
    ///
    /// The declared size is the content length.
    pub fn in_memory(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            size: content.len() as u64,
            source: Source::Memory(content),
        }
    }

    /// Creates an upload spooled to disk, with the size declared by the sender.
    pub fn on_disk(name: impl Into<String>, path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            source: Source::Disk(path.into()),
        }
    }

    /// The client-supplied file name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Reads the full content.
    pub async fn read(&self) -> io::Result<Bytes> {
        match &self.source {
            Source::Memory(content) => Ok(content.clone()),
            Source::Disk(path) => tokio::fs::read(path).await.map(Bytes::from),
        }
    }
}

impl fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = match &self.source {
            Source::Memory(_) => "memory".to_owned(),
            Source::Disk(path) => path.display().to_string(),
        };
        f.debug_struct("FileUpload")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("source", &location)
            .finish()
    }
}
