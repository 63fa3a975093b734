//! Classpath resolution and combined class byte lookup.
//!
//! Only directory entries are scanned for reference classes, but every entry,
//! archives included, takes part in the lookup, in configured order.

use memmap2::Mmap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::{Error, Result};

pub const DEFAULT_DELIMITER: char = ',';

/// A local directory of compiled classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClasspathRoot(PathBuf);

impl ClasspathRoot {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// The configured classpath, every entry made absolute, in configured order.
#[derive(Debug, Clone)]
pub struct Classpath {
    entries: Vec<PathBuf>,
}

/// Splits a delimited classpath string. Trailing empty pieces are dropped so that
/// `a,b,` means `a,b`; any other blank piece is kept and rejected by [`resolve`].
pub fn split_classpath(raw: &str, delimiter: char) -> Vec<String> {
    let mut pieces: Vec<String> = raw.split(delimiter).map(|s| s.trim().to_string()).collect();
    while pieces.last().is_some_and(|s| s.is_empty()) {
        pieces.pop();
    }
    pieces
}

pub fn resolve(raw_entries: &[String]) -> Result<Classpath> {
    if raw_entries.is_empty() {
        return Err(Error::Config("no classpath entries configured".to_string()));
    }

    let mut entries = Vec::with_capacity(raw_entries.len());
    for (idx, raw) in raw_entries.iter().enumerate() {
        entries.push(to_absolute(raw).map_err(|reason| {
            Error::Config(format!("classpath entry {} ({raw:?}) {reason}", idx + 1))
        })?);
    }
    Ok(Classpath { entries })
}

fn to_absolute(raw: &str) -> std::result::Result<PathBuf, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("is empty".to_string());
    }
    if trimmed.contains('\0') {
        return Err("contains a NUL byte".to_string());
    }
    std::path::absolute(trimmed).map_err(|e| format!("cannot be made absolute: {e}"))
}

impl Classpath {
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Entries that are local directories. Archives and missing paths are dropped
    /// without complaint: they may be dependencies that hold no classes of interest.
    pub fn local_roots(&self) -> Vec<ClasspathRoot> {
        self.entries
            .iter()
            .filter(|p| p.is_dir())
            .map(|p| ClasspathRoot(p.clone()))
            .collect()
    }
}

/// Reads class bytes by resource path. Never loads or runs anything.
pub trait ClassResolver: Sync {
    /// `resource` is a `/`-separated path relative to an entry, exactly as it was
    /// found on disk, e.g. `org/apache/cassandra/Klass.class`. `Ok(None)` when no
    /// entry has it.
    fn resolve(&self, resource: &str) -> std::io::Result<Option<Vec<u8>>>;
}

enum Source {
    Directory(PathBuf),
    Archive {
        path: PathBuf,
        archive: Mutex<ZipArchive<Cursor<Mmap>>>,
    },
}

/// Lookup over every classpath entry; the first entry holding a name wins.
///
/// Opened archives stay mapped until this value is dropped.
pub struct ClasspathLookup {
    sources: Vec<Source>,
}

impl ClasspathLookup {
    pub fn open(classpath: &Classpath) -> Self {
        let mut sources = Vec::with_capacity(classpath.entries.len());
        for entry in classpath.entries() {
            if entry.is_dir() {
                sources.push(Source::Directory(entry.clone()));
            } else if entry.is_file() {
                match open_archive(entry) {
                    Ok(archive) => sources.push(Source::Archive {
                        path: entry.clone(),
                        archive: Mutex::new(archive),
                    }),
                    Err(e) => tracing::warn!("ignoring classpath archive {}: {}", entry.display(), e),
                }
            } else {
                tracing::debug!("ignoring missing classpath entry {}", entry.display());
            }
        }
        Self { sources }
    }
}

fn open_archive(path: &Path) -> std::io::Result<ZipArchive<Cursor<Mmap>>> {
    let file = File::open(path)?;
    // SAFETY: The file is opened read-only and nothing writes classpath archives
    // while a run is in progress.
    let mmap = unsafe { Mmap::map(&file)? };
    ZipArchive::new(Cursor::new(mmap)).map_err(std::io::Error::other)
}

impl ClassResolver for ClasspathLookup {
    fn resolve(&self, resource: &str) -> std::io::Result<Option<Vec<u8>>> {
        for source in &self.sources {
            match source {
                Source::Directory(dir) => match std::fs::read(dir.join(resource)) {
                    Ok(bytes) => return Ok(Some(bytes)),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e),
                },
                Source::Archive { path, archive } => {
                    let mut archive = archive.lock().map_err(|_| {
                        std::io::Error::other(format!("archive lock poisoned: {}", path.display()))
                    })?;
                    match archive.by_name(resource) {
                        Ok(mut file) => {
                            let mut bytes = Vec::with_capacity(file.size() as usize);
                            file.read_to_end(&mut bytes)?;
                            return Ok(Some(bytes));
                        }
                        Err(ZipError::FileNotFound) => {}
                        Err(e) => return Err(std::io::Error::other(e)),
                    }
                }
            }
        }
        Ok(None)
    }
}
