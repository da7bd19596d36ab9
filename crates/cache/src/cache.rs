use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use exn::ResultExt;
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};
use zip::ZipArchive;

use crate::error::{ErrorKind, Result};
use crate::path::validate_entry_name;
use crate::table::Table;

/// Cache directory used when none is configured, relative to the working
/// directory.
pub const DEFAULT_CACHE_PATH: &str = "extraction_cache";
const STAGING_PREFIX: &str = ".toucan-cache-";

/// Tables keyed by archive entry name.
pub type Tables = BTreeMap<String, Table>;

/// Lazily populated cache of one small app's extracted tables.
///
/// All mutation goes through `&mut self`. The directory itself is not
/// locked; see the [crate-level notes](crate#concurrency) for what happens
/// when several processes share it.
#[derive(Debug)]
pub struct ExtractionCache {
    root: PathBuf,
    tables: Option<Tables>,
}

impl Default for ExtractionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_PATH)
    }
}

impl ExtractionCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), tables: None }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether tables are held in memory.
    pub fn is_loaded(&self) -> bool {
        self.tables.is_some()
    }

    pub fn exists_on_disk(&self) -> bool {
        self.root.exists()
    }

    /// The in-memory tables, without touching disk or network.
    pub fn tables(&self) -> Option<&Tables> {
        self.tables.as_ref()
    }

    /// Returns the tables from memory, then disk, then `fetch`.
    ///
    /// `fetch` runs at most once and only when the cache directory does not
    /// exist. Its error is kept as the child of a [`Fetch`](ErrorKind::Fetch)
    /// error.
    #[instrument(level = "debug", skip(self, fetch), fields(root = %self.root.display()))]
    pub fn load<F>(&mut self, fetch: F) -> Result<&Tables>
    where
        F: FnOnce() -> toucan_dispatch::error::Result<Vec<u8>>,
    {
        let tables = match self.tables.take() {
            Some(tables) => tables,
            None if self.exists_on_disk() => {
                info!("loading extraction cache from disk");
                self.read_cache()?
            },
            None => {
                info!("extraction cache is cold, fetching archive");
                let archive = fetch().or_raise(|| ErrorKind::Fetch)?;
                self.unpack(&archive)?
            },
        };
        Ok(self.tables.insert(tables))
    }

    /// Persists every file entry of `archive` under the cache root, reads
    /// them back, and keeps the result in memory.
    #[instrument(level = "debug", skip(self, archive), fields(root = %self.root.display(), bytes = archive.len()))]
    pub fn populate(&mut self, archive: &[u8]) -> Result<&Tables> {
        let tables = self.unpack(archive)?;
        Ok(self.tables.insert(tables))
    }

    /// Reads one table per regular file directly under the cache root.
    /// Hidden files are skipped.
    pub fn read_cache(&self) -> Result<Tables> {
        let persist_error = || ErrorKind::CachePersist(self.root.clone());
        let mut tables = Tables::new();
        for entry in fs::read_dir(&self.root).or_raise(persist_error)? {
            let entry = entry.or_raise(persist_error)?;
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                warn!(path = %entry.path().display(), "skipping cache file with a non UTF-8 name");
                continue;
            };
            if name.starts_with('.') || !entry.file_type().or_raise(persist_error)?.is_file() {
                continue;
            }
            let table = Table::read(entry.path())?;
            debug!(table = %name, rows = table.num_rows(), "read cached table");
            tables.insert(name, table);
        }
        Ok(tables)
    }

    /// Forgets the in-memory tables. The cache directory is kept, so the
    /// next [`load`](Self::load) reads it again without fetching.
    pub fn invalidate(&mut self) {
        self.tables = None;
    }

    /// Forgets the in-memory tables and deletes the cache directory.
    pub fn purge(&mut self) -> Result<()> {
        self.tables = None;
        if self.exists_on_disk() {
            fs::remove_dir_all(&self.root).or_raise(|| ErrorKind::CachePersist(self.root.clone()))?;
            info!(root = %self.root.display(), "purged extraction cache");
        }
        Ok(())
    }

    fn unpack(&self, archive: &[u8]) -> Result<Tables> {
        let entries = read_archive(archive)?;
        match self.exists_on_disk() {
            true => write_entries(&self.root, &entries)?,
            false => self.stage(&entries)?,
        }
        let mut tables = Tables::new();
        for (name, _) in entries {
            let table = Table::read(self.root.join(&name))?;
            debug!(table = %name, rows = table.num_rows(), "read cached table");
            tables.insert(name, table);
        }
        Ok(tables)
    }

    /// Writes a fresh cache next to the root and renames it into place, so
    /// other readers see either no directory or every entry.
    fn stage(&self, entries: &[(String, Vec<u8>)]) -> Result<()> {
        let parent = match self.root.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).or_raise(|| ErrorKind::CachePersist(parent.to_path_buf()))?;
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(parent)
            .or_raise(|| ErrorKind::CachePersist(parent.to_path_buf()))?;
        write_entries(staging.path(), entries)?;
        match fs::rename(staging.path(), &self.root) {
            Ok(()) => Ok(()),
            Err(err) if self.exists_on_disk() => {
                warn!(root = %self.root.display(), error = %err, "cache directory appeared while staging, writing entries in place");
                write_entries(&self.root, entries)
            },
            Err(err) => Err(err).or_raise(|| ErrorKind::CachePersist(self.root.clone())),
        }
    }
}

fn read_archive(archive: &[u8]) -> Result<Vec<(String, Vec<u8>)>> {
    let mut archive = ZipArchive::new(Cursor::new(archive)).or_raise(|| ErrorKind::ArchiveDecode)?;
    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut file = archive.by_index(index).or_raise(|| ErrorKind::ArchiveDecode)?;
        if file.is_dir() {
            continue;
        }
        let name = validate_entry_name(file.name())?.to_string();
        let mut content = Vec::new();
        file.read_to_end(&mut content).or_raise(|| ErrorKind::ArchiveDecode)?;
        entries.push((name, content));
    }
    Ok(entries)
}

/// Each entry goes through its own temporary file and rename, so a failure
/// leaves the entries already written intact.
fn write_entries(dir: &Path, entries: &[(String, Vec<u8>)]) -> Result<()> {
    for (name, content) in entries {
        let destination = dir.join(name);
        let persist_error = || ErrorKind::CachePersist(destination.clone());
        let mut file = NamedTempFile::new_in(dir).or_raise(persist_error)?;
        file.write_all(content).or_raise(persist_error)?;
        file.persist(&destination).or_raise(persist_error)?;
        debug!(path = %destination.display(), bytes = content.len(), "wrote cache entry");
    }
    Ok(())
}
