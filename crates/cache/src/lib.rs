//! On-disk extraction cache for small-app table exports.
//!
//! A small app can export every one of its tables in a single zip archive
//! (`GET <base>/sdk`). Each archive entry is one table serialised in the
//! Arrow IPC file format (Feather v2). This crate turns that archive into a
//! directory of per-table files and keeps the decoded tables in memory.
//!
//! # Lookup order
//! [`ExtractionCache::load`] resolves tables from, in order:
//! - memory, when a previous load already succeeded,
//! - the cache directory, when it exists (the network is never touched, even
//!   if the directory holds a stale or partial export),
//! - the fetch callback, whose archive is then persisted and read back.
//!
//! [`ExtractionCache::invalidate`] only forgets the in-memory tables, so the
//! next load goes back to disk. [`ExtractionCache::purge`] also removes the
//! directory.
//!
//! # Concurrency
//! The cache directory may be shared by several processes and is never
//! locked. A cold directory is written into a hidden sibling and renamed
//! into place, so readers see either no directory or a complete one. When
//! two processes populate the same cold directory, the first rename wins
//! and the other rewrites each entry in place with its own atomic rename.
//! Entries are never merged: the last writer of a given file wins.

mod cache;
pub mod error;
mod path;
pub mod table;

pub use crate::cache::{DEFAULT_CACHE_PATH, ExtractionCache, Tables};
pub use crate::path::validate_entry_name;
pub use crate::table::Table;
