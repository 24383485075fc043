//! Persistent memoization of kern-distance solves.
//!
//! The solver does a geometry search per glyph pair and is by far the most
//! expensive part of a compilation, so results are cached across runs.
//! Entries are never invalidated; the solver is assumed deterministic for a
//! given font state, so a stale cache file is the user's to delete.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;

use log::{debug, error};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::{GlyphName, KernSolver};

/// The exact input tuple of one solve. Value equality, no identity games.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KernKey {
    pub left: GlyphName,
    pub right: GlyphName,
    pub target_closeness: i32,
    pub height: i32,
    pub max_tuck: OrderedFloat<f64>,
}

impl KernKey {
    pub fn new(
        left: GlyphName,
        right: GlyphName,
        target_closeness: i32,
        height: i32,
        max_tuck: f64,
    ) -> Self {
        KernKey {
            left,
            right,
            target_closeness,
            height,
            max_tuck: OrderedFloat(max_tuck),
        }
    }
}

/// A key-value store over the solver, persisted to one bincode file.
///
/// Open once per compilation run. The store flushes on [`flush`] and again
/// on drop, so the file is written even when rule generation fails partway.
///
/// [`flush`]: KernCache::flush
pub struct KernCache {
    path: PathBuf,
    entries: HashMap<KernKey, i32>,
    dirty: bool,
    hits: u64,
    misses: u64,
}

impl KernCache {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let entries = match File::open(&path) {
            Ok(file) => bincode::deserialize_from(BufReader::new(file)).map_err(|source| {
                Error::CacheCodec {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(source) => {
                return Err(Error::CacheIo {
                    path: path.clone(),
                    source,
                })
            }
        };
        debug!("Opened kern cache {path:?}, {} entries", entries.len());
        Ok(KernCache {
            path,
            entries,
            dirty: false,
            hits: 0,
            misses: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the cached adjustment for `key`, calling `solver` only on a
    /// miss. A previously-seen key is never recomputed, within or across
    /// runs.
    pub fn lookup_or_compute(
        &mut self,
        key: KernKey,
        solver: &impl KernSolver,
    ) -> Result<i32, Error> {
        if let Some(value) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(*value);
        }
        self.misses += 1;
        let value = solver.solve(
            &key.left,
            &key.right,
            key.target_closeness,
            key.height,
            key.max_tuck.into_inner(),
        )?;
        self.entries.insert(key, value);
        self.dirty = true;
        Ok(value)
    }

    /// Write the store back to disk if anything changed this run.
    pub fn flush(&mut self) -> Result<(), Error> {
        if !self.dirty {
            return Ok(());
        }
        let file = File::create(&self.path).map_err(|source| Error::CacheIo {
            path: self.path.clone(),
            source,
        })?;
        bincode::serialize_into(BufWriter::new(file), &self.entries).map_err(|source| {
            Error::CacheCodec {
                path: self.path.clone(),
                source,
            }
        })?;
        self.dirty = false;
        debug!(
            "Flushed kern cache {:?}: {} entries ({} hits, {} misses this run)",
            self.path,
            self.entries.len(),
            self.hits,
            self.misses
        );
        Ok(())
    }
}

impl Drop for KernCache {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            error!("Failed to flush kern cache: {e}");
        }
    }
}
