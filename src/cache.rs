//! Process-wide holder for the opened geo database.
//!
//! Opening the database means reading and parsing a multi-megabyte file,
//! possibly from a remote mount, so it must happen once per process and not
//! once per row. [`DatabaseCache::ensure`] gives that guarantee under any
//! number of concurrent callers:
//!
//! - at most one caller opens the database at a time; the others block until
//!   the handle is published and then share it,
//! - a handle is published only after it is fully constructed,
//! - a failed open leaves the cache empty, so a later call can try again.
//!
//! The first successfully opened path wins for the lifetime of the cache.
//! Later calls naming a different path still get the original handle; the
//! database is never reloaded.

use std::time::Instant;

use camino::{Utf8Path, Utf8PathBuf};
use once_cell::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::config::DatabasePath;
use crate::database::{GeoDatabase, MaxMindDatabase};
use crate::error::Result;

/// The cache used by [`crate::ip_to_geo`] and the scalar functions.
///
/// Lives for the whole process and is never torn down.
pub static GEO_DATABASE: DatabaseCache<MaxMindDatabase> = DatabaseCache::new();

/// An opened database together with the path it was opened from.
#[derive(Debug)]
pub struct Handle<D> {
    path: Utf8PathBuf,
    database: D,
}

impl<D> Handle<D> {
    /// The database file this handle was opened from.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn database(&self) -> &D {
        &self.database
    }
}

/// Lazily opened, shared, read-only database handle.
#[derive(Debug)]
pub struct DatabaseCache<D> {
    slot: OnceCell<Handle<D>>,
}

impl<D> Default for DatabaseCache<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> DatabaseCache<D> {
    pub const fn new() -> Self {
        Self {
            slot: OnceCell::new(),
        }
    }

    /// The handle, if one has been opened.
    pub fn get(&self) -> Option<&Handle<D>> {
        self.slot.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.slot.get().is_some()
    }
}

impl<D: GeoDatabase> DatabaseCache<D> {
    /// Return the shared handle, opening the database at `path` if no handle
    /// exists yet.
    ///
    /// Once a handle exists this is a single atomic load. On an open failure
    /// the error is returned and nothing is cached.
    pub fn ensure(&self, path: &DatabasePath) -> Result<&Handle<D>> {
        if let Some(handle) = self.slot.get() {
            check_path(handle, path);
            return Ok(handle);
        }

        let handle = self.slot.get_or_try_init(|| {
            let file = path.file();
            let started = Instant::now();
            match D::open(&file) {
                Ok(database) => {
                    info!(path = %file, elapsed = ?started.elapsed(), "opened geo database");
                    Ok(Handle {
                        path: file,
                        database,
                    })
                }
                Err(err) => {
                    warn!(path = %file, error = %err, "failed to open geo database");
                    Err(err)
                }
            }
        })?;
        // A racing caller may have published a handle for another path while
        // we waited.
        check_path(handle, path);
        Ok(handle)
    }
}

fn check_path<D>(handle: &Handle<D>, requested: &DatabasePath) {
    if tracing::enabled!(tracing::Level::DEBUG) {
        let requested = requested.file();
        if requested != handle.path {
            debug!(
                loaded = %handle.path,
                requested = %requested,
                "geo database already loaded from another path; keeping it"
            );
        }
    }
}
