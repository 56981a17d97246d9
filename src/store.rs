use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use strum_macros::{Display, EnumIter};
use thiserror::Error as ThisError;

pub const IMAGE_DIR: &str = "images";

/// One append-only flat file per entity type. The `Display` form is the file name inside the
/// data directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Table {
    #[strum(serialize = "stitched_dresses.txt")]
    StitchedDresses,
    #[strum(serialize = "unstitched_dresses.txt")]
    UnstitchedDresses,
    #[strum(serialize = "customers.txt")]
    Customers,
    #[strum(serialize = "orders.txt")]
    Orders,
}

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("Failed to open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("Failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("Failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// The Store owns every record file under a data directory. All access goes through
/// [`InnerStore::lock`], which takes a single process-wide lock: reads and writes on any table are
/// fully serialized, and a caller holding the guard can check and then append without another
/// connection slipping in between.
///
/// The store is cheap to clone; clones share the same lock.
#[derive(Clone)]
pub struct Store {
    inner: Arc<InnerStore>,
}

impl Store {
    /// Opens (and creates, if needed) the data directory and its image folder.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Store, Error> {
        let root = data_dir.into();
        let images = root.join(IMAGE_DIR);
        fs::create_dir_all(&images).map_err(|source| Error::Open {
            path: images,
            source,
        })?;

        let inner = Arc::new(InnerStore {
            data_dir: root.clone(),
            files: Mutex::new(Files { root }),
        });

        Ok(Self { inner })
    }
}

impl Deref for Store {
    type Target = InnerStore;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub struct InnerStore {
    data_dir: PathBuf,
    files: Mutex<Files>,
}

impl InnerStore {
    pub fn lock(&self) -> StoreLocked<'_> {
        // The files on disk are the only state, a panic in another holder leaves nothing
        // half-updated in memory.
        let files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        StoreLocked { files }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

struct Files {
    root: PathBuf,
}

impl Files {
    fn path(&self, table: Table) -> PathBuf {
        self.root.join(table.to_string())
    }
}

pub struct StoreLocked<'a> {
    files: MutexGuard<'a, Files>,
}

impl<'a> StoreLocked<'a> {
    pub fn append(&mut self, table: Table, line: &str) -> Result<(), Error> {
        let path = self.files.path(table);

        let mut file = match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => file,
            Err(source) => return Err(Error::Open { path, source }),
        };

        writeln!(file, "{}", line)
            .and_then(|_| file.flush())
            .map_err(|source| Error::Write { path, source })
    }

    /// Returns every non-empty line, top to bottom. A missing file is an empty table.
    pub fn read_all(&self, table: Table) -> Result<Vec<String>, Error> {
        let mut lines = Vec::new();
        self.scan(table, |line| {
            lines.push(line.to_string());
            false
        })?;
        Ok(lines)
    }

    pub fn count_non_empty_lines(&self, table: Table) -> Result<usize, Error> {
        let mut count = 0;
        self.scan(table, |_| {
            count += 1;
            false
        })?;
        Ok(count)
    }

    pub fn is_id_unique(&self, id: i64, table: Table) -> Result<bool, Error> {
        Ok(self.find_by_id(id, table)?.is_none())
    }

    pub fn find_by_id(&self, id: i64, table: Table) -> Result<Option<String>, Error> {
        let mut found = None;
        self.scan(table, |line| {
            if leading_id(line) == Some(id) {
                found = Some(line.to_string());
                return true;
            }
            false
        })?;
        Ok(found)
    }

    /// Looks up the record and reads its third field, the actual price in the dress layout.
    pub fn get_field_price(&self, id: i64, table: Table) -> Result<Option<f64>, Error> {
        let price = self.find_by_id(id, table)?.and_then(|line| {
            line.split_whitespace()
                .nth(2)
                .and_then(|price| price.parse::<f64>().ok())
        });
        Ok(price)
    }

    /// Writes an image, replacing any previous image with the same name.
    pub fn save_image(&mut self, name: &str, data: &[u8]) -> Result<PathBuf, Error> {
        let dir = self.files.root.join(IMAGE_DIR);
        fs::create_dir_all(&dir).map_err(|source| Error::Open {
            path: dir.clone(),
            source,
        })?;

        let path = dir.join(name);
        match fs::write(&path, data) {
            Ok(()) => Ok(path),
            Err(source) => Err(Error::Write { path, source }),
        }
    }

    // Feeds non-empty lines to `visit` until it returns true or the file ends.
    fn scan<F>(&self, table: Table, mut visit: F) -> Result<(), Error>
    where
        F: FnMut(&str) -> bool,
    {
        let path = self.files.path(table);

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(source) => return Err(Error::Open { path, source }),
        };

        for line in BufReader::new(file).lines() {
            let line = line.map_err(|source| Error::Read {
                path: path.clone(),
                source,
            })?;

            if line.trim().is_empty() {
                continue;
            }

            if visit(&line) {
                break;
            }
        }

        Ok(())
    }
}

fn leading_id(line: &str) -> Option<i64> {
    line.split_whitespace().next()?.parse().ok()
}
