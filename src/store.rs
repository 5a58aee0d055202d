use std::fmt;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;

use parking_lot::RwLock;
use tracing::info;

use crate::codec::{DEFAULT_DELIMITER, LineCodec};
use crate::error::Result;
use crate::skiplist::{
    DEFAULT_MAX_LEVEL, DeleteOutcome, InsertOutcome, LoadStats, SkipList,
};

/// Per-instance configuration for a [`Store`].
///
/// Everything the reference design kept as process-wide constants — the
/// mutex, the delimiter, the dump file path — is owned by the store.
#[derive(Debug, Clone)]
pub struct Options {
    /// Upper bound on skip list levels.
    pub max_level: usize,
    /// Record delimiter for the snapshot file.
    pub delimiter: char,
    /// Snapshot file used by [`Store::dump`] and [`Store::load`].
    pub path: PathBuf,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            max_level: DEFAULT_MAX_LEVEL,
            delimiter: DEFAULT_DELIMITER,
            path: PathBuf::from("store/dumpFile"),
        }
    }
}

/// A point-in-time view of the index shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    /// Number of entries.
    pub entries: usize,
    /// Highest level currently holding at least one node.
    pub level: usize,
    /// Configured level bound.
    pub max_level: usize,
}

/// Coarse-grained thread-safe wrapper around [`SkipList`].
///
/// One reader-writer lock guards the whole structure. Mutating
/// operations (`insert`, `delete`, `load`) hold the write lock for their
/// full duration — traversal included — and release it on every exit
/// path via guard scoping. Read operations (`get`, `contains`, `len`,
/// `stats`, `dump`) share the read lock, so readers never observe a
/// half-spliced forward array.
///
/// No timeouts, no cancellation: the lock is held only for pointer
/// chasing plus O(level) splicing, except during `dump`/`load`, which
/// perform file I/O under the lock.
pub struct Store<K, V> {
    list: RwLock<SkipList<K, V>>,
    codec: LineCodec,
    path: PathBuf,
}

impl<K: Ord, V> Store<K, V> {
    /// Create an empty store from configuration.
    pub fn new(options: Options) -> Self {
        Store {
            list: RwLock::new(SkipList::new(options.max_level)),
            codec: LineCodec::new(options.delimiter),
            path: options.path,
        }
    }

    /// Insert an entry. Duplicate keys leave the stored value untouched.
    pub fn insert(&self, key: K, value: V) -> InsertOutcome {
        self.list.write().insert(key, value)
    }

    /// Look up a key, returning a copy of the value.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.list.read().get(key).cloned()
    }

    /// Whether the key is present.
    pub fn contains(&self, key: &K) -> bool {
        self.list.read().contains_key(key)
    }

    /// Remove an entry.
    pub fn delete(&self, key: &K) -> DeleteOutcome {
        self.list.write().remove(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.list.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.list.read().is_empty()
    }

    /// Snapshot of the index shape.
    pub fn stats(&self) -> Stats {
        let list = self.list.read();
        Stats {
            entries: list.len(),
            level: list.level(),
            max_level: list.max_level(),
        }
    }

    /// Write a snapshot to the configured path, creating parent
    /// directories as needed.
    pub fn dump(&self) -> Result<()>
    where
        K: fmt::Display,
        V: fmt::Display,
    {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(&self.path)?;
        let mut sink = BufWriter::new(file);
        let entries = {
            let list = self.list.read();
            list.dump(&mut sink, &self.codec)?;
            list.len()
        };
        info!("dumped {} entries to {}", entries, self.path.display());
        Ok(())
    }

    /// Write a snapshot to an arbitrary sink under the read lock.
    pub fn dump_to<W: Write>(&self, sink: &mut W) -> Result<()>
    where
        K: fmt::Display,
        V: fmt::Display,
    {
        self.list.read().dump(sink, &self.codec)
    }

    /// Replay a snapshot from the configured path.
    pub fn load(&self) -> Result<LoadStats>
    where
        K: FromStr,
        V: FromStr,
    {
        let file = File::open(&self.path)?;
        let stats = self.load_from(BufReader::new(file))?;
        info!(
            "loaded {}: {} inserted, {} duplicates, {} skipped",
            self.path.display(),
            stats.inserted,
            stats.duplicates,
            stats.skipped
        );
        Ok(stats)
    }

    /// Replay records from an arbitrary source under the write lock.
    pub fn load_from<R: BufRead>(&self, source: R) -> Result<LoadStats>
    where
        K: FromStr,
        V: FromStr,
    {
        self.list.write().load(source, &self.codec)
    }
}
