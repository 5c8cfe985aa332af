//! Storage engine implementation
//!
//! File layout:
//! - `assets.store`: data file with header + append-only records
//!
//! The whole index lives in memory; the file is only read on open.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use ahash::RandomState;
use memmap2::Mmap;
use parking_lot::{Mutex, RwLock};

use crate::durable::DurableStore;
use crate::error::{Error, Result};
use crate::parser::{
    create_header, encode_record, parse_header, parse_records, FORMAT_VERSION, HEADER_LEN,
    STORE_MAGIC,
};

/// Name of the data file inside the store directory
pub const DATA_FILE: &str = "assets.store";

type Index = HashMap<String, String, RandomState>;

/// Data file plus the end of its last complete record
struct DataFile {
    file: File,
    end: u64,
}

impl DataFile {
    /// Append at the end of the last complete record. Bytes past it
    /// (a failed earlier append) are cut off first, and a failed write is
    /// rolled back, so a later record never lands behind garbage.
    fn append(&mut self, record: &[u8]) -> Result<()> {
        if self.file.metadata()?.len() != self.end {
            self.file.set_len(self.end)?;
        }
        self.file.seek(SeekFrom::Start(self.end))?;

        if let Err(e) = self.file.write_all(record) {
            let _ = self.file.set_len(self.end);
            return Err(e.into());
        }
        self.end += record.len() as u64;

        Ok(())
    }
}

/// AssetStore is the file-backed durable store handle
pub struct AssetStore {
    /// Path to the store directory
    path: PathBuf,

    /// Data file handle and its append offset
    data_file: Mutex<DataFile>,

    /// In-memory index: key -> latest value
    index: RwLock<Index>,

    /// Records appended to the data file, duplicates included
    record_count: RwLock<u32>,

    /// Is the store closed?
    closed: RwLock<bool>,
}

impl AssetStore {
    /// Open or create a store at the given directory
    ///
    /// # Arguments
    /// * `path` - Directory path for the store files
    ///
    /// # Returns
    /// * `Result<AssetStore>` - Store handle
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)?;

        let data_path = path.join(DATA_FILE);

        let (data_file, index, record_count) = if data_path.exists() {
            Self::open_existing(&data_path)?
        } else {
            Self::create_new(&data_path)?
        };

        Ok(AssetStore {
            path: path.to_path_buf(),
            data_file: Mutex::new(data_file),
            index: RwLock::new(index),
            record_count: RwLock::new(record_count),
            closed: RwLock::new(false),
        })
    }

    fn open_existing(data_path: &Path) -> Result<(DataFile, Index, u32)> {
        let data_file = OpenOptions::new().read(true).write(true).open(data_path)?;

        let file_len = data_file.metadata()?.len();
        if file_len < HEADER_LEN as u64 {
            return Err(Error::Parse("Data file shorter than header".to_string()));
        }

        // SAFETY: the store owns its directory; nothing else truncates the
        // file while the map is alive, and the map is dropped before any write.
        let mmap = unsafe { Mmap::map(&data_file)? };

        let header = parse_header(&mmap[..HEADER_LEN])?;
        if header.version != FORMAT_VERSION {
            return Err(Error::Parse(format!(
                "Unsupported store version {}",
                header.version
            )));
        }

        let (records, consumed) = parse_records(&mmap[HEADER_LEN..]);

        let mut index = Index::with_capacity_and_hasher(records.len(), RandomState::new());
        for record in &records {
            let key = std::str::from_utf8(record.key)
                .map_err(|_| Error::Utf8(String::from_utf8_lossy(record.key).into_owned()))?;
            let value = std::str::from_utf8(record.value)
                .map_err(|_| Error::Utf8(key.to_string()))?;
            index.insert(key.to_string(), value.to_string());
        }
        let record_count = records.len() as u32;
        drop(records);
        drop(mmap);

        // Drop a torn trailing record left by an interrupted append
        let valid_len = (HEADER_LEN + consumed) as u64;
        if valid_len < file_len {
            data_file.set_len(valid_len)?;
        }

        let data_file = DataFile {
            file: data_file,
            end: valid_len,
        };
        Ok((data_file, index, record_count))
    }

    fn create_new(data_path: &Path) -> Result<(DataFile, Index, u32)> {
        let mut data_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(data_path)?;

        data_file.write_all(&create_header(FORMAT_VERSION, 0))?;

        let data_file = DataFile {
            file: data_file,
            end: HEADER_LEN as u64,
        };
        Ok((data_file, Index::default(), 0))
    }

    /// Get the value stored under `key`
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        if *self.closed.read() {
            return Err(Error::Closed);
        }

        Ok(self.index.read().get(key).cloned())
    }

    /// Store `value` under `key`, appending a record to the data file
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        if *self.closed.read() {
            return Err(Error::Closed);
        }

        let record = encode_record(key.as_bytes(), value.as_bytes())?;

        self.data_file.lock().append(&record)?;

        self.index.write().insert(key.to_string(), value.to_string());
        *self.record_count.write() += 1;

        Ok(())
    }

    /// Check whether a value exists for `key`
    pub fn contains_key(&self, key: &str) -> Result<bool> {
        if *self.closed.read() {
            return Err(Error::Closed);
        }

        Ok(self.index.read().contains_key(key))
    }

    /// Get the number of distinct keys in the store
    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }

    /// Directory this store was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the store and fsync all changes
    pub fn close(&self) -> Result<()> {
        if *self.closed.read() {
            return Ok(());
        }

        let record_count = *self.record_count.read();

        let mut data_file = self.data_file.lock();
        let file = &mut data_file.file;
        file.seek(SeekFrom::Start(STORE_MAGIC.len() as u64 + 4))?;
        file.write_all(&record_count.to_le_bytes())?;
        file.sync_all()?;

        *self.closed.write() = true;

        Ok(())
    }
}

impl DurableStore for AssetStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        AssetStore::get(self, key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        AssetStore::set(self, key, value)
    }

    fn contains_key(&self, key: &str) -> Result<bool> {
        AssetStore::contains_key(self, key)
    }
}

impl Drop for AssetStore {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
