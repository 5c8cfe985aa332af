//! # assetstore
//!
//! Durable string key/value store backing the icon asset cache.
//!
//! ## Properties
//! - Append-only data file, replayed into memory on open
//! - Synchronous reads served from the in-memory index
//! - No eviction, no expiry, no capacity bound
//! - Torn trailing writes are discarded on open

#![warn(missing_docs)]

mod durable;
mod error;
mod memory;
mod parser;
mod storage;

pub use durable::DurableStore;
pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use storage::{AssetStore, DATA_FILE};
