//! Key/value persistence for Codex.
//!
//! This crate provides the synchronous `KeyStore` interface the progress
//! engine reads from, an in-memory implementation and a JSON file backend.

#![warn(missing_docs)]

pub mod trait_;
pub mod notify;
pub mod memory;
pub mod json_storage;
pub mod json;

pub use trait_::{KeyStore, StorageError, Result};
pub use notify::{ChangeNotifier, Listener};
pub use memory::MemoryStore;
pub use json_storage::JsonFileStore;
pub use json::{read_json_or_default, write_json};
