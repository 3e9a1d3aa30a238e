//! hostdir-store — alias/record store for hostdir.
//!
//! Holds an insertion-ordered table of host records, each a variable-length
//! list of string fields:
//!
//! ```text
//! host, timestamp, alias1, alias2, ...
//! ```
//!
//! # Architecture
//!
//! The in-memory table is authoritative while the process runs. Every
//! mutation rewrites the whole backing CSV file before it reports success;
//! the file is only read once, when the store is opened.
//!
//! Lookups are a linear scan over every field of every record, so host
//! identifiers and aliases share one namespace. This is sized for a
//! personal alias directory, not a hashed index.
//!
//! The `RecordStore` is `Clone` + `Send` + `Sync` (backed by an `Arc`) and can
//! be shared across async tasks.

pub mod error;
mod persist;
pub mod record;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use record::Record;
pub use store::{RecordStore, StoreOptions};
