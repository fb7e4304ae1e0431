//! Souk Infrastructure - collaborator adapters
//!
//! Implementations of the `souk-application` ports:
//!
//! - [`MemoryStore`]: in-memory collaborator, the default mock backend.
//! - [`JsonFileStore`]: the same contract persisted to a JSON document.
//! - [`SystemClock`] / [`ManualClock`]: clock adapters.

pub mod adapters;
pub mod persistence;
pub mod serialization;

pub use adapters::{ManualClock, SystemClock};
pub use persistence::{Dataset, JsonFileStore, MemoryStore};
