//! Port definitions (interfaces)
//!
//! Ports define the boundary between the managers and the persistence
//! collaborator. The collaborator is the source of truth: every write
//! returns the full updated entity, and callers replace their cached copy
//! wholesale with the returned value. Each port is a trait implemented by
//! an adapter in the infrastructure layer.

mod account;
mod catalog;
mod clock;
mod preferences;

pub use account::AccountRepository;
pub use catalog::CatalogRepository;
pub use clock::Clock;
pub use preferences::PreferenceRepository;
