//! Record store implementations.
//!
//! - [`MemoryStore`]: tables in process memory, for tests and embedding
//! - [`JsonStore`]: one JSON file per table in a directory

pub mod json;
pub mod memory;

pub use json::JsonStore;
pub use memory::MemoryStore;
