//! PDF merging.
//!
//! - [`entry`]: the values a merge consumes and produces
//! - [`pages`]: structural page import into an output document
//! - [`engine`]: the ordered merge over an entry set

pub mod engine;
pub mod entry;
pub mod pages;

pub use engine::{MergeEngine, MergeOutcome, MergeStatistics};
pub use entry::{InputEntry, MergedDocument, OrderedEntrySet};
pub use pages::OutputDocument;
