//! Value types flowing through a merge.

use crate::error::{MergeCause, PdfBatchError};

/// One source PDF plus its ordering key and display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEntry {
    /// Display name, possibly empty.
    pub name: String,
    /// Position of the entry in its batch.
    pub sequence: i64,
    /// Raw PDF bytes. Empty content is skipped by the merge.
    pub content: Vec<u8>,
}

impl InputEntry {
    /// Create an entry.
    pub fn new(name: impl Into<String>, sequence: i64, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            sequence,
            content,
        }
    }

    /// Check if the entry carries no content.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Build the batch-level error for a failure on this entry.
    pub fn failure(&self, cause: MergeCause) -> PdfBatchError {
        PdfBatchError::merge_failed(self.name.clone(), self.sequence, cause)
    }
}

/// Entries in their final merge order.
///
/// The order is whatever the producer pushed; the merge never re-sorts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedEntrySet {
    entries: Vec<InputEntry>,
}

impl OrderedEntrySet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry after all existing ones.
    pub fn push(&mut self, entry: InputEntry) {
        self.entries.push(entry);
    }

    /// Number of entries, including empty ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the set has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in merge order.
    pub fn iter(&self) -> std::slice::Iter<'_, InputEntry> {
        self.entries.iter()
    }
}

impl FromIterator<InputEntry> for OrderedEntrySet {
    fn from_iter<I: IntoIterator<Item = InputEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for OrderedEntrySet {
    type Item = InputEntry;
    type IntoIter = std::vec::IntoIter<InputEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a OrderedEntrySet {
    type Item = &'a InputEntry;
    type IntoIter = std::slice::Iter<'a, InputEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// The single output artifact of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedDocument {
    /// Output filename.
    pub filename: String,
    /// Serialized PDF.
    pub content: Vec<u8>,
}

impl MergedDocument {
    /// Create a merged document.
    pub fn new(filename: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content,
        }
    }

    /// Size of the serialized PDF in bytes.
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}
