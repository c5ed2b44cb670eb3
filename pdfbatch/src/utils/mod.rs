//! Utilities for path collection, atomic writes and size formatting.

use std::path::{Path, PathBuf};

use crate::error::{PdfBatchError, Result};

/// Expand multiple glob patterns into filesystem paths.
///
/// Accepts anything iterable with items that convert to `&str`, e.g.:
/// `&[&str]`, `Vec<String>`, or `Vec<&str>`.
///
/// Paths are returned pattern by pattern; within one pattern they come in
/// the alphabetical order `glob` yields them.
///
/// Errors:
/// - Propagates `glob` parse errors.
/// - Propagates filesystem errors from glob iterator.
pub fn collect_paths_for_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for pattern in patterns.into_iter() {
        let paths = glob::glob(pattern.as_ref())
            .map_err(|err| PdfBatchError::invalid_config(format!("Invalid pattern: {err}")))?;

        for entry in paths {
            let path = entry.map_err(|err| PdfBatchError::other(err.to_string()))?;
            resolved_paths.push(path);
        }
    }

    Ok(resolved_paths)
}

/// Write bytes to a file by writing a sibling temp file and renaming it.
///
/// Parent directories are created as needed. Readers never observe a
/// partially written file.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    tokio::fs::write(&temp_path, bytes).await?;
    tokio::fs::rename(&temp_path, path).await?;

    Ok(())
}

/// Format file size as human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
