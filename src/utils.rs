use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

#[macro_export]
macro_rules! time_it {
    ($task:expr, $code:expr) => {{
        let start = std::time::Instant::now();
        let result = $code;
        let duration = start.elapsed();
        log::debug!("{}: {:?}", $task, duration);
        result
    }};
}

/// Fails early when the input path is not a regular file.
pub fn require_input_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        bail!("Input file '{}' not found", path.display());
    }
    Ok(())
}

/// Creates the parent directories of `path` if they are missing.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory '{}'", parent.display()))?;
        }
    }
    Ok(())
}

/// Cuts `text` to at most `max_chars` characters, appending `...` when something was dropped.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
