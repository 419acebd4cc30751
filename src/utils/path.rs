//! Output and temp file naming

use std::path::{Path, PathBuf};

/// Extension used when the input has none
pub const DEFAULT_EXTENSION: &str = "mp4";

/// File name of `path` as text, falling back to the whole path
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Extension of `path`, or `mp4`
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_string())
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// Default split prefix: the input's file name followed by `suffix`
pub fn default_prefix(input: &Path, suffix: &str) -> String {
    format!("{}{}", base_name(input), suffix)
}

/// Output of split part `number` (1-based)
pub fn part_path(prefix: &str, number: usize, extension: &str) -> PathBuf {
    PathBuf::from(format!("{}{}.{}", prefix, number, extension))
}

/// Temp file prefix `<basename>-<purpose>-`
pub fn temp_prefix(input: &Path, purpose: &str) -> String {
    format!("{}-{}-", base_name(input), purpose)
}

/// Temp file suffix `.<ext>` matching `input`
pub fn temp_suffix(input: &Path) -> String {
    format!(".{}", extension_of(input))
}
