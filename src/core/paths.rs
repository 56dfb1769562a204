use std::path::{Path, PathBuf};

/// Moves a file name into `directory` and swaps its extension, keeping only
/// the stem: `update_path("a/b.wav", "out", ".flac")` is `out/b.flac`.
pub fn update_path(file: &Path, directory: &Path, extension: &str) -> PathBuf {
    let stem = file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    directory.join(format!("{}{}", stem, extension))
}

/// Replaces the extension of `file` in place. An empty `extension` strips it.
pub fn update_extension(file: &Path, extension: &str) -> PathBuf {
    let mut updated = file.to_path_buf();
    if extension.is_empty() {
        updated.set_extension("");
    } else {
        updated.set_extension(extension.trim_start_matches('.'));
    }
    updated
}
