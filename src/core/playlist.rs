use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use log::warn;

/// Playlist file name for an album, kept sortable ahead of the tracks.
fn playlist_name(artist: &str, album: &str) -> String {
    format!("00. {} - {}.m3u", artist, album)
}

/// Writes an `.m3u` playlist inside `folder` holding the raw output of
/// `ls <folder>`: unsorted beyond what `ls` does, unfiltered, one entry per
/// line. Returns the playlist path.
pub fn create_playlist(folder: &Path, artist: &str, album: &str) -> Result<PathBuf> {
    let path = folder.join(playlist_name(artist, album));
    let output = File::create(&path)
        .with_context(|| format!("cannot create {}", path.display()))?;

    let status = Command::new("ls")
        .arg(folder)
        .stdout(output)
        .status()
        .context("failed to run ls")?;
    if !status.success() {
        warn!("ls exited with {} listing {}", status, folder.display());
    }

    Ok(path)
}
