use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use log::warn;

use crate::config::Config;

/// Finds the embedded front-cover picture of a FLAC file and exports it into
/// the destination directory. Returns `None` when the file has no PICTURE
/// block.
///
/// The lookup is the chained pipeline
/// `metaflac --list --block-type=PICTURE <file> | grep description: | sed 's/.*: //'`;
/// the picture's description doubles as the export file name.
pub fn extract_cover(file: &Path, destination: &Path, config: &Config) -> Result<Option<PathBuf>> {
    let mut metaflac = Command::new(&config.programs.metaflac)
        .arg("--list")
        .arg("--block-type=PICTURE")
        .arg(file)
        .stdout(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to run {}", config.programs.metaflac))?;

    let mut grep = Command::new("grep")
        .arg("description:")
        .stdin(metaflac.stdout.take().context("metaflac stdout missing")?)
        .stdout(Stdio::piped())
        .spawn()
        .context("failed to run grep")?;

    let sed = Command::new("sed")
        .arg("s/.*: //")
        .stdin(grep.stdout.take().context("grep stdout missing")?)
        .stdout(Stdio::piped())
        .spawn()
        .context("failed to run sed")?;

    let output = sed.wait_with_output()?;
    metaflac.wait()?;
    grep.wait()?;

    let description = String::from_utf8_lossy(&output.stdout)
        .trim_end_matches('\n')
        .to_string();
    if description.is_empty() {
        return Ok(None);
    }

    let cover = destination.join(&description);
    let status = Command::new(&config.programs.metaflac)
        .arg(format!("--export-picture-to={}", cover.display()))
        .arg(file)
        .status()
        .with_context(|| format!("failed to run {}", config.programs.metaflac))?;
    if !status.success() {
        warn!("metaflac exited with {} exporting {}", status, cover.display());
    }

    Ok(Some(cover))
}
