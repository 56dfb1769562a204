use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::models::{TagSet, TAG_FIELDS};

/// Shared tag log appended to on every extraction, one line per audio file.
pub const TAGS_FILE: &str = "tags.txt";

/// Reads the tag values of a FLAC file by running `metaflac --show-tag` once
/// per known field. Fields the file does not carry are left out of the map.
pub fn read_tags(file: &Path, config: &Config) -> Result<TagSet> {
    let mut tags = TagSet::new();

    for field in TAG_FIELDS {
        let output = Command::new(&config.programs.metaflac)
            .arg(format!("--show-tag={}", field))
            .arg(file)
            .output()
            .with_context(|| format!("failed to run {}", config.programs.metaflac))?;

        // metaflac echoes "FIELD=value" or nothing at all.
        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout.lines().next().unwrap_or("");
        if let Some(value) = line.strip_prefix(&format!("{}=", field)) {
            tags.set(field, value);
        }
    }

    Ok(tags)
}

/// Reads a FLAC file's tags and appends its pipe-delimited line to the shared
/// `tags.txt` in the destination directory for later reuse.
pub fn extract_tags(file: &Path, destination: &Path, config: &Config) -> Result<TagSet> {
    let tags = read_tags(file, config)?;

    let log_path = destination.join(TAGS_FILE);
    let mut log = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("cannot open {}", log_path.display()))?;
    writeln!(log, "{}", tag_line(file, &tags))?;

    Ok(tags)
}

/// Serializes one file's tags as `path|FIELD=value|...` in fixed field order.
fn tag_line(file: &Path, tags: &TagSet) -> String {
    let mut parts = vec![file.display().to_string()];
    parts.extend(tags.iter().map(|(field, value)| format!("{}={}", field, value)));
    parts.join("|")
}

/// Parses a pipe-delimited tag file into a map from audio file path to its
/// tag set. Entries without a `=` are skipped; values keep any later `=`.
pub fn read_tag_file(path: &Path) -> Result<HashMap<PathBuf, TagSet>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read tag file {}", path.display()))?;

    let mut result = HashMap::new();
    for line in content.lines() {
        if let Some((file, tags)) = parse_tag_line(line) {
            result.insert(file, tags);
        }
    }

    Ok(result)
}

fn parse_tag_line(line: &str) -> Option<(PathBuf, TagSet)> {
    let mut parts = line.split('|');
    let file = parts.next().filter(|f| !f.is_empty())?;

    let mut tags = TagSet::new();
    for part in parts {
        if let Some((field, value)) = part.split_once('=') {
            tags.set(field, value);
        }
    }

    Some((PathBuf::from(file), tags))
}
