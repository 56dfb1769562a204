use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table};
use dialoguer::Input;
use log::warn;

use crate::config::{self, Config};
use crate::core::{convert, playlist, tags};
use crate::models::{AudioFormat, TagSet};

#[derive(Parser)]
#[command(
    name = "anarky",
    about = "Converts audio files between WAV, FLAC and MP3 with the flac and lame tools"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encode WAV files into FLAC with the maximum compression level
    Wav2flac {
        /// WAV files to encode
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Directory where the output files are stored
        #[arg(short, long, default_value = ".")]
        destination: PathBuf,
        /// Cover image to embed in the output files
        #[arg(short, long)]
        cover: Option<PathBuf>,
        /// Pipe-delimited tag file with the tags to apply
        #[arg(short, long)]
        tags: Option<PathBuf>,
        /// Generate an .m3u playlist for the destination directory
        #[arg(short, long)]
        playlist: bool,
    },
    /// Encode WAV files into MP3 at the configured bitrate
    Wav2mp3 {
        /// WAV files to encode
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Directory where the output files are stored
        #[arg(short, long, default_value = ".")]
        destination: PathBuf,
        /// Cover image to embed in the output files
        #[arg(short, long)]
        cover: Option<PathBuf>,
        /// Pipe-delimited tag file with the tags to apply
        #[arg(short, long)]
        tags: Option<PathBuf>,
        /// Generate an .m3u playlist for the destination directory
        #[arg(short, long)]
        playlist: bool,
    },
    /// Decode FLAC files into WAV
    Flac2wav {
        /// FLAC files to decode
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Directory where the output files are stored
        #[arg(short, long, default_value = ".")]
        destination: PathBuf,
        /// Extract the embedded cover image into the destination
        #[arg(long)]
        cover: bool,
        /// Extract the tags into the destination's tags.txt
        #[arg(long)]
        tags: bool,
    },
    /// Convert FLAC files into MP3 through an intermediate WAV
    Flac2mp3 {
        /// FLAC files to convert
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Directory where the output files are stored
        #[arg(short, long, default_value = ".")]
        destination: PathBuf,
        /// Carry the embedded cover image over to the MP3
        #[arg(long)]
        cover: bool,
        /// Carry the tags over to the MP3
        #[arg(long)]
        tags: bool,
        /// Generate an .m3u playlist for the destination directory
        #[arg(short, long)]
        playlist: bool,
    },
    /// Show the tags of FLAC files
    Tags {
        /// FLAC files to inspect
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Configure the external tool names and the MP3 bitrate
    Config,
}

pub fn run(cli: Cli) -> Result<()> {
    let cfg = config::load_config();

    match cli.command {
        Commands::Wav2flac {
            files,
            destination,
            cover,
            tags,
            playlist,
        } => cmd_encode_wav(EncodeTarget::Flac, files, destination, cover, tags, playlist, &cfg),
        Commands::Wav2mp3 {
            files,
            destination,
            cover,
            tags,
            playlist,
        } => cmd_encode_wav(EncodeTarget::Mp3, files, destination, cover, tags, playlist, &cfg),
        Commands::Flac2wav {
            files,
            destination,
            cover,
            tags,
        } => cmd_flac2wav(files, destination, cover, tags, &cfg),
        Commands::Flac2mp3 {
            files,
            destination,
            cover,
            tags,
            playlist,
        } => cmd_flac2mp3(files, destination, cover, tags, playlist, &cfg),
        Commands::Tags { files } => cmd_tags(files, &cfg),
        Commands::Config => cmd_config(),
    }
}

/// Formats a WAV file can be encoded into.
enum EncodeTarget {
    Flac,
    Mp3,
}

/// Shared front-end of `wav2flac` and `wav2mp3`: one sequential encode per
/// input file, tags looked up per file from the optional tag file.
fn cmd_encode_wav(
    target: EncodeTarget,
    files: Vec<PathBuf>,
    destination: PathBuf,
    cover: Option<PathBuf>,
    tag_file: Option<PathBuf>,
    make_playlist: bool,
    cfg: &Config,
) -> Result<()> {
    let tag_map = match tag_file {
        Some(path) => Some(tags::read_tag_file(&path)?),
        None => None,
    };

    for file in &files {
        if !AudioFormat::Wav.matches(file) {
            warn!("skipping {}: not a WAV file", file.display());
            continue;
        }

        let file_tags = tag_map.as_ref().and_then(|map| map.get(file));
        match target {
            EncodeTarget::Flac => {
                convert::encode_wav_flac(file, &destination, cover.as_deref(), file_tags, cfg)?;
            }
            EncodeTarget::Mp3 => {
                convert::encode_wav_mp3(file, &destination, cover.as_deref(), file_tags, cfg)?;
            }
        }
    }

    if make_playlist {
        let (artist, album) = playlist_labels(&files, tag_map.as_ref());
        playlist::create_playlist(&destination, &artist, &album)?;
    }

    Ok(())
}

fn cmd_flac2wav(
    files: Vec<PathBuf>,
    destination: PathBuf,
    extract_cover: bool,
    extract_tags: bool,
    cfg: &Config,
) -> Result<()> {
    for file in &files {
        if !AudioFormat::Flac.matches(file) {
            warn!("skipping {}: not a FLAC file", file.display());
            continue;
        }
        convert::decode_flac_wav(file, &destination, extract_cover, extract_tags, cfg)?;
    }
    Ok(())
}

fn cmd_flac2mp3(
    files: Vec<PathBuf>,
    destination: PathBuf,
    extract_cover: bool,
    extract_tags: bool,
    make_playlist: bool,
    cfg: &Config,
) -> Result<()> {
    for file in &files {
        if !AudioFormat::Flac.matches(file) {
            warn!("skipping {}: not a FLAC file", file.display());
            continue;
        }
        convert::encode_flac_mp3(file, &destination, extract_cover, extract_tags, cfg)?;
    }

    if make_playlist {
        // The extracted tags were consumed by the encode; read the first
        // file's tags again just for the playlist name.
        let (artist, album) = match (extract_tags, files.first()) {
            (true, Some(first)) => {
                let file_tags = tags::read_tags(first, cfg)?;
                labels_from_tags(&file_tags)
            }
            _ => fallback_labels(),
        };
        playlist::create_playlist(&destination, &artist, &album)?;
    }

    Ok(())
}

fn cmd_tags(files: Vec<PathBuf>, cfg: &Config) -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["File", "Title", "Artist", "Album", "Track"]);

    for file in &files {
        if !AudioFormat::Flac.matches(file) {
            warn!("skipping {}: not a FLAC file", file.display());
            continue;
        }

        let file_tags = tags::read_tags(file, cfg)?;
        let track = match (file_tags.get("TRACKNUMBER"), file_tags.get("TRACKTOTAL")) {
            (Some(n), Some(total)) => format!("{}/{}", n, total),
            (Some(n), None) => n.to_string(),
            _ => "-".to_string(),
        };

        table.add_row(vec![
            Cell::new(file.display()),
            Cell::new(file_tags.get("TITLE").unwrap_or("-")),
            Cell::new(file_tags.get("ARTIST").unwrap_or("-")),
            Cell::new(file_tags.get("ALBUM").unwrap_or("-")),
            Cell::new(track),
        ]);
    }

    println!("{table}");
    Ok(())
}

fn cmd_config() -> Result<()> {
    let mut cfg = config::load_config();

    println!("External tool configuration");

    let flac: String = Input::new()
        .with_prompt("flac binary")
        .with_initial_text(cfg.programs.flac.clone())
        .interact_text()?;

    let lame: String = Input::new()
        .with_prompt("lame binary")
        .with_initial_text(cfg.programs.lame.clone())
        .interact_text()?;

    let metaflac: String = Input::new()
        .with_prompt("metaflac binary")
        .with_initial_text(cfg.programs.metaflac.clone())
        .interact_text()?;

    let bitrate: u32 = Input::new()
        .with_prompt("MP3 bitrate (kbps)")
        .with_initial_text(cfg.mp3.bitrate.to_string())
        .interact_text()?;

    cfg.programs.flac = flac;
    cfg.programs.lame = lame;
    cfg.programs.metaflac = metaflac;
    cfg.mp3.bitrate = bitrate;

    config::save_config(&cfg)?;
    println!("Configuration saved");
    Ok(())
}

/// Picks the playlist artist/album from the first input file that has both
/// tags; falls back to literal placeholders otherwise.
fn playlist_labels(
    files: &[PathBuf],
    tag_map: Option<&HashMap<PathBuf, TagSet>>,
) -> (String, String) {
    if let Some(map) = tag_map {
        for file in files {
            if let Some(file_tags) = map.get(file) {
                if file_tags.get("ARTIST").is_some() && file_tags.get("ALBUM").is_some() {
                    return labels_from_tags(file_tags);
                }
            }
        }
    }
    fallback_labels()
}

fn labels_from_tags(file_tags: &TagSet) -> (String, String) {
    let (artist, album) = fallback_labels();
    (
        file_tags.get("ARTIST").map(str::to_string).unwrap_or(artist),
        file_tags.get("ALBUM").map(str::to_string).unwrap_or(album),
    )
}

fn fallback_labels() -> (String, String) {
    ("artist".to_string(), "album".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playlist_labels_from_tags() {
        let mut file_tags = TagSet::new();
        file_tags.set("ARTIST", "The Band");
        file_tags.set("ALBUM", "First");

        let mut map = HashMap::new();
        map.insert(PathBuf::from("a.wav"), file_tags);

        let files = vec![PathBuf::from("a.wav")];
        let (artist, album) = playlist_labels(&files, Some(&map));
        assert_eq!(artist, "The Band");
        assert_eq!(album, "First");
    }

    #[test]
    fn test_playlist_labels_fallback() {
        let files = vec![PathBuf::from("a.wav")];
        assert_eq!(
            playlist_labels(&files, None),
            ("artist".to_string(), "album".to_string())
        );
    }

    #[test]
    fn test_playlist_labels_skip_incomplete_tags() {
        let mut incomplete = TagSet::new();
        incomplete.set("ARTIST", "Solo");

        let mut complete = TagSet::new();
        complete.set("ARTIST", "Duo");
        complete.set("ALBUM", "Second");

        let mut map = HashMap::new();
        map.insert(PathBuf::from("a.wav"), incomplete);
        map.insert(PathBuf::from("b.wav"), complete);

        let files = vec![PathBuf::from("a.wav"), PathBuf::from("b.wav")];
        let (artist, album) = playlist_labels(&files, Some(&map));
        assert_eq!(artist, "Duo");
        assert_eq!(album, "Second");
    }
}
