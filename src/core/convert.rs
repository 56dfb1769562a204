use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::config::Config;
use crate::core::{cover, paths, tags};
use crate::models::{AudioFormat, TagSet};

/// LAME command-line flag for a FLAC tag field.
enum Id3Flag {
    /// Flag followed by the value as its own argument (`--tt <value>`).
    Plain(&'static str),
    /// Emitted as a user-defined text frame (`--tv FRAME=<value>`).
    UserText(&'static str),
}

/// Fixed FLAC-field → LAME-flag table. Fields without a mapping are dropped
/// silently on MP3 encode.
fn id3_flag(field: &str) -> Option<Id3Flag> {
    match field {
        "TITLE" => Some(Id3Flag::Plain("--tt")),
        "ARTIST" => Some(Id3Flag::Plain("--ta")),
        "ALBUM" => Some(Id3Flag::Plain("--tl")),
        "TRACKNUMBER" => Some(Id3Flag::Plain("--tn")),
        "ALBUMARTIST" => Some(Id3Flag::UserText("TPE2")),
        "GENRE" => Some(Id3Flag::Plain("--tg")),
        "DATE" => Some(Id3Flag::Plain("--ty")),
        _ => None,
    }
}

/// Everything a FLAC decode produces: the WAV file plus whatever metadata
/// was asked to be carried over.
pub struct DecodeOutput {
    pub wav: PathBuf,
    pub cover: Option<PathBuf>,
    pub tags: Option<TagSet>,
}

/// Decodes a FLAC file to WAV with `flac -df`, optionally pulling out the
/// embedded cover and tags along the way.
pub fn decode_flac_wav(
    file: &Path,
    destination: &Path,
    extract_cover: bool,
    extract_tags: bool,
    config: &Config,
) -> Result<DecodeOutput> {
    let wav = paths::update_path(file, destination, AudioFormat::Wav.extension());
    info!("decoding {} -> {}", file.display(), wav.display());

    // -d => decode, -f => force overwrite, -o => output file name
    let args: Vec<OsString> = vec![
        "-df".into(),
        file.into(),
        "-o".into(),
        wav.clone().into(),
    ];
    run_tool(&config.programs.flac, &args)?;

    let cover = if extract_cover {
        cover::extract_cover(file, destination, config)?
    } else {
        None
    };
    let tags = if extract_tags {
        Some(tags::extract_tags(file, destination, config)?)
    } else {
        None
    };

    Ok(DecodeOutput { wav, cover, tags })
}

/// Encodes a WAV file to FLAC at maximum compression, embedding the cover
/// and tags when present. Returns the output path.
pub fn encode_wav_flac(
    file: &Path,
    destination: &Path,
    cover: Option<&Path>,
    tags: Option<&TagSet>,
    config: &Config,
) -> Result<PathBuf> {
    let output = paths::update_path(file, destination, AudioFormat::Flac.extension());
    info!("encoding {} -> {}", file.display(), output.display());

    let args = flac_encode_args(file, &output, cover, tags);
    run_tool(&config.programs.flac, &args)?;

    Ok(output)
}

/// Encodes a WAV file to MP3 with LAME, mapping the tags through the fixed
/// ID3 flag table. Returns the output path.
pub fn encode_wav_mp3(
    file: &Path,
    destination: &Path,
    cover: Option<&Path>,
    tags: Option<&TagSet>,
    config: &Config,
) -> Result<PathBuf> {
    let output = paths::update_path(file, destination, AudioFormat::Mp3.extension());
    info!("encoding {} -> {}", file.display(), output.display());

    let args = lame_encode_args(file, &output, cover, tags, config.mp3.bitrate);
    run_tool(&config.programs.lame, &args)?;

    Ok(output)
}

/// Decodes a FLAC file to WAV, re-encodes the WAV to MP3 carrying over the
/// extracted cover/tags, then removes the intermediate WAV.
pub fn encode_flac_mp3(
    file: &Path,
    destination: &Path,
    extract_cover: bool,
    extract_tags: bool,
    config: &Config,
) -> Result<PathBuf> {
    let decoded = decode_flac_wav(file, destination, extract_cover, extract_tags, config)?;
    let mp3 = encode_wav_mp3(
        &decoded.wav,
        destination,
        decoded.cover.as_deref(),
        decoded.tags.as_ref(),
        config,
    )?;
    cleanup(&decoded.wav)?;
    Ok(mp3)
}

/// Removes an intermediate WAV file via `rm -rf`.
pub fn cleanup(wav: &Path) -> Result<()> {
    debug!("removing {}", wav.display());
    let status = Command::new("rm")
        .arg("-rf")
        .arg(wav)
        .status()
        .context("failed to run rm")?;
    if !status.success() {
        warn!("rm exited with {} removing {}", status, wav.display());
    }
    Ok(())
}

/// Builds the `flac` argument vector for a WAV → FLAC encode.
///
/// -f => force overwrite, -8 => maximum compression, -V => verify encoding,
/// -o => output file name, --picture => embed cover, -T => add a FLAC tag.
fn flac_encode_args(
    file: &Path,
    output: &Path,
    cover: Option<&Path>,
    tags: Option<&TagSet>,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-f8V".into(), "-o".into(), output.into()];

    if let Some(cover) = cover {
        // Picture specification: TYPE||DESCRIPTION||FILE, type 3 = front cover.
        let name = cover
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        args.push(format!("--picture=3||{}||{}", name, cover.display()).into());
    }

    if let Some(tags) = tags {
        for (field, value) in tags.iter() {
            args.push("-T".into());
            args.push(format!("{}={}", field, value).into());
        }
    }

    args.push(file.into());
    args
}

/// Builds the `lame` argument vector for a WAV → MP3 encode.
///
/// -b => bitrate in kbps, -q 0 => highest quality, --preset insane => quality
/// settings, --id3v2-only => write only a v2 tag, --ti => cover image.
fn lame_encode_args(
    file: &Path,
    output: &Path,
    cover: Option<&Path>,
    tags: Option<&TagSet>,
    bitrate: u32,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-b".into(),
        bitrate.to_string().into(),
        "-q".into(),
        "0".into(),
        "--preset".into(),
        "insane".into(),
        "--id3v2-only".into(),
    ];

    if let Some(cover) = cover {
        args.push("--ti".into());
        args.push(cover.into());
    }

    if let Some(tags) = tags {
        for (field, value) in tags.iter() {
            let Some(flag) = id3_flag(field) else {
                continue;
            };

            // Track totals ride along inside the TRACKNUMBER value.
            let value = match (field, tags.get("TRACKTOTAL")) {
                ("TRACKNUMBER", Some(total)) => format!("{}/{}", value, total),
                _ => value.to_string(),
            };

            match flag {
                Id3Flag::Plain(name) => {
                    args.push(name.into());
                    args.push(value.into());
                }
                Id3Flag::UserText(frame) => {
                    args.push("--tv".into());
                    args.push(format!("{}={}", frame, value).into());
                }
            }
        }
    }

    args.push(file.into());
    args.push(output.into());
    args
}

/// Runs an external tool and waits for it. A non-zero exit is logged and
/// otherwise ignored; only a failure to spawn is an error.
fn run_tool(program: &str, args: &[OsString]) -> Result<()> {
    debug!("running {} {:?}", program, args);
    let status = Command::new(program)
        .args(args)
        .status()
        .with_context(|| format!("failed to run {}", program))?;
    if !status.success() {
        warn!("{} exited with {}", program, status);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_flac_args_without_metadata() {
        let args = flac_encode_args(Path::new("in.wav"), Path::new("out/in.flac"), None, None);
        assert_eq!(args, os(&["-f8V", "-o", "out/in.flac", "in.wav"]));
    }

    #[test]
    fn test_flac_args_with_cover_and_tags() {
        let mut tags = TagSet::new();
        tags.set("TITLE", "x");
        tags.set("ARTIST", "y");

        let args = flac_encode_args(
            Path::new("in.wav"),
            Path::new("out/in.flac"),
            Some(Path::new("art/cover.jpg")),
            Some(&tags),
        );
        assert_eq!(
            args,
            os(&[
                "-f8V",
                "-o",
                "out/in.flac",
                "--picture=3||cover.jpg||art/cover.jpg",
                "-T",
                "TITLE=x",
                "-T",
                "ARTIST=y",
                "in.wav",
            ])
        );
    }

    #[test]
    fn test_lame_args_without_metadata() {
        let args = lame_encode_args(Path::new("in.wav"), Path::new("out/in.mp3"), None, None, 320);
        assert_eq!(
            args,
            os(&[
                "-b", "320", "-q", "0", "--preset", "insane", "--id3v2-only", "in.wav",
                "out/in.mp3",
            ])
        );
    }

    #[test]
    fn test_lame_args_respect_bitrate() {
        let args = lame_encode_args(Path::new("a.wav"), Path::new("a.mp3"), None, None, 192);
        assert_eq!(args[1], OsString::from("192"));
    }

    #[test]
    fn test_lame_args_map_tags() {
        let mut tags = TagSet::new();
        tags.set("TITLE", "x");
        tags.set("ALBUMARTIST", "The Band");
        tags.set("GENRE", "Rock");

        let args = lame_encode_args(Path::new("in.wav"), Path::new("in.mp3"), None, Some(&tags), 320);
        let tail: Vec<OsString> = args[7..].to_vec();
        assert_eq!(
            tail,
            os(&[
                "--tt",
                "x",
                "--tv",
                "TPE2=The Band",
                "--tg",
                "Rock",
                "in.wav",
                "in.mp3",
            ])
        );
    }

    #[test]
    fn test_lame_args_fold_track_total() {
        let mut tags = TagSet::new();
        tags.set("TRACKNUMBER", "3");
        tags.set("TRACKTOTAL", "12");

        let args = lame_encode_args(Path::new("in.wav"), Path::new("in.mp3"), None, Some(&tags), 320);
        let pos = args.iter().position(|a| a.to_str() == Some("--tn")).unwrap();
        assert_eq!(args[pos + 1], OsString::from("3/12"));
        // TRACKTOTAL itself maps to no flag.
        assert!(!args.iter().any(|a| a.to_str() == Some("TRACKTOTAL=12")));
    }

    #[test]
    fn test_lame_args_drop_unmapped_fields() {
        let mut tags = TagSet::new();
        tags.set("DISCTOTAL", "2");

        let args = lame_encode_args(Path::new("in.wav"), Path::new("in.mp3"), None, Some(&tags), 320);
        assert_eq!(
            args,
            os(&[
                "-b", "320", "-q", "0", "--preset", "insane", "--id3v2-only", "in.wav", "in.mp3",
            ])
        );
    }

    #[test]
    fn test_lame_args_with_cover() {
        let args = lame_encode_args(
            Path::new("in.wav"),
            Path::new("in.mp3"),
            Some(Path::new("cover.png")),
            None,
            320,
        );
        let pos = args.iter().position(|a| a.to_str() == Some("--ti")).unwrap();
        assert_eq!(args[pos + 1], OsString::from("cover.png"));
    }
}
