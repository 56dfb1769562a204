use std::collections::HashMap;
use std::path::Path;

/// Audio formats handled by the conversion commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Flac,
    Mp3,
}

impl AudioFormat {
    /// File extension including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            AudioFormat::Wav => ".wav",
            AudioFormat::Flac => ".flac",
            AudioFormat::Mp3 => ".mp3",
        }
    }

    /// Checks whether the path carries this format's extension (case-insensitive).
    pub fn matches(self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(&self.extension()[1..]))
            .unwrap_or(false)
    }
}

/// The fixed set of metadata fields carried between formats.
///
/// TRACKTOTAL and DISCTOTAL have no LAME flag of their own; TRACKTOTAL is
/// folded into the TRACKNUMBER value and DISCTOTAL is dropped on MP3 encode.
pub const TAG_FIELDS: [&str; 9] = [
    "TITLE",
    "ARTIST",
    "ALBUM",
    "TRACKNUMBER",
    "ALBUMARTIST",
    "GENRE",
    "DATE",
    "TRACKTOTAL",
    "DISCTOTAL",
];

/// Metadata values for one audio file, keyed by the fields in `TAG_FIELDS`.
/// Values are opaque strings; nothing is validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    values: HashMap<String, String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(|s| s.as_str())
    }

    pub fn set(&mut self, field: &str, value: &str) {
        self.values.insert(field.to_string(), value.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over the present fields in `TAG_FIELDS` order, so every
    /// consumer builds its argument vector deterministically.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        TAG_FIELDS
            .iter()
            .filter_map(|field| self.get(field).map(|value| (*field, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_matches_extension() {
        assert!(AudioFormat::Wav.matches(Path::new("a/b.wav")));
        assert!(AudioFormat::Wav.matches(Path::new("a/b.WAV")));
        assert!(AudioFormat::Flac.matches(Path::new("song.flac")));
        assert!(!AudioFormat::Flac.matches(Path::new("song.mp3")));
        assert!(!AudioFormat::Mp3.matches(Path::new("noext")));
    }

    #[test]
    fn test_tagset_iterates_in_field_order() {
        let mut tags = TagSet::new();
        tags.set("DATE", "1999");
        tags.set("TITLE", "x");
        tags.set("ARTIST", "y");

        let fields: Vec<&str> = tags.iter().map(|(f, _)| f).collect();
        assert_eq!(fields, vec!["TITLE", "ARTIST", "DATE"]);
    }

    #[test]
    fn test_tagset_overwrites_value() {
        let mut tags = TagSet::new();
        tags.set("TITLE", "first");
        tags.set("TITLE", "second");
        assert_eq!(tags.get("TITLE"), Some("second"));
    }

    #[test]
    fn test_format_extension_round_trip() {
        for format in [AudioFormat::Wav, AudioFormat::Flac, AudioFormat::Mp3] {
            let path = PathBuf::from(format!("track{}", format.extension()));
            assert!(format.matches(&path));
        }
    }
}
