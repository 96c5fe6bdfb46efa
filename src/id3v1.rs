//! The ID3v1/ID3v1.1 trailer: a fixed 128-byte record at the end of an MP3
//! file, independent of any ID3v2 tag at the start.
//!
//! Genre *name* lookup is explicitly out of scope (spec.md §1 Non-goals):
//! [`Id3v1Tag::genre`] exposes only the raw byte.
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::core::string;
use crate::core::string::Encoding;
use crate::error::{ParseError, ParseResult};

const TRAILER_LEN: u64 = 128;

/// A parsed ID3v1/ID3v1.1 trailer.
///
/// Read-only per spec.md §4.5: this crate's commit engine only ever writes
/// the ID3v2 region, and the invariant that modifying it never disturbs the
/// trailing 128 bytes is load-bearing (spec.md §8, "v1/v2 independence").
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Id3v1Tag {
    songname: String,
    artist: String,
    album: String,
    year: String,
    comment: String,
    /// `None` for a plain ID3v1 tag; `Some` for ID3v1.1, where the comment
    /// field's last two bytes are repurposed to carry a track number.
    track: Option<u8>,
    genre: u8,
}

impl Id3v1Tag {
    /// Reads the last 128 bytes of the file at `path` and parses them as an
    /// ID3v1 trailer. Fails with [`ParseError::HeaderInvalid`] if the file
    /// is shorter than 128 bytes or the `"TAG"` magic is absent.
    pub fn open<P: AsRef<Path>>(path: P) -> ParseResult<Self> {
        let mut file = File::open(path)?;
        let len = file.metadata()?.len();

        if len < TRAILER_LEN {
            return Err(ParseError::HeaderInvalid(
                "file is shorter than the 128-byte ID3v1 trailer".to_string(),
            ));
        }

        file.seek(SeekFrom::End(-(TRAILER_LEN as i64)))?;
        let mut raw = [0u8; TRAILER_LEN as usize];
        file.read_exact(&mut raw)?;

        Self::parse(&raw)
    }

    /// Parses a 128-byte ID3v1 trailer already read into memory.
    pub(crate) fn parse(raw: &[u8; 128]) -> ParseResult<Self> {
        if &raw[0..3] != b"TAG" {
            return Err(ParseError::HeaderInvalid(
                "ID3v1 \"TAG\" magic not found".to_string(),
            ));
        }

        let songname = read_padded_field(&raw[3..33]);
        let artist = read_padded_field(&raw[33..63]);
        let album = read_padded_field(&raw[63..93]);
        let year = read_padded_field(&raw[93..97]);

        // ID3v1.1: if byte 28 of the comment field is a NUL, byte 29 holds
        // the track number and the effective comment is the first 28 bytes.
        let comment_field = &raw[97..127];
        let (comment, track) = if comment_field[28] == 0x00 {
            (read_padded_field(&comment_field[0..28]), Some(comment_field[29]))
        } else {
            (read_padded_field(comment_field), None)
        };

        let genre = raw[127];

        Ok(Id3v1Tag {
            songname,
            artist,
            album,
            year,
            comment,
            track,
            genre,
        })
    }

    pub fn songname(&self) -> &str {
        &self.songname
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn album(&self) -> &str {
        &self.album
    }

    pub fn year(&self) -> &str {
        &self.year
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// `Some(n)` for ID3v1.1's track-number extension, `None` for a plain
    /// ID3v1 tag (reported as `-1` in spec.md's prose; modeled here as the
    /// absence of a value rather than a sentinel).
    pub fn track(&self) -> Option<u8> {
        self.track
    }

    /// The raw genre byte. No name table is provided (out of scope).
    pub fn genre(&self) -> u8 {
        self.genre
    }
}

/// Decodes a fixed-width Latin-1 field, stopping at the first NUL.
/// Trailing whitespace is not stripped: spec.md specifies NUL right-padding
/// only, and the original source's own `.strip()` call is reference-quality
/// behavior this crate does not carry forward (see DESIGN.md).
fn read_padded_field(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    string::decode_all(Encoding::Latin1, &field[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trailer(
        songname: &str,
        artist: &str,
        album: &str,
        year: &str,
        comment: &[u8],
        genre: u8,
    ) -> [u8; 128] {
        let mut raw = [0u8; 128];
        raw[0..3].copy_from_slice(b"TAG");
        raw[3..3 + songname.len()].copy_from_slice(songname.as_bytes());
        raw[33..33 + artist.len()].copy_from_slice(artist.as_bytes());
        raw[63..63 + album.len()].copy_from_slice(album.as_bytes());
        raw[93..93 + year.len()].copy_from_slice(year.as_bytes());
        raw[97..97 + comment.len()].copy_from_slice(comment);
        raw[127] = genre;
        raw
    }

    #[test]
    fn rejects_missing_magic() {
        let mut raw = trailer("A", "B", "C", "2001", b"hi", 0);
        raw[0] = b'X';
        assert!(matches!(
            Id3v1Tag::parse(&raw),
            Err(ParseError::HeaderInvalid(_))
        ));
    }

    #[test]
    fn plain_id3v1_has_no_track() {
        let raw = trailer("Song", "Artist", "Album", "2001", b"a comment", 17);
        let tag = Id3v1Tag::parse(&raw).unwrap();
        assert_eq!(tag.songname(), "Song");
        assert_eq!(tag.artist(), "Artist");
        assert_eq!(tag.album(), "Album");
        assert_eq!(tag.year(), "2001");
        assert_eq!(tag.comment(), "a comment");
        assert_eq!(tag.track(), None);
        assert_eq!(tag.genre(), 17);
    }

    /// Scenario 5 from spec.md §8: `comment[28] == 0x00` marks an ID3v1.1
    /// track number at `comment[29]`.
    #[test]
    fn id3v1_1_track_number_scenario_5() {
        let mut comment = [0u8; 30];
        comment[0..7].copy_from_slice(b"Ripped!");
        comment[28] = 0x00;
        comment[29] = 7;

        let raw = trailer("T", "A", "Al", "1999", &comment, 0);
        let tag = Id3v1Tag::parse(&raw).unwrap();

        assert_eq!(tag.track(), Some(7));
        assert_eq!(tag.comment(), "Ripped!");
        assert!(tag.comment().len() <= 28);
    }

    #[test]
    fn comment_without_track_marker_uses_full_thirty_bytes() {
        let mut comment = [0u8; 30];
        comment[0..4].copy_from_slice(b"Comm");
        comment[29] = b'!'; // last byte non-NUL, so no track number
        comment[28] = b'?'; // also non-NUL: disables the v1.1 interpretation

        let raw = trailer("T", "A", "Al", "1999", &comment, 0);
        let tag = Id3v1Tag::parse(&raw).unwrap();

        assert_eq!(tag.track(), None);
        assert_eq!(tag.comment(), "Comm");
    }

    #[test]
    fn rejects_truncated_file() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("id3kit_id3v1_short_{}.mp3", std::process::id()));
        std::fs::write(&path, b"too short").unwrap();

        assert!(matches!(
            Id3v1Tag::open(&path),
            Err(ParseError::HeaderInvalid(_))
        ));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn opens_trailer_from_real_file() {
        let raw = trailer("Song", "Artist", "Album", "2001", b"hi", 5);
        let dir = std::env::temp_dir();
        let path = dir.join(format!("id3kit_id3v1_ok_{}.mp3", std::process::id()));

        let mut body = b"\xFF\xFB\x90\x00fake audio frame".to_vec();
        body.extend_from_slice(&raw);
        std::fs::write(&path, &body).unwrap();

        let tag = Id3v1Tag::open(&path).unwrap();
        assert_eq!(tag.songname(), "Song");
        assert_eq!(tag.genre(), 5);

        std::fs::remove_file(&path).ok();
    }
}
