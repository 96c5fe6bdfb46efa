//! The 10-byte ID3v2 tag header and the (preserve-verbatim) extension header.
use crate::core::raw;
use crate::error::{ParseError, ParseResult};
use crate::id3v2::syncdata;

/// The three ID3v2 major versions this crate understands.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Version {
    V22,
    V23,
    V24,
}

impl Version {
    pub(crate) fn major_byte(self) -> u8 {
        match self {
            Version::V22 => 2,
            Version::V23 => 3,
            Version::V24 => 4,
        }
    }
}

/// The versions a tag may be written out as. Writing as v2.2 is not
/// supported: a tag read as v2.2 is upgraded to v2.3 on `commit`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SaveVersion {
    V23,
    V24,
}

impl From<SaveVersion> for Version {
    fn from(version: SaveVersion) -> Self {
        match version {
            SaveVersion::V23 => Version::V23,
            SaveVersion::V24 => Version::V24,
        }
    }
}

/// Tag-level header flags (byte 5 of the header).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TagFlags {
    pub unsync: bool,
    /// v2.2 only: the whole tag body is compressed. Never implemented by
    /// any real encoder; a tag with this bit set fails with `NotImplemented`.
    pub compression: bool,
    pub extended: bool,
    pub experimental: bool,
    pub footer: bool,
}

/// The 10-byte ID3v2 tag header.
#[derive(Clone, Debug)]
pub struct TagHeader {
    version: Version,
    size: u32,
    flags: TagFlags,
}

impl TagHeader {
    pub(crate) fn parse(raw: &[u8; 10]) -> ParseResult<Self> {
        if &raw[0..3] != b"ID3" {
            return Err(ParseError::HeaderInvalid(
                "missing \"ID3\" magic".to_string(),
            ));
        }

        let version = match raw[3] {
            2 => Version::V22,
            3 => Version::V23,
            4 => Version::V24,
            other => {
                return Err(ParseError::NotImplemented(format!(
                    "unsupported ID3v2 major version {}",
                    other
                )))
            }
        };

        let flag_byte = raw[5];
        let flags = match version {
            Version::V22 => {
                if flag_byte & 0x3F != 0 {
                    return Err(ParseError::HeaderInvalid(
                        "reserved header flag bits set".to_string(),
                    ));
                }

                let compression = raw::bit_at(6, flag_byte);
                if compression {
                    return Err(ParseError::NotImplemented(
                        "ID3v2.2 whole-tag compression is not supported".to_string(),
                    ));
                }

                TagFlags {
                    unsync: raw::bit_at(7, flag_byte),
                    compression,
                    extended: false,
                    experimental: false,
                    footer: false,
                }
            }
            Version::V23 | Version::V24 => {
                if flag_byte & 0x0F != 0 {
                    return Err(ParseError::HeaderInvalid(
                        "reserved header flag bits set".to_string(),
                    ));
                }

                TagFlags {
                    unsync: raw::bit_at(7, flag_byte),
                    compression: false,
                    extended: raw::bit_at(6, flag_byte),
                    experimental: raw::bit_at(5, flag_byte),
                    footer: raw::bit_at(4, flag_byte),
                }
            }
        };

        let size = syncdata::to_u28([raw[6], raw[7], raw[8], raw[9]]);

        if !(1..=256_000_000).contains(&size) {
            return Err(ParseError::HeaderInvalid(format!(
                "tag size {} out of allowed range",
                size
            )));
        }

        Ok(TagHeader {
            version,
            size,
            flags,
        })
    }

    /// Renders this header. Always clears `unsync`/`experimental`/`footer`
    /// and clears `extended` unless an extension header is carried forward,
    /// per the commit engine's preserve-verbatim-on-read/clear-on-write
    /// policy for everything but the frame list itself.
    pub(crate) fn render(version: SaveVersion, size: u32, extended: bool) -> [u8; 10] {
        let mut out = [0u8; 10];
        out[0..3].copy_from_slice(b"ID3");
        out[3] = Version::from(version).major_byte();
        out[4] = 0;

        let mut flags = 0u8;
        if extended {
            flags |= 0x40;
        }
        out[5] = flags;

        out[6..10].copy_from_slice(&syncdata::from_u28(size));
        out
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn flags(&self) -> TagFlags {
        self.flags
    }
}

/// The extension header. This crate never writes a populated extension
/// header: on read the raw bytes are kept so callers can inspect what was
/// there; on write it is always the zero-length stub the commit engine
/// produces.
#[derive(Clone, Debug)]
pub struct ExtendedHeader {
    /// Total size of the extension header, including its own size field.
    /// Used only to know how many bytes to skip before the frame list.
    size: u32,
    raw: Vec<u8>,
}

impl ExtendedHeader {
    pub(crate) fn parse(version: Version, data: &[u8]) -> ParseResult<Self> {
        match version {
            Version::V23 => {
                if data.len() < 4 {
                    return Err(ParseError::HeaderInvalid(
                        "extended header truncated".to_string(),
                    ));
                }
                let size = raw::to_size(&data[0..4]) as u32;
                // The v2.3 extended header size excludes the 4-byte size
                // field itself.
                let total = size + 4;
                if data.len() < total as usize {
                    return Err(ParseError::HeaderInvalid(
                        "extended header truncated".to_string(),
                    ));
                }
                Ok(ExtendedHeader {
                    size: total,
                    raw: data[..total as usize].to_vec(),
                })
            }
            Version::V24 => {
                if data.len() < 4 {
                    return Err(ParseError::HeaderInvalid(
                        "extended header truncated".to_string(),
                    ));
                }
                let size = syncdata::to_u28([data[0], data[1], data[2], data[3]]);
                if data.len() < size as usize {
                    return Err(ParseError::HeaderInvalid(
                        "extended header truncated".to_string(),
                    ));
                }
                Ok(ExtendedHeader {
                    size,
                    raw: data[..size as usize].to_vec(),
                })
            }
            Version::V22 => Err(ParseError::NotImplemented(
                "ID3v2.2 has no extension header".to_string(),
            )),
        }
    }

    /// Number of bytes this extension header occupies in the tag body.
    pub(crate) fn size(&self) -> u32 {
        self.size
    }

    /// The raw, unreinterpreted bytes as read from the file.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }
}
