//! Frame payload shapes and the frame-ID → shape dispatch table.
//!
//! Every supported frame-ID maps to exactly one of the variants below. A
//! frame-ID absent from [`shape_for_id`] is kept as a
//! [`Frame::parse`](crate::id3v2::frame::Frame::parse) `Unknown` result
//! (raw bytes preserved) rather than decoded; a frame-ID that *is*
//! registered but whose bytes fail to decode is dropped with a warning.
mod comment;
mod object;
mod picture;
mod play_counter;
mod text;
mod url;

pub use picture::PictureType;

use crate::core::string::Encoding;
use crate::error::{ParseError, ParseResult};
use crate::id3v2::header::Version;
use log::warn;

/// The decoded form of a frame's payload bytes.
#[derive(Clone, Debug, PartialEq)]
pub enum FramePayload {
    /// All `T***` frames except `TXXX`/`TXX`.
    Text {
        encoding: Encoding,
        values: Vec<String>,
    },
    /// `TXXX`/`TXX` and `WXXX`/`WXX`. `url` is `true` for the latter pair,
    /// which always renders its value as Latin-1 regardless of `encoding`.
    UserText {
        encoding: Encoding,
        description: String,
        value: String,
        url: bool,
    },
    /// All `W***` frames except `WXXX`/`WXX`.
    Url { url: String },
    /// `COMM`/`COM` and `USLT`/`ULT`.
    Comment {
        encoding: Encoding,
        language: [u8; 3],
        description: String,
        text: String,
    },
    /// `APIC` (v2.3/v2.4).
    Picture {
        encoding: Encoding,
        mime: String,
        picture_type: PictureType,
        description: String,
        data: Vec<u8>,
    },
    /// `PIC` (v2.2). Same shape as `Picture`, but `format` is a bare 3-byte
    /// field instead of a null-terminated MIME string.
    PictureV2 {
        encoding: Encoding,
        format: [u8; 3],
        picture_type: PictureType,
        description: String,
        data: Vec<u8>,
    },
    /// `GEOB`/`GEO`.
    Object {
        encoding: Encoding,
        mime: String,
        filename: String,
        description: String,
        data: Vec<u8>,
    },
    /// `PCNT`/`CNT`.
    PlayCounter { count: u64 },
    /// Every other supported-but-not-decoded frame-ID (`UFID`, `PRIV`,
    /// `POPM`, `RVA2`, `EQU2`, ...). Bytes are preserved verbatim.
    Opaque { data: Vec<u8> },
}

impl FramePayload {
    /// A default-initialized payload appropriate for `id` under `version`,
    /// used by [`Frame::new`](crate::id3v2::frame::Frame::new). Returns
    /// `None` if `id` is not supported under `version` at all.
    pub(crate) fn default_for(id: &str, version: Version) -> Option<Self> {
        let default_text_encoding = if version == Version::V24 {
            Encoding::Utf8
        } else {
            Encoding::Latin1
        };

        match shape_for_id(id)? {
            Shape::Text => Some(FramePayload::Text {
                encoding: default_text_encoding,
                values: vec![String::new()],
            }),
            Shape::UserText => Some(FramePayload::UserText {
                encoding: default_text_encoding,
                description: String::new(),
                value: String::new(),
                url: false,
            }),
            Shape::UserUrl => Some(FramePayload::UserText {
                encoding: default_text_encoding,
                description: String::new(),
                value: String::new(),
                url: true,
            }),
            Shape::Url => Some(FramePayload::Url {
                url: String::new(),
            }),
            Shape::Comment => Some(FramePayload::Comment {
                encoding: default_text_encoding,
                language: *b"xxx",
                description: String::new(),
                text: String::new(),
            }),
            Shape::Picture => Some(FramePayload::Picture {
                encoding: default_text_encoding,
                mime: "image/".to_string(),
                picture_type: PictureType::Other,
                description: String::new(),
                data: Vec::new(),
            }),
            Shape::PictureV2 => Some(FramePayload::PictureV2 {
                encoding: default_text_encoding,
                format: *b"JPG",
                picture_type: PictureType::Other,
                description: String::new(),
                data: Vec::new(),
            }),
            Shape::Object => Some(FramePayload::Object {
                encoding: default_text_encoding,
                mime: "application/octet-stream".to_string(),
                filename: String::new(),
                description: String::new(),
                data: Vec::new(),
            }),
            Shape::PlayCounter => Some(FramePayload::PlayCounter { count: 0 }),
            Shape::Opaque => Some(FramePayload::Opaque { data: Vec::new() }),
        }
    }

    pub(crate) fn decode(id: &str, version: Version, data: &[u8]) -> ParseResult<Self> {
        let shape = match shape_for_id(id) {
            Some(shape) => shape,
            None => {
                return Err(ParseError::PayloadDecode(format!(
                    "no payload codec registered for frame-ID {}",
                    id
                )))
            }
        };

        // A v2.3-or-earlier frame carrying the v2.4-only UTF-8 encoding byte
        // is not a malformed frame to drop: it is treated as opaque bytes
        // (spec.md §4.2), so the frame survives round-tripping even though
        // this crate does not interpret its text.
        if shape.has_encoding_byte() && version != Version::V24 && data.first() == Some(&3) {
            warn!(
                "frame {} carries a v2.4-only UTF-8 encoding byte under {:?}; preserving as opaque",
                id, version
            );
            return Ok(FramePayload::Opaque {
                data: data.to_vec(),
            });
        }

        match shape {
            Shape::Text => text::decode_text(version, data),
            Shape::UserText => text::decode_user_text(data, false),
            Shape::UserUrl => text::decode_user_text(data, true),
            Shape::Url => url::decode(data),
            Shape::Comment => comment::decode(data),
            Shape::Picture => picture::decode(data),
            Shape::PictureV2 => picture::decode_v2(data),
            Shape::Object => object::decode(data),
            Shape::PlayCounter => play_counter::decode(data),
            Shape::Opaque => Ok(FramePayload::Opaque {
                data: data.to_vec(),
            }),
        }
    }

    pub(crate) fn encode(&self) -> Vec<u8> {
        match self {
            FramePayload::Text { encoding, values } => text::encode_text(*encoding, values),
            FramePayload::UserText {
                encoding,
                description,
                value,
                url,
            } => text::encode_user_text(*encoding, description, value, *url),
            FramePayload::Url { url } => url::encode(url),
            FramePayload::Comment {
                encoding,
                language,
                description,
                text,
            } => comment::encode(*encoding, language, description, text),
            FramePayload::Picture {
                encoding,
                mime,
                picture_type,
                description,
                data,
            } => picture::encode(*encoding, mime, *picture_type, description, data),
            FramePayload::PictureV2 {
                encoding,
                format,
                picture_type,
                description,
                data,
            } => picture::encode_v2(*encoding, format, *picture_type, description, data),
            FramePayload::Object {
                encoding,
                mime,
                filename,
                description,
                data,
            } => object::encode(*encoding, mime, filename, description, data),
            FramePayload::PlayCounter { count } => play_counter::encode(*count),
            FramePayload::Opaque { data } => data.clone(),
        }
    }
}

/// A payload shape, independent of the specific frame-ID that selects it.
enum Shape {
    Text,
    UserText,
    UserUrl,
    Url,
    Comment,
    Picture,
    PictureV2,
    Object,
    PlayCounter,
    Opaque,
}

impl Shape {
    /// Whether this shape's payload begins with a one-byte text-encoding
    /// selector, i.e. whether the v2.3-era UTF-8-under-non-2.4 fallback
    /// applies to it at all.
    fn has_encoding_byte(&self) -> bool {
        !matches!(self, Shape::Url | Shape::PlayCounter | Shape::Opaque)
    }
}

/// Supported-but-not-decoded frame-IDs. Not exhaustive of the ID3v2
/// standard — frame-IDs outside both this list and the structured shapes
/// below are dropped with a warning, per spec.
const OPAQUE_IDS: &[&str] = &[
    "UFID", "UFI", "PRIV", "POPM", "RVA2", "RVAD", "EQU2", "EQUA", "AENC", "GRID", "ENCR", "LINK",
    "MCDI", "MLLT", "SYTC", "SYLT", "RVRB", "RBUF", "SEEK", "SIGN", "ASPI", "POSS", "COMR", "OWNE",
    "USER", "ETCO", "PCST",
];

/// Whether `id` maps to any payload shape at all. Used by the frame parser
/// to decide between decoding a frame and preserving it as an
/// [`UnknownFrame`](crate::id3v2::frame::UnknownFrame).
pub(crate) fn is_registered(id: &str) -> bool {
    shape_for_id(id).is_some()
}

fn shape_for_id(id: &str) -> Option<Shape> {
    match id {
        "TXXX" | "TXX" => Some(Shape::UserText),
        "WXXX" | "WXX" => Some(Shape::UserUrl),
        "COMM" | "COM" | "USLT" | "ULT" => Some(Shape::Comment),
        "APIC" => Some(Shape::Picture),
        "PIC" => Some(Shape::PictureV2),
        "GEOB" | "GEO" => Some(Shape::Object),
        "PCNT" | "CNT" => Some(Shape::PlayCounter),
        _ if id.starts_with('T') => Some(Shape::Text),
        _ if id.starts_with('W') => Some(Shape::Url),
        _ if OPAQUE_IDS.contains(&id) => Some(Shape::Opaque),
        _ => None,
    }
}

/// Decodes the one-byte text-encoding prefix most payloads start with.
///
/// Whether encoding `3` (UTF-8) is legal under the frame's version is not
/// this function's concern: `FramePayload::decode` intercepts that case
/// before any shape-specific codec, including this one, ever sees the
/// bytes. This only rejects byte values with no meaning at all.
pub(crate) fn parse_encoding_byte(byte: u8) -> ParseResult<Encoding> {
    match byte {
        0 => Ok(Encoding::Latin1),
        1 => Ok(Encoding::Utf16),
        2 => Ok(Encoding::Utf16Be),
        3 => Ok(Encoding::Utf8),
        other => Err(ParseError::PayloadDecode(format!(
            "unknown text encoding byte {}",
            other
        ))),
    }
}

pub(crate) fn render_encoding_byte(encoding: Encoding) -> u8 {
    match encoding {
        Encoding::Latin1 => 0,
        Encoding::Utf16 | Encoding::Utf16Le => 1,
        Encoding::Utf16Be => 2,
        Encoding::Utf8 => 3,
    }
}
