//! The per-version frame header and the [`Frame`] record that pairs it with
//! a decoded [`FramePayload`](crate::id3v2::payload::FramePayload).
use crate::core::io::BufStream;
use crate::core::raw;
use crate::error::{ParseError, ParseResult};
use crate::id3v2::header::Version;
use crate::id3v2::payload::FramePayload;

use log::warn;

/// Named booleans for the status/format flag bytes carried by v2.3/v2.4
/// frame headers. ID3v2.2 frames have no flags at all.
///
/// **Quirk**: the source this crate is grounded on decodes these flags with
/// an expression of the form `status & 0x40 >> 6`. In both Python and C-style
/// languages `>>` binds tighter than `&`, so this is actually
/// `status & (0x40 >> 6)`, i.e. `status & 1` — every status-byte flag and
/// every format-byte flag collapses onto that byte's low bit. Per spec.md §9
/// this is reproduced bug-for-bug on both read and write so round-tripping a
/// frame's flags is stable; see [`byte_to_flags`] / [`flags_to_byte`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FrameFlags {
    pub tag_alter_preserve: bool,
    pub file_alter_preserve: bool,
    pub read_only: bool,
    pub grouping: bool,
    pub compression: bool,
    pub encryption: bool,
    pub unsync: bool,
    pub data_length_indicator: bool,
}

/// Decodes a frame's two flag bytes, reproducing the source's
/// operator-precedence bug (see [`FrameFlags`]).
pub(crate) fn byte_to_flags(status: u8, format: u8) -> FrameFlags {
    let status_bit = status & 1 != 0;
    let format_bit = format & 1 != 0;

    FrameFlags {
        tag_alter_preserve: status_bit,
        file_alter_preserve: status_bit,
        read_only: status_bit,
        grouping: format_bit,
        compression: format_bit,
        encryption: format_bit,
        unsync: format_bit,
        data_length_indicator: format_bit,
    }
}

/// The inverse of [`byte_to_flags`]. Since the quirk collapses every
/// status-byte flag onto one bit and every format-byte flag onto another,
/// this only has one bit of information to recover per byte; it is used for
/// frames constructed or mutated by the caller rather than for frames that
/// were parsed (those keep their original bytes verbatim, see
/// [`Frame::serialize`]).
pub(crate) fn flags_to_byte(flags: FrameFlags) -> (u8, u8) {
    let status = u8::from(flags.tag_alter_preserve);
    let format = u8::from(flags.grouping);
    (status, format)
}

/// Number of bytes a frame's header occupies under `version`.
pub(crate) fn header_len(version: Version) -> usize {
    match version {
        Version::V22 => 6,
        Version::V23 | Version::V24 => 10,
    }
}

fn is_valid_fid(bytes: &[u8]) -> bool {
    !bytes.is_empty() && bytes.iter().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

/// A single decoded ID3v2 frame: its frame-ID, raw flag bytes (v2.3/v2.4
/// only), and decoded payload.
#[derive(Clone, Debug)]
pub struct Frame {
    fid: String,
    /// The exact status/format bytes as read, or as last set by
    /// [`Frame::set_flags`]. `None` under v2.2, which has no frame flags.
    raw_flags: Option<(u8, u8)>,
    payload: FramePayload,
}

/// The result of attempting to parse one frame out of a tag body stream.
pub(crate) enum ParsedFrame {
    Frame(Frame),
    /// The frame-ID has no registered payload codec at all; its raw bytes
    /// are preserved rather than discarded (§3's `Vec<UnknownFrame>`).
    Unknown(UnknownFrame),
    /// The frame-ID is registered but its payload failed to decode under
    /// that codec. Non-fatal: the caller has already advanced past this
    /// frame's declared size.
    Dropped,
}

/// A frame whose ID parsed but which has no registered payload codec
/// (`PRIV`-style extensions a future ID3v2 revision might add, vendor
/// frame-IDs, etc). Its raw bytes are kept so callers can inspect what
/// would otherwise vanish silently, and it round-trips byte-for-byte
/// through [`Tag::commit`](crate::id3v2::tag::Tag::commit).
#[derive(Clone, Debug)]
pub struct UnknownFrame {
    fid: String,
    raw_flags: Option<(u8, u8)>,
    data: Vec<u8>,
}

impl UnknownFrame {
    pub fn fid(&self) -> &str {
        &self.fid
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn serialize(&self, version: Version) -> Vec<u8> {
        let mut out = Vec::with_capacity(header_len(version) + self.data.len());
        out.extend(self.fid.as_bytes());

        match version {
            Version::V22 => out.extend(raw::from_size24(self.data.len() as u32)),
            Version::V23 | Version::V24 => {
                out.extend(raw::from_size(self.data.len() as u32));
                let (status, format) = self.raw_flags.unwrap_or((0, 0));
                out.push(status);
                out.push(format);
            }
        }

        out.extend(&self.data);
        out
    }

    pub(crate) fn serialized_len(&self, version: Version) -> usize {
        header_len(version) + self.data.len()
    }
}

impl Frame {
    /// Constructs an empty frame appropriate for `fid` under `version`.
    /// Fails if `fid` is not supported under `version` (§4.3/§4.4).
    pub fn new(version: Version, fid: &str) -> ParseResult<Self> {
        let expected_len = match version {
            Version::V22 => 3,
            Version::V23 | Version::V24 => 4,
        };

        if fid.len() != expected_len || !is_valid_fid(fid.as_bytes()) {
            return Err(ParseError::Parameter(format!(
                "\"{}\" is not a valid frame-ID under {:?}",
                fid, version
            )));
        }

        let payload = FramePayload::default_for(fid, version).ok_or_else(|| {
            ParseError::Parameter(format!("frame-ID {} is not supported under {:?}", fid, version))
        })?;

        let raw_flags = match version {
            Version::V22 => None,
            Version::V23 | Version::V24 => Some((0, 0)),
        };

        Ok(Frame {
            fid: fid.to_string(),
            raw_flags,
            payload,
        })
    }

    /// Parses one frame out of `stream`, which is positioned at the start of
    /// a frame header. Returns [`ParsedFrame::Unknown`] (not an error) if the
    /// frame-ID has no registered payload codec, and [`ParsedFrame::Dropped`]
    /// if it is registered but the payload fails to decode; a true `Err`
    /// means the stream itself could not be read (a truncated or garbled
    /// header), which the caller treats as the end of the frame list rather
    /// than aborting the whole tag.
    pub(crate) fn parse(version: Version, stream: &mut BufStream) -> ParseResult<ParsedFrame> {
        let (fid, size, raw_flags) = match version {
            Version::V22 => {
                let id_bytes = stream.read_array::<3>()?;
                if !is_valid_fid(&id_bytes) {
                    return Err(ParseError::HeaderInvalid(
                        "invalid ID3v2.2 frame-ID".to_string(),
                    ));
                }
                let size_bytes = stream.read_array::<3>()?;
                let fid = String::from_utf8(id_bytes.to_vec()).unwrap();
                (fid, raw::to_size24(&size_bytes) as u32, None)
            }
            Version::V23 | Version::V24 => {
                let id_bytes = stream.read_array::<4>()?;
                if !is_valid_fid(&id_bytes) {
                    return Err(ParseError::HeaderInvalid(
                        "invalid ID3v2.3/2.4 frame-ID".to_string(),
                    ));
                }
                let size_bytes = stream.read_array::<4>()?;
                let status = stream.read_u8()?;
                let format = stream.read_u8()?;
                let fid = String::from_utf8(id_bytes.to_vec()).unwrap();
                // Per spec.md §4.1, frame sizes are always read as plain
                // big-endian, never sync-safe-decoded, to tolerate iTunes.
                (fid, raw::to_size(&size_bytes) as u32, Some((status, format)))
            }
        };

        let payload_bytes = stream
            .slice(size as usize)
            .map_err(|_| ParseError::HeaderInvalid(format!("frame {} declares a size past the end of the tag", fid)))?;

        if !crate::id3v2::payload::is_registered(&fid) {
            return Ok(ParsedFrame::Unknown(UnknownFrame {
                fid,
                raw_flags,
                data: payload_bytes.to_vec(),
            }));
        }

        match FramePayload::decode(&fid, version, payload_bytes) {
            Ok(payload) => Ok(ParsedFrame::Frame(Frame {
                fid,
                raw_flags,
                payload,
            })),
            Err(err) => {
                warn!("dropping frame {}: {}", fid, err);
                Ok(ParsedFrame::Dropped)
            }
        }
    }

    /// Serializes this frame: header (with preserved flag bytes) + payload.
    pub(crate) fn serialize(&self, version: Version) -> Vec<u8> {
        let payload = self.payload.encode();
        let mut out = Vec::with_capacity(header_len(version) + payload.len());

        out.extend(self.fid.as_bytes());

        match version {
            Version::V22 => {
                out.extend(raw::from_size24(payload.len() as u32));
            }
            Version::V23 | Version::V24 => {
                out.extend(raw::from_size(payload.len() as u32));
                let (status, format) = self.raw_flags.unwrap_or((0, 0));
                out.push(status);
                out.push(format);
            }
        }

        out.extend(payload);
        out
    }

    /// The serialized length of this frame under `version`: header plus
    /// encoded payload.
    pub(crate) fn serialized_len(&self, version: Version) -> usize {
        header_len(version) + self.payload.encode().len()
    }

    pub fn fid(&self) -> &str {
        &self.fid
    }

    pub fn payload(&self) -> &FramePayload {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut FramePayload {
        &mut self.payload
    }

    pub fn set_payload(&mut self, payload: FramePayload) {
        self.payload = payload;
    }

    /// Decoded flags, reproducing the source's bit-shift quirk (see
    /// [`FrameFlags`]). `None` under ID3v2.2, which carries no frame flags.
    pub fn flags(&self) -> Option<FrameFlags> {
        self.raw_flags.map(|(status, format)| byte_to_flags(status, format))
    }

    /// Sets this frame's flags, re-deriving the two raw bytes through the
    /// same buggy mapping [`byte_to_flags`] reads with. A no-op under
    /// ID3v2.2.
    pub fn set_flags(&mut self, flags: FrameFlags) {
        if self.raw_flags.is_some() {
            self.raw_flags = Some(flags_to_byte(flags));
        }
    }
}
