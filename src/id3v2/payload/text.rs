//! `text` and `user-text` payload shapes.
use crate::core::io::BufStream;
use crate::core::string::{self, Encoding};
use crate::error::ParseResult;
use crate::id3v2::header::Version;
use crate::id3v2::payload::{parse_encoding_byte, render_encoding_byte, FramePayload};

pub(super) fn decode_text(version: Version, data: &[u8]) -> ParseResult<FramePayload> {
    let mut stream = BufStream::new(data);
    let encoding = parse_encoding_byte(stream.read_u8()?)?;

    let values = if version == Version::V24 {
        parse_segments(encoding, &mut stream)
    } else {
        // v2.2/v2.3 carry a single string occupying the rest of the
        // payload. This reads to the end rather than searching for a
        // terminator: a double-byte encoding's interior NUL codepoint
        // renders as the same two zero bytes as a genuine terminator, at
        // the same segment-relative alignment, so no terminator search
        // could tell the two apart (scenario 6, spec.md §8).
        let first = string::read(encoding, &mut stream);
        vec![first]
    };

    Ok(FramePayload::Text { encoding, values })
}

fn parse_segments(encoding: Encoding, stream: &mut BufStream) -> Vec<String> {
    let mut values = Vec::new();

    while !stream.is_empty() {
        let value = string::read_terminated(encoding, stream);
        if !value.is_empty() || !stream.is_empty() {
            values.push(value);
        }
    }

    if values.is_empty() {
        values.push(String::new());
    }

    values
}

pub(super) fn encode_text(encoding: Encoding, values: &[String]) -> Vec<u8> {
    let mut out = vec![render_encoding_byte(encoding)];

    for (i, value) in values.iter().enumerate() {
        if i + 1 < values.len() {
            out.extend(string::render_terminated(encoding, value));
        } else {
            out.extend(string::render(encoding, value));
        }
    }

    out
}

pub(super) fn decode_user_text(data: &[u8], is_url: bool) -> ParseResult<FramePayload> {
    let mut stream = BufStream::new(data);
    let encoding = parse_encoding_byte(stream.read_u8()?)?;
    let description = string::read_terminated(encoding, &mut stream);

    let value = if is_url {
        string::read(Encoding::Latin1, &mut stream)
    } else {
        string::read(encoding, &mut stream)
    };

    Ok(FramePayload::UserText {
        encoding,
        description,
        value,
        url: is_url,
    })
}

pub(super) fn encode_user_text(
    encoding: Encoding,
    description: &str,
    value: &str,
    is_url: bool,
) -> Vec<u8> {
    let mut out = vec![render_encoding_byte(encoding)];
    out.extend(string::render_terminated(encoding, description));

    if is_url {
        out.extend(string::render(Encoding::Latin1, value));
    } else {
        out.extend(string::render(encoding, value));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_single_segment_v23() {
        let mut data = vec![3u8];
        data.extend(b"Hello");
        let payload = decode_text(Version::V23, &data).unwrap();
        match payload {
            FramePayload::Text { values, .. } => assert_eq!(values, vec!["Hello".to_string()]),
            _ => panic!("wrong shape"),
        }
    }

    #[test]
    fn decode_preserves_embedded_nul_under_v23() {
        // A single v2.2/v2.3 text value reads to the end of the payload
        // rather than stopping at the first terminator, so an interior NUL
        // codepoint survives instead of truncating the value (scenario 6,
        // spec.md §8).
        let mut data = vec![0u8];
        data.extend(b"Rock\0Electronica");
        let payload = decode_text(Version::V23, &data).unwrap();
        match payload {
            FramePayload::Text { values, .. } => {
                assert_eq!(values, vec!["Rock\u{0}Electronica".to_string()])
            }
            _ => panic!("wrong shape"),
        }
    }

    #[test]
    fn decode_multiple_segments_v24() {
        let mut data = vec![0u8];
        data.extend(b"Rock\0Electronica");
        let payload = decode_text(Version::V24, &data).unwrap();
        match payload {
            FramePayload::Text { values, .. } => {
                assert_eq!(values, vec!["Rock".to_string(), "Electronica".to_string()])
            }
            _ => panic!("wrong shape"),
        }
    }

    #[test]
    fn user_text_roundtrip() {
        let encoded = encode_user_text(Encoding::Latin1, "replaygain_track_gain", "-7.4 dB", false);
        let payload = decode_user_text(&encoded, false).unwrap();
        match payload {
            FramePayload::UserText {
                description, value, ..
            } => {
                assert_eq!(description, "replaygain_track_gain");
                assert_eq!(value, "-7.4 dB");
            }
            _ => panic!("wrong shape"),
        }
    }

    #[test]
    fn user_url_value_is_always_latin1() {
        let encoded = encode_user_text(Encoding::Utf16, "id", "https://id3.org", true);
        let payload = decode_user_text(&encoded, true).unwrap();
        match payload {
            FramePayload::UserText { value, .. } => assert_eq!(value, "https://id3.org"),
            _ => panic!("wrong shape"),
        }
    }

    #[test]
    fn decode_text_does_not_itself_validate_encoding_byte_against_version() {
        // Rejecting a v2.3 frame with a UTF-8 encoding byte happens one
        // layer up, in `FramePayload::decode`, which must preserve the
        // frame as opaque rather than drop it (spec.md §4.2). This codec
        // only cares about whether the encoding byte names a known
        // encoding at all.
        let mut data = vec![3u8];
        data.extend(b"Hello");
        let payload = decode_text(Version::V23, &data).unwrap();
        match payload {
            FramePayload::Text { values, .. } => assert_eq!(values, vec!["Hello".to_string()]),
            _ => panic!("wrong shape"),
        }
    }
}
