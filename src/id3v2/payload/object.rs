//! `encapsulated-object` payload shape: `GEOB`/`GEO`.
use crate::core::io::BufStream;
use crate::core::string::{self, Encoding};
use crate::error::ParseResult;
use crate::id3v2::payload::{parse_encoding_byte, render_encoding_byte, FramePayload};

pub(super) fn decode(data: &[u8]) -> ParseResult<FramePayload> {
    let mut stream = BufStream::new(data);
    let encoding = parse_encoding_byte(stream.read_u8()?)?;
    let mime = string::read_terminated(Encoding::Latin1, &mut stream);
    let filename = string::read_terminated(encoding, &mut stream);
    let description = string::read_terminated(encoding, &mut stream);
    let data = stream.take_rest().to_vec();

    Ok(FramePayload::Object {
        encoding,
        mime,
        filename,
        description,
        data,
    })
}

pub(super) fn encode(
    encoding: Encoding,
    mime: &str,
    filename: &str,
    description: &str,
    data: &[u8],
) -> Vec<u8> {
    let mut out = vec![render_encoding_byte(encoding)];
    out.extend(string::render_terminated(Encoding::Latin1, mime));
    out.extend(string::render_terminated(encoding, filename));
    out.extend(string::render_terminated(encoding, description));
    out.extend_from_slice(data);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geob_roundtrip() {
        let encoded = encode(Encoding::Utf16, "text/txt", "Lyrics.lrc", "Lyrics", &[1, 2, 3]);
        let payload = decode(&encoded).unwrap();
        match payload {
            FramePayload::Object {
                mime,
                filename,
                description,
                data,
                ..
            } => {
                assert_eq!(mime, "text/txt");
                assert_eq!(filename, "Lyrics.lrc");
                assert_eq!(description, "Lyrics");
                assert_eq!(data, vec![1, 2, 3]);
            }
            _ => panic!("wrong shape"),
        }
    }
}
