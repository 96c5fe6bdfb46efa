//! `comment / lyrics` payload shape: `COMM`/`COM` and `USLT`/`ULT`.
use crate::core::io::BufStream;
use crate::core::string::{self, Encoding};
use crate::error::ParseResult;
use crate::id3v2::payload::{parse_encoding_byte, render_encoding_byte, FramePayload};

pub(super) fn decode(data: &[u8]) -> ParseResult<FramePayload> {
    let mut stream = BufStream::new(data);
    let encoding = parse_encoding_byte(stream.read_u8()?)?;
    let language = stream.read_array::<3>()?;
    let description = string::read_terminated(encoding, &mut stream);
    let text = string::read(encoding, &mut stream);

    Ok(FramePayload::Comment {
        encoding,
        language,
        description,
        text,
    })
}

pub(super) fn encode(encoding: Encoding, language: &[u8; 3], description: &str, text: &str) -> Vec<u8> {
    let mut out = vec![render_encoding_byte(encoding)];
    out.extend_from_slice(language);
    out.extend(string::render_terminated(encoding, description));
    out.extend(string::render(encoding, text));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_roundtrip() {
        let encoded = encode(Encoding::Utf8, b"eng", "Description", "Text");
        let payload = decode(&encoded).unwrap();
        match payload {
            FramePayload::Comment {
                language,
                description,
                text,
                ..
            } => {
                assert_eq!(&language, b"eng");
                assert_eq!(description, "Description");
                assert_eq!(text, "Text");
            }
            _ => panic!("wrong shape"),
        }
    }
}
