//! `url` payload shape: plain `W***` frames other than `WXXX`/`WXX`.
use crate::core::string::Encoding;
use crate::error::ParseResult;
use crate::id3v2::payload::FramePayload;

pub(super) fn decode(data: &[u8]) -> ParseResult<FramePayload> {
    // No encoding byte, no terminator: the whole payload is a Latin-1 URL.
    let url = crate::core::string::decode_all(Encoding::Latin1, data);
    Ok(FramePayload::Url { url })
}

pub(super) fn encode(url: &str) -> Vec<u8> {
    crate::core::string::render(Encoding::Latin1, url)
}
