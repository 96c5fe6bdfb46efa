//! `picture` (APIC) and `picture v2.2` (PIC) payload shapes.
use crate::core::io::BufStream;
use crate::core::string::{self, Encoding};
use crate::error::ParseResult;
use crate::id3v2::payload::{parse_encoding_byte, render_encoding_byte, FramePayload};

byte_enum! {
    /// The `picture-type` byte shared by `APIC` and `PIC`.
    pub enum PictureType {
        Other = 0x00,
        FileIcon = 0x01,
        OtherFileIcon = 0x02,
        FrontCover = 0x03,
        BackCover = 0x04,
        LeafletPage = 0x05,
        Media = 0x06,
        LeadArtist = 0x07,
        Artist = 0x08,
        Conductor = 0x09,
        Band = 0x0A,
        Composer = 0x0B,
        Lyricist = 0x0C,
        RecordingLocation = 0x0D,
        DuringRecording = 0x0E,
        DuringPerformance = 0x0F,
        MovieScreenCapture = 0x10,
        ABrightColouredFish = 0x11,
        Illustration = 0x12,
        BandLogotype = 0x13,
        PublisherLogo = 0x14,
    };
    PictureType::Other
}

pub(super) fn decode(data: &[u8]) -> ParseResult<FramePayload> {
    let mut stream = BufStream::new(data);
    let encoding = parse_encoding_byte(stream.read_u8()?)?;

    // An empty MIME field is preserved as-is; it is only defaulted to
    // "image/" when a new frame is constructed (`default_for`), not here,
    // so a parsed-then-re-encoded frame round-trips exactly (spec.md §4.3).
    let mime = string::read_terminated(Encoding::Latin1, &mut stream);

    let picture_type = PictureType::parse(stream.read_u8()?);
    let description = string::read_terminated(encoding, &mut stream);
    let data = stream.take_rest().to_vec();

    Ok(FramePayload::Picture {
        encoding,
        mime,
        picture_type,
        description,
        data,
    })
}

pub(super) fn encode(
    encoding: Encoding,
    mime: &str,
    picture_type: PictureType,
    description: &str,
    data: &[u8],
) -> Vec<u8> {
    let mut out = vec![render_encoding_byte(encoding)];
    out.extend(string::render_terminated(Encoding::Latin1, mime));
    out.push(picture_type as u8);
    out.extend(string::render_terminated(encoding, description));
    out.extend_from_slice(data);
    out
}

pub(super) fn decode_v2(data: &[u8]) -> ParseResult<FramePayload> {
    let mut stream = BufStream::new(data);
    let encoding = parse_encoding_byte(stream.read_u8()?)?;
    let format = stream.read_array::<3>()?;
    let picture_type = PictureType::parse(stream.read_u8()?);
    let description = string::read_terminated(encoding, &mut stream);
    let data = stream.take_rest().to_vec();

    Ok(FramePayload::PictureV2 {
        encoding,
        format,
        picture_type,
        description,
        data,
    })
}

pub(super) fn encode_v2(
    encoding: Encoding,
    format: &[u8; 3],
    picture_type: PictureType,
    description: &str,
    data: &[u8],
) -> Vec<u8> {
    let mut out = vec![render_encoding_byte(encoding)];
    out.extend_from_slice(format);
    out.push(picture_type as u8);
    out.extend(string::render_terminated(encoding, description));
    out.extend_from_slice(data);
    out
}
