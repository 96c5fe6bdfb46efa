//! Text encodings used by ID3v2 frame payloads.
use crate::core::io::BufStream;

/// The four text encodings an ID3v2 frame may declare in its leading
/// encoding byte.
///
/// Public despite living in a private module: it appears in the public
/// [`FramePayload`](crate::id3v2::FramePayload) variants, so callers need to
/// be able to name and construct it. Re-exported as `id3kit::id3v2::Encoding`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Encoding {
    Latin1,
    Utf16,
    Utf16Be,
    Utf8,
    /// Write-only. No frame in this crate's dispatch table ever needs to
    /// *read* bare little-endian UTF-16 without a BOM; this variant exists
    /// so callers that construct one collapse to `Utf16` on render.
    Utf16Le,
}

impl Default for Encoding {
    fn default() -> Self {
        Encoding::Utf8
    }
}

impl Encoding {
    /// The width, in bytes, of this encoding's NUL terminator.
    pub(crate) fn nul_size(self) -> usize {
        match self {
            Encoding::Latin1 | Encoding::Utf8 => 1,
            Encoding::Utf16 | Encoding::Utf16Be | Encoding::Utf16Le => 2,
        }
    }
}

/// Reads a string occupying the rest of `stream`.
pub(crate) fn read(encoding: Encoding, stream: &mut BufStream) -> String {
    decode(encoding, stream.take_rest())
}

/// Decodes a complete byte slice (no terminator search) as `encoding`.
pub(crate) fn decode_all(encoding: Encoding, data: &[u8]) -> String {
    decode(encoding, data)
}

/// Reads a NUL-terminated string from `stream`, consuming the terminator.
///
/// For double-byte encodings the terminator is a `0x00 0x00` pair that is
/// aligned to the *start of this string*, not to the start of the overall
/// stream: a frame that begins its string segment at an odd stream offset
/// must still scan in two-byte steps counted from that offset, or an
/// embedded ASCII NUL inside otherwise-unpaired bytes can be mistaken for
/// the terminator.
pub(crate) fn read_terminated(encoding: Encoding, stream: &mut BufStream) -> String {
    let nul_size = encoding.nul_size();
    let data = if nul_size == 1 {
        search_single(stream)
    } else {
        search_double(stream)
    };

    decode(encoding, data)
}

fn search_single<'a>(stream: &mut BufStream<'a>) -> &'a [u8] {
    let mut len = 0;

    while let Ok(byte) = stream.peek(len..len + 1) {
        if byte[0] == 0 {
            let data = stream.slice(len).unwrap_or(&[]);
            let _ = stream.skip(1);
            return data;
        }

        len += 1;
    }

    stream.take_rest()
}

fn search_double<'a>(stream: &mut BufStream<'a>) -> &'a [u8] {
    let mut len = 0;

    while let Ok(pair) = stream.peek(len..len + 2) {
        if pair == [0, 0] {
            let data = stream.slice(len).unwrap_or(&[]);
            let _ = stream.skip(2);
            return data;
        }

        len += 2;
    }

    stream.take_rest()
}

/// Renders `string` without a trailing terminator.
pub(crate) fn render(encoding: Encoding, string: &str) -> Vec<u8> {
    match encoding {
        Encoding::Latin1 => encode_latin1(string),
        Encoding::Utf16 => encode_utf16(string),
        Encoding::Utf16Be => encode_utf16be(string),
        Encoding::Utf16Le => encode_utf16le(string),
        Encoding::Utf8 => string.as_bytes().to_vec(),
    }
}

/// Renders `string` followed by a terminator appropriate for `encoding`.
pub(crate) fn render_terminated(encoding: Encoding, string: &str) -> Vec<u8> {
    let mut out = render(encoding, string);
    out.extend(std::iter::repeat(0).take(encoding.nul_size()));
    out
}

fn decode(encoding: Encoding, data: &[u8]) -> String {
    // Tolerate trailing padding some taggers leave inside the string bounds.
    let trimmed = trim_nul(encoding, data);

    match encoding {
        Encoding::Latin1 => decode_latin1(trimmed),
        Encoding::Utf16 => decode_utf16(trimmed),
        Encoding::Utf16Be => decode_utf16be(trimmed),
        Encoding::Utf16Le => decode_utf16le(trimmed),
        Encoding::Utf8 => String::from_utf8_lossy(trimmed).into_owned(),
    }
}

fn trim_nul(encoding: Encoding, data: &[u8]) -> &[u8] {
    match encoding.nul_size() {
        1 => {
            let mut end = data.len();
            while end > 0 && data[end - 1] == 0 {
                end -= 1;
            }
            &data[..end]
        }
        _ => {
            let mut end = data.len();
            while end >= 2 && data[end - 2] == 0 && data[end - 1] == 0 {
                end -= 2;
            }
            &data[..end]
        }
    }
}

fn decode_latin1(data: &[u8]) -> String {
    data.iter().map(|&b| b as char).collect()
}

fn encode_latin1(string: &str) -> Vec<u8> {
    string.chars().map(|c| c as u32 as u8).collect()
}

fn decode_utf16(data: &[u8]) -> String {
    if data.len() >= 2 && data[0] == 0xFF && data[1] == 0xFE {
        decode_utf16le(&data[2..])
    } else if data.len() >= 2 && data[0] == 0xFE && data[1] == 0xFF {
        decode_utf16be(&data[2..])
    } else {
        // No BOM. Assume big-endian, per the ID3v2 fallback rule.
        decode_utf16be(data)
    }
}

fn encode_utf16(string: &str) -> Vec<u8> {
    let mut out = vec![0xFF, 0xFE];
    out.extend(encode_utf16le(string));
    out
}

fn decode_utf16be(data: &[u8]) -> String {
    let units: Vec<u16> = data
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

fn encode_utf16be(string: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for unit in string.encode_utf16() {
        out.extend(unit.to_be_bytes());
    }
    out
}

fn decode_utf16le(data: &[u8]) -> String {
    let units: Vec<u16> = data
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

fn encode_utf16le(string: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for unit in string.encode_utf16() {
        out.extend(unit.to_le_bytes());
    }
    out
}
