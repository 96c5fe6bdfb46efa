//! The ID3v2 tag container: header, optional extension header, ordered
//! frame list, padding accounting, and the commit engine that writes
//! mutations back to disk.
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::core::io::BufStream;
use crate::error::{ParseResult, SaveError, SaveResult};
use crate::id3v2::frame::{Frame, ParsedFrame, UnknownFrame};
use crate::id3v2::header::{ExtendedHeader, SaveVersion, TagFlags, TagHeader, Version};

/// Bytes of padding appended on the splice (slow) commit path, per spec.md
/// §4.6/§6.
const DEFAULT_PADDING: u32 = 2048;

/// The mode a [`Tag`] is opened in.
#[derive(Clone, Copy, Debug)]
pub enum OpenMode {
    /// Parse an existing tag; fails with `HeaderInvalid` if none is found.
    Read,
    /// Same parse as `Read`, but signals intent to [`Tag::commit`] later.
    /// The library does not currently enforce any behavioral difference
    /// between `Read` and `Modify` beyond this intent (see DESIGN.md).
    Modify,
    /// Start a brand-new, empty tag at the given version. Nothing is read
    /// from `path`; `path` becomes the target of a later [`Tag::commit`].
    New(SaveVersion),
}

/// An ID3v2 tag bound to a file path.
///
/// A `Tag` is produced by [`Tag::open`], either by parsing an existing tag
/// or by starting a new empty one. [`Tag::frames`]/[`Tag::frames_mut`]
/// expose the ordered frame list for the caller to mutate; nothing touches
/// disk until [`Tag::commit`].
#[derive(Debug)]
pub struct Tag {
    path: PathBuf,
    header_found: bool,
    version: Version,
    flags: TagFlags,
    ext_header: Option<ExtendedHeader>,
    frames: Vec<Frame>,
    /// Frames whose ID parsed but for which no payload codec is registered
    /// (§3). Preserved verbatim and re-serialized on every commit, in their
    /// original position relative to each other (but after all decoded
    /// frames, since the two lists are no longer interleaved once split).
    unknown_frames: Vec<UnknownFrame>,
    /// Advisory; recomputed on every commit. Counts trailing null bytes
    /// inside the declared tag region.
    padding: u32,
    /// The declared tag body size: bytes between the end of the 10-byte
    /// header and the start of the audio body (or footer).
    size: u32,
}

impl Tag {
    /// Opens `path` under `mode`. `Read`/`Modify` parse the tag header (and,
    /// if present, the extension header and frame list) from the file;
    /// `New` initializes an empty tag without touching the file.
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> ParseResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let OpenMode::New(version) = mode {
            return Ok(Tag {
                path,
                header_found: false,
                version: Version::from(version),
                flags: TagFlags::default(),
                ext_header: None,
                frames: Vec::new(),
                unknown_frames: Vec::new(),
                padding: 0,
                size: 0,
            });
        }

        let mut file = File::open(&path)?;

        let mut header_raw = [0u8; 10];
        file.read_exact(&mut header_raw)?;
        let header = TagHeader::parse(&header_raw)?;

        let mut body = vec![0u8; header.size() as usize];
        let read = file.read(&mut body)?;
        body.truncate(read);

        let mut stream = BufStream::new(&body);
        let mut flags = header.flags();

        // header.flags().extended is only ever set for v2.3/v2.4;
        // TagHeader::parse always forces it false under v2.2.
        let mut ext_header = None;
        if flags.extended {
            let ext_bytes = stream.peek(0..stream.remaining()).unwrap_or(&[]);
            match ExtendedHeader::parse(header.version(), ext_bytes) {
                Ok(parsed) => {
                    let _ = stream.skip(parsed.size() as usize);
                    ext_header = Some(parsed);
                }
                Err(_) => {
                    // Some taggers flip the bit without writing a body for
                    // it; tolerate that rather than failing the whole tag.
                    info!("resetting incorrectly-set extension header flag");
                    flags.extended = false;
                }
            }
        }

        let (frames, unknown_frames, padding) = parse_frames(header.version(), &mut stream);

        Ok(Tag {
            path,
            header_found: true,
            version: header.version(),
            flags,
            ext_header,
            frames,
            unknown_frames,
            padding,
            size: header.size(),
        })
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn flags(&self) -> TagFlags {
        self.flags
    }

    pub fn extended_header(&self) -> Option<&ExtendedHeader> {
        self.ext_header.as_ref()
    }

    /// The tag's declared body size: `sum(serialized_length(frame)) +
    /// padding` (frame bytes plus any unused space inside the region). This
    /// is only refreshed by a successful parse or a non-pretend commit.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn padding(&self) -> u32 {
        self.padding
    }

    /// Whether a valid ID3v2 header was parsed. Always `false` for a tag
    /// opened with [`OpenMode::New`].
    pub fn tag_exists(&self) -> bool {
        self.header_found
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// The mutable, ordered frame list. Nothing here touches the file until
    /// [`Tag::commit`].
    pub fn frames_mut(&mut self) -> &mut Vec<Frame> {
        &mut self.frames
    }

    /// The first frame with frame-ID `id`, if any.
    pub fn get(&self, id: &str) -> Option<&Frame> {
        self.frames.iter().find(|frame| frame.fid() == id)
    }

    /// Every frame with frame-ID `id`, in order. Frame-IDs such as `TXXX`
    /// legitimately repeat (§3), so this returns a `Vec` rather than a
    /// single optional frame.
    pub fn get_all(&self, id: &str) -> Vec<&Frame> {
        self.frames.iter().filter(|frame| frame.fid() == id).collect()
    }

    /// Removes every frame with frame-ID `id`, decoded or unknown. Nothing
    /// is written to disk until [`Tag::commit`].
    pub fn remove_all(&mut self, id: &str) {
        self.frames.retain(|frame| frame.fid() != id);
        self.unknown_frames.retain(|frame| frame.fid() != id);
    }

    /// Frames whose ID parsed but which carry no payload codec (§3). These
    /// are read-only: there is no decoded shape to mutate, only the raw
    /// bytes [`UnknownFrame::data`] exposes. They round-trip through
    /// [`Tag::commit`] untouched unless removed with [`Tag::remove_all`].
    pub fn unknown_frames(&self) -> &[UnknownFrame] {
        &self.unknown_frames
    }

    /// Commits the in-memory frame list to disk.
    ///
    /// If the serialized frames (plus the always-empty extension header
    /// stub) fit inside the tag's currently declared region, the existing
    /// region is overwritten in place and the audio body is left untouched
    /// (the fast path). Otherwise the file is spliced: the trailing audio
    /// body is shuffled past a freshly sized region with
    /// [`DEFAULT_PADDING`] bytes of slack (the slow path).
    ///
    /// `pretend = true` performs all serialization and size accounting
    /// without writing to disk; used for dry-run validation.
    pub fn commit(&mut self, pretend: bool) -> SaveResult<()> {
        let save_version = match self.version {
            Version::V22 => {
                return Err(SaveError::NotImplemented(
                    "ID3v2.2 tags cannot be written; construct a new tag at ID3v2.3 or ID3v2.4"
                        .to_string(),
                ))
            }
            Version::V23 => SaveVersion::V23,
            Version::V24 => SaveVersion::V24,
        };

        let mut frame_bytes = Vec::new();
        for frame in &self.frames {
            frame_bytes.extend(frame.serialize(self.version));
        }
        for unknown in &self.unknown_frames {
            frame_bytes.extend(unknown.serialize(self.version));
        }

        // The extension header and footer are preserve-verbatim-on-read,
        // clear-on-write: this crate never emits a populated one.
        let ext_bytes: Vec<u8> = Vec::new();
        let required = ext_bytes.len() as u32 + frame_bytes.len() as u32;
        // A tag that was never found on disk (OpenMode::New, or a file with
        // no existing ID3v2 region) has no "current region" to overwrite in
        // place: the fast path's size comparison would otherwise compare
        // against a stale `size` of 0 and either corrupt the first bytes of
        // the file (size 0 happens to be >= required) or fall into the slow
        // path with an `old_region_end` that assumes a header that was
        // never there. Such a tag always takes the slow (insert) path, with
        // nothing to skip past at the front of the file.
        let old_region_end = if self.header_found {
            10u64 + self.size as u64 + if self.flags.footer { 10 } else { 0 }
        } else {
            0
        };

        let had_footer = self.flags.footer;

        self.flags.extended = false;
        self.flags.experimental = false;
        self.flags.unsync = false;
        self.flags.footer = false;

        if self.header_found && required <= self.size {
            if !pretend {
                self.commit_fast_path(save_version, &ext_bytes, &frame_bytes, required, had_footer)?;
            }
            self.padding = self.size - required;
        } else {
            let new_size = required + DEFAULT_PADDING;

            if !pretend {
                self.commit_slow_path(
                    save_version,
                    &ext_bytes,
                    &frame_bytes,
                    required,
                    new_size,
                    old_region_end,
                )?;
            }

            self.size = new_size;
            self.padding = new_size - required;
        }

        self.header_found = true;

        Ok(())
    }

    /// `had_footer` is the footer bit as it stood on the tag *before*
    /// `commit` cleared it (this crate never writes one back). A tag parsed
    /// with a footer present has its audio body starting 10 bytes further
    /// into the file than the header + declared size alone would suggest;
    /// skipping that gap here too (the slow path already accounts for it
    /// via `old_region_end`) keeps those 10 bytes from being left behind as
    /// stale footer data sitting in front of the audio.
    fn commit_fast_path(
        &self,
        save_version: SaveVersion,
        ext_bytes: &[u8],
        frame_bytes: &[u8],
        required: u32,
        had_footer: bool,
    ) -> SaveResult<()> {
        let mut file = OpenOptions::new().read(true).write(true).open(&self.path)?;
        let header_and_body_len = 10u64 + self.size as u64;

        if had_footer {
            let old_footer_end = header_and_body_len + 10;
            file.seek(SeekFrom::Start(old_footer_end))?;
            let mut audio_body = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = file.read(&mut chunk)?;
                if n == 0 {
                    break;
                }
                audio_body.extend_from_slice(&chunk[..n]);
            }

            file.seek(SeekFrom::Start(0))?;
            file.write_all(&TagHeader::render(save_version, self.size, false))?;
            file.write_all(ext_bytes)?;
            file.write_all(frame_bytes)?;
            file.write_all(&vec![0u8; (self.size - required) as usize])?;
            file.write_all(&audio_body)?;
            file.set_len(header_and_body_len + audio_body.len() as u64)?;
        } else {
            file.seek(SeekFrom::Start(0))?;
            file.write_all(&TagHeader::render(save_version, self.size, false))?;
            file.write_all(ext_bytes)?;
            file.write_all(frame_bytes)?;
            file.write_all(&vec![0u8; (self.size - required) as usize])?;
        }

        file.flush()?;

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn commit_slow_path(
        &self,
        save_version: SaveVersion,
        ext_bytes: &[u8],
        frame_bytes: &[u8],
        required: u32,
        new_size: u32,
        old_region_end: u64,
    ) -> SaveResult<()> {
        let mut audio_body = Vec::new();
        if let Ok(mut existing) = OpenOptions::new().read(true).open(&self.path) {
            let len = existing.metadata()?.len();
            if len > old_region_end {
                existing.seek(SeekFrom::Start(old_region_end))?;
                let mut chunk = [0u8; 1024];
                loop {
                    let n = existing.read(&mut chunk)?;
                    if n == 0 {
                        break;
                    }
                    audio_body.extend_from_slice(&chunk[..n]);
                }
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;

        file.write_all(&TagHeader::render(save_version, new_size, false))?;
        file.write_all(ext_bytes)?;
        file.write_all(frame_bytes)?;
        file.write_all(&vec![0u8; (new_size - required) as usize])?;

        for chunk in audio_body.chunks(1024) {
            file.write_all(chunk)?;
        }

        file.flush()?;

        Ok(())
    }
}

/// Iterates frames until `stream` is exhausted or a null byte (the start of
/// padding) is encountered. Malformed registered frames are dropped and
/// unregistered frame-IDs are set aside as [`UnknownFrame`]s; neither aborts
/// the loop. A truncated trailing frame header simply ends the loop early,
/// with everything from that point on counted as padding.
fn parse_frames(version: Version, stream: &mut BufStream) -> (Vec<Frame>, Vec<UnknownFrame>, u32) {
    let mut frames = Vec::new();
    let mut unknown_frames = Vec::new();

    loop {
        if stream.is_empty() {
            break;
        }

        match stream.peek(0..1) {
            Ok(byte) if byte[0] == 0 => break,
            Ok(_) => {}
            Err(_) => break,
        }

        match Frame::parse(version, stream) {
            Ok(ParsedFrame::Frame(frame)) => frames.push(frame),
            Ok(ParsedFrame::Unknown(unknown)) => unknown_frames.push(unknown),
            Ok(ParsedFrame::Dropped) => {}
            Err(err) => {
                warn!("stopping frame parse early: {}", err);
                break;
            }
        }
    }

    let padding = stream.take_rest().len() as u32;
    (frames, unknown_frames, padding)
}
