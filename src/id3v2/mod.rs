//! ID3v2 tag reading, editing and writing.
//!
//! An ID3v2 tag is a variable-length, frame-oriented header found at the
//! start of an MP3 file, in one of three major versions: 2.2, 2.3, or 2.4.
//! [`Tag`] is the entry point: [`Tag::open`] parses an existing tag (or
//! starts a new one in [`OpenMode::New`]), [`Tag::frames`]/[`Tag::frames_mut`]
//! expose its ordered frame list, and [`Tag::commit`] writes it back.
pub mod frame;
pub mod header;
pub mod payload;
mod syncdata;
mod tag;

pub use crate::core::string::Encoding;
pub use frame::{Frame, FrameFlags, UnknownFrame};
pub use header::{ExtendedHeader, SaveVersion, TagFlags, TagHeader, Version};
pub use payload::{FramePayload, PictureType};
pub use tag::{OpenMode, Tag};
