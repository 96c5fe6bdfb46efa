//! Error types returned by the tag parsers and the commit engine.
use std::error;
use std::fmt::{self, Display, Formatter};
use std::io;

/// Errors that can occur while parsing an ID3v1 or ID3v2 tag.
///
/// Frame-level failures are never surfaced through this type: a frame whose
/// payload cannot be decoded is logged and dropped, not raised. Only errors
/// that abort the whole tag reach the caller.
#[derive(Debug)]
pub enum ParseError {
    /// The `"ID3"`/`"TAG"` magic was missing, or the header was truncated.
    HeaderInvalid(String),
    /// The tag declares a version or extension-header shape this crate does
    /// not understand.
    NotImplemented(String),
    /// A caller-supplied argument (path, open mode, frame-ID under a given
    /// version) was invalid. This is a caller error, not a wire-format error.
    Parameter(String),
    /// A frame's payload could not be decoded under its declared codec.
    /// Exposed so a fallible-tag-level operation can report it, but this
    /// variant never aborts frame list iteration on its own.
    PayloadDecode(String),
    /// An underlying I/O failure.
    Io(io::Error),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            ParseError::HeaderInvalid(msg) => write!(f, "invalid tag header: {}", msg),
            ParseError::NotImplemented(msg) => write!(f, "not implemented: {}", msg),
            ParseError::Parameter(msg) => write!(f, "invalid parameter: {}", msg),
            ParseError::PayloadDecode(msg) => write!(f, "could not decode frame payload: {}", msg),
            ParseError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl error::Error for ParseError {}

impl From<io::Error> for ParseError {
    fn from(err: io::Error) -> Self {
        ParseError::Io(err)
    }
}

/// Errors that can occur while committing a tag back to disk.
#[derive(Debug)]
pub enum SaveError {
    /// The header currently on disk could not be re-read before splicing.
    HeaderInvalid(String),
    /// The requested save shape (e.g. a version this crate cannot render)
    /// is not implemented.
    NotImplemented(String),
    /// A caller-supplied argument was invalid.
    Parameter(String),
    /// An underlying I/O failure.
    Io(io::Error),
}

impl Display for SaveError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            SaveError::HeaderInvalid(msg) => write!(f, "invalid tag header: {}", msg),
            SaveError::NotImplemented(msg) => write!(f, "not implemented: {}", msg),
            SaveError::Parameter(msg) => write!(f, "invalid parameter: {}", msg),
            SaveError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl error::Error for SaveError {}

impl From<io::Error> for SaveError {
    fn from(err: io::Error) -> Self {
        SaveError::Io(err)
    }
}

pub(crate) type ParseResult<T> = Result<T, ParseError>;
pub(crate) type SaveResult<T> = Result<T, SaveError>;
