#[macro_use]
pub(crate) mod macros;
pub(crate) mod io;
pub(crate) mod raw;
pub(crate) mod string;

pub(crate) use io::BufStream;
pub(crate) use string::Encoding;
