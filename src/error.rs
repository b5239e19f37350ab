//! Error types returned by [`StreamEncoder`](crate::StreamEncoder).

use std::{collections::TryReserveError, fmt, io};

/// Result alias used throughout this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Status code reported by a codec, using liblzma's `lzma_ret` numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReturnCode(pub u32);

impl ReturnCode {
    pub const OK: Self = Self(0);
    pub const STREAM_END: Self = Self(1);
    pub const NO_CHECK: Self = Self(2);
    pub const UNSUPPORTED_CHECK: Self = Self(3);
    pub const GET_CHECK: Self = Self(4);
    pub const MEM_ERROR: Self = Self(5);
    pub const MEMLIMIT_ERROR: Self = Self(6);
    pub const FORMAT_ERROR: Self = Self(7);
    pub const OPTIONS_ERROR: Self = Self(8);
    pub const DATA_ERROR: Self = Self(9);
    pub const BUF_ERROR: Self = Self(10);
    pub const PROG_ERROR: Self = Self(11);

    /// Symbolic name of the code, if it is one liblzma defines.
    pub fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::OK => "LZMA_OK",
            Self::STREAM_END => "LZMA_STREAM_END",
            Self::NO_CHECK => "LZMA_NO_CHECK",
            Self::UNSUPPORTED_CHECK => "LZMA_UNSUPPORTED_CHECK",
            Self::GET_CHECK => "LZMA_GET_CHECK",
            Self::MEM_ERROR => "LZMA_MEM_ERROR",
            Self::MEMLIMIT_ERROR => "LZMA_MEMLIMIT_ERROR",
            Self::FORMAT_ERROR => "LZMA_FORMAT_ERROR",
            Self::OPTIONS_ERROR => "LZMA_OPTIONS_ERROR",
            Self::DATA_ERROR => "LZMA_DATA_ERROR",
            Self::BUF_ERROR => "LZMA_BUF_ERROR",
            Self::PROG_ERROR => "LZMA_PROG_ERROR",
            _ => return None,
        })
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name} ({})", self.0),
            None => write!(f, "unknown status {}", self.0),
        }
    }
}

/// Errors surfaced by an encoding session.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The codec refused to initialize, e.g. because the preset is unsupported or memory ran out.
    #[error("codec initialization failed: {0}")]
    CodecInit(ReturnCode),

    /// A codec step failed while feeding, flushing or finishing.
    #[error("codec step failed: {0}")]
    CodecRun(ReturnCode),

    /// The scratch output buffer could not be allocated.
    #[error("failed to allocate scratch buffer")]
    Resource(#[from] TryReserveError),

    /// The session was already finished and its codec released.
    #[error("encoder used after finish")]
    Finished,

    /// An earlier codec step failed, the session can't be used anymore.
    #[error("encoder unusable after earlier failure: {0}")]
    Poisoned(ReturnCode),
}

impl Error {
    /// Status code of the underlying codec failure, if there was one.
    pub fn return_code(&self) -> Option<ReturnCode> {
        match self {
            Self::CodecInit(code) | Self::CodecRun(code) | Self::Poisoned(code) => Some(*code),
            Self::Resource(_) | Self::Finished => None,
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        let kind = match err {
            Error::Resource(_) => io::ErrorKind::OutOfMemory,
            Error::Finished => io::ErrorKind::BrokenPipe,
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}
