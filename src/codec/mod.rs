//! The codec primitive driven by [`StreamEncoder`](crate::StreamEncoder).
//!
//! A codec is a stateful compressor bound to one preset. Construction is its `init`, [`Drop`] is
//! its `release`, and [`Codec::process`] is a single step of the buffer handshake.

use crate::{error::ReturnCode, util::PartialBuffer};

#[cfg(feature = "xz")]
mod xz;

#[cfg(feature = "xz")]
pub use self::xz::XzCodec;

/// Mode of a single codec step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Consume input, emit whatever output is ready.
    Run,
    /// Emit all pending data so the output so far is decodable on its own.
    SyncFlush,
    /// Emit all pending data and close the container.
    Finish,
}

/// Outcome of a successful codec step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Progress was made, call again to continue.
    Ok,
    /// The requested flush or finish has completed.
    StreamEnd,
}

/// Abstraction over the compressor engine.
pub trait Codec {
    /// Run one step of the codec.
    ///
    /// Implementations advance `input` by exactly the number of bytes consumed and `output` by
    /// exactly the number of bytes produced. Neither buffer has to be used up in one step.
    fn process(
        &mut self,
        input: &mut PartialBuffer<impl AsRef<[u8]>>,
        output: &mut PartialBuffer<impl AsRef<[u8]> + AsMut<[u8]>>,
        action: Action,
    ) -> Result<Status, ReturnCode>;
}
