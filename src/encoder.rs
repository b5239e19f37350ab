use std::fmt;

use tracing::{debug, trace, warn};

use crate::{
    codec::{Action, Codec, Status},
    error::{Error, Result, ReturnCode},
    util::PartialBuffer,
};

#[cfg(feature = "xz")]
use crate::{codec::XzCodec, Level};

/// Scratch capacity used while feeding input.
const RUN_BUFFER_SIZE: usize = 64 * 1024;
/// Scratch capacity used while flushing or finishing.
const FLUSH_BUFFER_SIZE: usize = 4 * 1024;

/// Lifecycle phase of a [`StreamEncoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Accepting `feed`, `flush_sync` and `finish`.
    Active,
    /// A codec step failed, every further call errors.
    Poisoned,
    /// `finish` completed and the codec has been released.
    Finished,
}

/// Incremental encoder session owning one codec state.
///
/// The concatenation of everything returned by [`feed`](Self::feed),
/// [`flush_sync`](Self::flush_sync) and [`finish`](Self::finish) is one complete compressed
/// stream. The codec is released exactly once: by `finish`, or when the session is dropped.
///
/// ```
/// # fn main() -> xz_sync_stream::Result<()> {
/// use xz_sync_stream::StreamEncoder;
///
/// let mut encoder = StreamEncoder::new()?;
/// let mut compressed = encoder.feed(b"first line\n")?;
/// compressed.extend(encoder.flush_sync()?);
/// // `compressed` can already be decoded up to "first line\n".
/// compressed.extend(encoder.feed(b"second line\n")?);
/// compressed.extend(encoder.finish()?);
/// # Ok(())
/// # }
/// ```
pub struct StreamEncoder<C: Codec = DefaultCodec> {
    codec: Option<C>,
    failure: Option<ReturnCode>,
    total_in: u64,
    total_out: u64,
}

#[cfg(feature = "xz")]
#[doc(hidden)]
pub type DefaultCodec = XzCodec;

/// Placeholder default when no codec backend is compiled in.
#[cfg(not(feature = "xz"))]
#[doc(hidden)]
#[derive(Debug)]
pub enum DefaultCodec {}

#[cfg(not(feature = "xz"))]
impl Codec for DefaultCodec {
    fn process(
        &mut self,
        _input: &mut PartialBuffer<impl AsRef<[u8]>>,
        _output: &mut PartialBuffer<impl AsRef<[u8]> + AsMut<[u8]>>,
        _action: Action,
    ) -> Result<Status, ReturnCode> {
        match *self {}
    }
}

impl<C: Codec> fmt::Debug for StreamEncoder<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamEncoder")
            .field("phase", &self.phase())
            .field("total_in", &self.total_in)
            .field("total_out", &self.total_out)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "xz")]
impl StreamEncoder<XzCodec> {
    /// Create a session with the default preset (6).
    pub fn new() -> Result<Self> {
        Self::with_level(Level::Default)
    }

    /// Create a session with an explicit liblzma preset, conventionally 0-9.
    pub fn with_preset(preset: u32) -> Result<Self> {
        let codec = XzCodec::new(preset).map_err(Error::CodecInit)?;
        debug!(preset, "created xz encoder");
        Ok(Self::from_codec(codec))
    }

    /// Create a session with the preset `level` maps to.
    pub fn with_level(level: Level) -> Result<Self> {
        Self::with_preset(level.into_xz_preset())
    }
}

impl<C: Codec> StreamEncoder<C> {
    /// Wrap an already initialized codec.
    pub fn from_codec(codec: C) -> Self {
        Self {
            codec: Some(codec),
            failure: None,
            total_in: 0,
            total_out: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        match (&self.codec, self.failure) {
            (_, Some(_)) => Phase::Poisoned,
            (Some(_), None) => Phase::Active,
            (None, None) => Phase::Finished,
        }
    }

    /// Number of input bytes consumed so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Number of compressed bytes returned so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Compress `data`, returning whatever output the codec emits for it.
    ///
    /// All of `data` is consumed before this returns, unless the codec reports the end of the
    /// stream first; [`total_in`](Self::total_in) tells how much was taken. The result may be
    /// empty since the codec buffers input internally.
    pub fn feed(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.feed_into(data, &mut output)?;
        Ok(output)
    }

    /// Like [`feed`](Self::feed), appending the output to `output` instead.
    pub fn feed_into(&mut self, data: &[u8], output: &mut Vec<u8>) -> Result<()> {
        let codec = self.active_codec()?;
        if data.is_empty() {
            return Ok(());
        }

        let mut input = PartialBuffer::new(data);
        let result = drain(codec, &mut input, Action::Run, RUN_BUFFER_SIZE, output);
        self.total_in += input.written().len() as u64;
        self.settle(result)
    }

    /// Emit a synchronization point.
    ///
    /// Once this returns, all output produced so far decodes to all input fed so far without
    /// needing the stream footer. More input can be fed afterwards.
    pub fn flush_sync(&mut self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.flush_sync_into(&mut output)?;
        Ok(output)
    }

    /// Like [`flush_sync`](Self::flush_sync), appending the output to `output` instead.
    pub fn flush_sync_into(&mut self, output: &mut Vec<u8>) -> Result<()> {
        let codec = self.active_codec()?;
        let mut input = PartialBuffer::new(&[][..]);
        let result = drain(codec, &mut input, Action::SyncFlush, FLUSH_BUFFER_SIZE, output);
        self.settle(result)
    }

    /// Close the stream, returning its remaining bytes including the footer.
    ///
    /// The codec is released before this returns, whether or not it succeeds.
    pub fn finish(&mut self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.finish_into(&mut output)?;
        Ok(output)
    }

    /// Like [`finish`](Self::finish), appending the output to `output` instead.
    pub fn finish_into(&mut self, output: &mut Vec<u8>) -> Result<()> {
        self.active_codec()?;
        let Some(mut codec) = self.codec.take() else {
            return Err(Error::Finished);
        };

        let mut input = PartialBuffer::new(&[][..]);
        let result = drain(&mut codec, &mut input, Action::Finish, FLUSH_BUFFER_SIZE, output);
        drop(codec);

        self.settle(result)?;
        debug!(
            total_in = self.total_in,
            total_out = self.total_out,
            "finished xz stream"
        );
        Ok(())
    }

    fn active_codec(&mut self) -> Result<&mut C> {
        if let Some(code) = self.failure {
            return Err(Error::Poisoned(code));
        }
        self.codec.as_mut().ok_or(Error::Finished)
    }

    fn settle(&mut self, result: Result<usize>) -> Result<()> {
        match result {
            Ok(produced) => {
                self.total_out += produced as u64;
                Ok(())
            }
            Err(err) => {
                let code = err.return_code().unwrap_or(ReturnCode::MEM_ERROR);
                warn!(%code, "encoder step failed, encoder is now unusable");
                self.failure = Some(code);
                Err(err)
            }
        }
    }
}

impl<C: Codec> Drop for StreamEncoder<C> {
    fn drop(&mut self) {
        if self.codec.is_some() {
            debug!(
                total_in = self.total_in,
                "releasing codec of an unfinished encoder"
            );
        }
    }
}

#[cfg(feature = "xz")]
fn _assert() {
    crate::util::_assert_send::<StreamEncoder<XzCodec>>();
}

/// Step `codec` until the termination condition for `action` holds.
///
/// Returns the number of bytes appended to `output`. Bytes produced before an error are still
/// appended.
fn drain<C: Codec>(
    codec: &mut C,
    input: &mut PartialBuffer<&[u8]>,
    action: Action,
    capacity: usize,
    output: &mut Vec<u8>,
) -> Result<usize> {
    let mut scratch = PartialBuffer::scratch(capacity)?;

    let start = output.len();
    let mut steps = 0usize;

    let result = loop {
        let status = codec.process(input, &mut scratch, action);
        steps += 1;

        scratch.move_written_into(output)?;

        match status {
            Err(code) => break Err(Error::CodecRun(code)),
            Ok(Status::StreamEnd) => break Ok(()),
            Ok(Status::Ok) if action == Action::Run && input.unwritten().is_empty() => {
                break Ok(())
            }
            Ok(Status::Ok) => {}
        }
    };

    let produced = output.len() - start;
    trace!(?action, steps, produced, "drained codec");
    result.map(|()| produced)
}
