//! Adaptor compressing everything written through it.

use std::io::{self, Write};

use crate::{codec::Codec, StreamEncoder};

#[cfg(feature = "xz")]
use crate::{codec::XzCodec, Level};

/// Compresses data written to it and writes the compressed stream to the underlying writer.
///
/// [`flush`](Write::flush) emits a sync point, so the bytes the underlying writer has seen can be
/// decoded up to everything written so far. The stream is only complete after
/// [`try_finish`](Self::try_finish) or [`finish`](Self::finish); dropping the encoder without
/// calling one of them leaves the output truncated.
#[derive(Debug)]
pub struct Encoder<W, C: Codec = crate::DefaultCodec> {
    writer: W,
    encoder: StreamEncoder<C>,
    buffer: Vec<u8>,
    finished: bool,
}

#[cfg(feature = "xz")]
impl<W: Write> Encoder<W, XzCodec> {
    /// Create an encoder with the default preset.
    pub fn new(writer: W) -> io::Result<Self> {
        Self::with_quality(writer, Level::Default)
    }

    /// Create an encoder with the preset `level` maps to.
    pub fn with_quality(writer: W, level: Level) -> io::Result<Self> {
        Ok(Self::with_encoder(writer, StreamEncoder::with_level(level)?))
    }
}

impl<W: Write, C: Codec> Encoder<W, C> {
    /// Wrap an existing session. Output it already returned is not written to `writer`.
    pub fn with_encoder(writer: W, encoder: StreamEncoder<C>) -> Self {
        Self {
            writer,
            encoder,
            buffer: Vec::new(),
            finished: false,
        }
    }

    /// Finish the compressed stream, writing the footer to the underlying writer.
    ///
    /// Calling this again after it succeeded does nothing.
    pub fn try_finish(&mut self) -> io::Result<()> {
        if !self.finished {
            self.encoder.finish_into(&mut self.buffer)?;
            self.finished = true;
        }
        self.dump()
    }

    /// Finish the compressed stream and return the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.try_finish()?;
        Ok(self.writer)
    }

    /// Write buffered output to the underlying writer.
    ///
    /// Bytes are dropped from the buffer as soon as the writer accepts them, so a failure part way
    /// through never causes them to be written twice.
    fn dump(&mut self) -> io::Result<()> {
        while !self.buffer.is_empty() {
            match self.writer.write(&self.buffer) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "failed to write compressed data",
                    ))
                }
                Ok(len) => {
                    self.buffer.drain(..len);
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}

impl<W, C: Codec> Encoder<W, C> {
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Mutable reference to the underlying writer.
    ///
    /// Writing to it directly will corrupt the compressed stream.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// The session driving this encoder, e.g. to read its byte counters.
    pub fn get_encoder_ref(&self) -> &StreamEncoder<C> {
        &self.encoder
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write, C: Codec> Write for Encoder<W, C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Output left over from an interrupted write goes out first.
        self.dump()?;
        if buf.is_empty() {
            return Ok(0);
        }

        let before = self.encoder.total_in();
        self.encoder.feed_into(buf, &mut self.buffer)?;
        let consumed = (self.encoder.total_in() - before) as usize;

        // The input is in the encoder now, reporting a failure would get it fed again. Whatever
        // the writer did not take stays buffered for the next call, which surfaces the error.
        if let Err(err) = self.dump() {
            tracing::debug!(%err, pending = self.buffer.len(), "deferring compressed output");
        }
        Ok(consumed)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.dump()?;
        if !self.finished {
            self.encoder.flush_sync_into(&mut self.buffer)?;
            self.dump()?;
        }
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::Encoder;
    use crate::{
        codec::{Action, Codec, Status},
        error::ReturnCode,
        util::PartialBuffer,
        StreamEncoder,
    };
    use std::io::Write;

    /// Codec copying input straight to output, ending flushes and finishes immediately.
    #[derive(Debug)]
    struct Passthrough;

    impl Codec for Passthrough {
        fn process(
            &mut self,
            input: &mut PartialBuffer<impl AsRef<[u8]>>,
            output: &mut PartialBuffer<impl AsRef<[u8]> + AsMut<[u8]>>,
            action: Action,
        ) -> Result<Status, ReturnCode> {
            let len = input.unwritten().len().min(output.unwritten().len());
            output.unwritten_mut()[..len].copy_from_slice(&input.unwritten()[..len]);
            input.advance(len);
            output.advance(len);
            match action {
                Action::Run => Ok(Status::Ok),
                Action::SyncFlush => {
                    output.unwritten_mut()[0] = b'|';
                    output.advance(1);
                    Ok(Status::StreamEnd)
                }
                Action::Finish => {
                    output.unwritten_mut()[0] = b'$';
                    output.advance(1);
                    Ok(Status::StreamEnd)
                }
            }
        }
    }

    fn encoder() -> Encoder<Vec<u8>, Passthrough> {
        Encoder::with_encoder(Vec::new(), StreamEncoder::from_codec(Passthrough))
    }

    #[test]
    fn write_flush_finish() {
        let mut encoder = encoder();
        encoder.write_all(b"abc").unwrap();
        assert_eq!(encoder.get_ref(), b"abc");

        encoder.flush().unwrap();
        assert_eq!(encoder.get_ref(), b"abc|");

        encoder.write_all(b"de").unwrap();
        assert_eq!(encoder.get_encoder_ref().total_in(), 5);
        assert_eq!(encoder.finish().unwrap(), b"abc|de$");
    }

    #[test]
    fn try_finish_is_idempotent() {
        let mut encoder = encoder();
        encoder.write_all(b"x").unwrap();
        encoder.try_finish().unwrap();
        encoder.try_finish().unwrap();
        encoder.flush().unwrap();
        assert_eq!(encoder.into_inner(), b"x$");
    }

    /// Writer that accepts `budget` more bytes, then fails once.
    #[derive(Debug, Default)]
    struct FlakyWriter {
        data: Vec<u8>,
        budget: Option<usize>,
    }

    impl Write for FlakyWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            match self.budget {
                Some(0) => {
                    self.budget = None;
                    Err(std::io::Error::other("writer hiccup"))
                }
                Some(budget) => {
                    let len = budget.min(buf.len());
                    self.budget = Some(budget - len);
                    self.data.extend_from_slice(&buf[..len]);
                    Ok(len)
                }
                None => {
                    self.data.extend_from_slice(buf);
                    Ok(buf.len())
                }
            }
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failing_writer_neither_duplicates_output_nor_input() {
        let mut encoder = Encoder::with_encoder(
            FlakyWriter::default(),
            StreamEncoder::from_codec(Passthrough),
        );
        encoder.get_mut().budget = Some(3);

        // The writer fails after the input was fed, the write still counts.
        assert_eq!(encoder.write(b"abcdefgh").unwrap(), 8);
        assert_eq!(encoder.get_ref().data, b"abc");

        // The writer fails before any input is fed, the write is rejected as a whole.
        encoder.get_mut().budget = Some(0);
        assert!(encoder.write(b"ij").is_err());
        assert_eq!(encoder.get_encoder_ref().total_in(), 8);

        encoder.write_all(b"ij").unwrap();
        assert_eq!(encoder.finish().unwrap().data, b"abcdefghij$");
    }

    #[test]
    fn write_after_finish_fails() {
        let mut encoder = encoder();
        encoder.try_finish().unwrap();
        let err = encoder.write(b"late").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
    }
}
