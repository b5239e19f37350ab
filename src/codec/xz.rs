use std::fmt;

use liblzma::stream::{self, Check, Stream};

use crate::{
    codec::{Action, Codec, Status},
    error::ReturnCode,
    util::PartialBuffer,
};

/// liblzma easy encoder producing the xz container with a CRC64 check.
///
/// The native stream state is released when this value is dropped.
pub struct XzCodec {
    stream: Stream,
    preset: u32,
}

impl fmt::Debug for XzCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XzCodec")
            .field("preset", &self.preset)
            .finish_non_exhaustive()
    }
}

impl XzCodec {
    pub fn new(preset: u32) -> Result<Self, ReturnCode> {
        let stream = Stream::new_easy_encoder(preset, Check::Crc64).map_err(return_code)?;
        Ok(Self { stream, preset })
    }

    pub fn preset(&self) -> u32 {
        self.preset
    }
}

fn return_code(err: stream::Error) -> ReturnCode {
    #[allow(unreachable_patterns)]
    match err {
        stream::Error::NoCheck => ReturnCode::NO_CHECK,
        stream::Error::UnsupportedCheck => ReturnCode::UNSUPPORTED_CHECK,
        stream::Error::Mem => ReturnCode::MEM_ERROR,
        stream::Error::MemLimit => ReturnCode::MEMLIMIT_ERROR,
        stream::Error::Format => ReturnCode::FORMAT_ERROR,
        stream::Error::Options => ReturnCode::OPTIONS_ERROR,
        stream::Error::Data => ReturnCode::DATA_ERROR,
        stream::Error::Program => ReturnCode::PROG_ERROR,
        _ => ReturnCode::PROG_ERROR,
    }
}

impl Codec for XzCodec {
    fn process(
        &mut self,
        input: &mut PartialBuffer<impl AsRef<[u8]>>,
        output: &mut PartialBuffer<impl AsRef<[u8]> + AsMut<[u8]>>,
        action: Action,
    ) -> Result<Status, ReturnCode> {
        let previous_in = self.stream.total_in();
        let previous_out = self.stream.total_out();

        let action = match action {
            Action::Run => stream::Action::Run,
            Action::SyncFlush => stream::Action::SyncFlush,
            Action::Finish => stream::Action::Finish,
        };

        let result = self
            .stream
            .process(input.unwritten(), output.unwritten_mut(), action);

        // liblzma may have made progress even when it reports an error.
        input.advance((self.stream.total_in() - previous_in) as usize);
        output.advance((self.stream.total_out() - previous_out) as usize);

        match result.map_err(return_code)? {
            stream::Status::Ok => Ok(Status::Ok),
            stream::Status::StreamEnd => Ok(Status::StreamEnd),
            stream::Status::GetCheck => Err(ReturnCode::GET_CHECK),
            // liblzma reports LZMA_BUF_ERROR as `MemNeeded`.
            stream::Status::MemNeeded => Err(ReturnCode::BUF_ERROR),
        }
    }
}
