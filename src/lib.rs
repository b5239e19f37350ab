//! Incremental xz compression with synchronous flush points.
//!
//! A [`StreamEncoder`] owns one liblzma encoder and is driven by three calls:
//!
//!  Call | Does
//! ------|------
//!  [`feed`](StreamEncoder::feed) | Compresses a chunk of any size, returning whatever output is ready
//!  [`flush_sync`](StreamEncoder::flush_sync) | Makes everything returned so far decodable on its own
//!  [`finish`](StreamEncoder::finish) | Writes the index and stream footer, releasing the encoder
//!
//! Everything returned by these calls, concatenated in order, is a single valid `.xz` stream.
//! The [`write::Encoder`] adaptor does the same for any [`std::io::Write`].
//!
//! # Feature Organization
//!
//!  Feature | Does
//! ---------|------
//!  `xz`     | (default) liblzma backed [`XzCodec`](codec::XzCodec), [`StreamEncoder::new`] and friends
//!  `static` | Link liblzma statically
//!
//! Without `xz` the session logic is still available over any [`Codec`](codec::Codec) through
//! [`StreamEncoder::from_codec`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    unused_qualifications
)]

pub mod codec;
mod encoder;
pub mod error;
pub mod util;
pub mod write;

pub use crate::{
    encoder::{DefaultCodec, Phase, StreamEncoder},
    error::{Error, Result, ReturnCode},
};

/// Level of compression data should be compressed with.
#[non_exhaustive]
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// Fastest quality of compression, usually produces bigger size (preset 0).
    Fastest,
    /// Best quality of compression, usually produces the smallest size (preset 9).
    Best,
    /// Default quality of compression (preset 6).
    #[default]
    Default,
    /// A raw liblzma preset. Values outside 0-9 are rejected when the encoder is created.
    Precise(u32),
}

impl Level {
    /// The liblzma preset this level selects.
    pub fn into_xz_preset(self) -> u32 {
        match self {
            Self::Fastest => 0,
            Self::Best => 9,
            Self::Default => 6,
            Self::Precise(preset) => preset,
        }
    }
}
