#![allow(dead_code)] // Different tests use a different subset of functions

use std::io::{BufRead, BufReader, Read};

use liblzma::read::XzDecoder;
use proptest_derive::Arbitrary;
use xz_sync_stream::StreamEncoder;

#[derive(Arbitrary, Debug, Clone)]
pub struct InputStream(Vec<Vec<u8>>);

impl InputStream {
    pub fn chunks(&self) -> impl Iterator<Item = &[u8]> {
        // Interleave empty chunks before and after each chunk so every point of the stream sees
        // an empty feed as well.
        self.0
            .iter()
            .flat_map(|chunk| [&[][..], &chunk[..]])
            .chain(Some(&[][..]))
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.0.iter().flatten().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.0.iter().map(Vec::len).sum()
    }
}

impl From<Vec<Vec<u8>>> for InputStream {
    fn from(input: Vec<Vec<u8>>) -> InputStream {
        InputStream(input)
    }
}

/// The inputs the encoder is checked against exhaustively.
pub fn samples() -> Vec<Vec<u8>> {
    vec![
        b"".to_vec(),
        b"Hello!".to_vec(),
        (0..=255).collect(),
        random_bytes(10),
        random_bytes(100),
    ]
}

pub fn random_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|_| rand::random()).collect()
}

/// Feed each chunk in turn, then finish.
pub fn compress(chunks: &[&[u8]]) -> Vec<u8> {
    let mut encoder = StreamEncoder::new().unwrap();
    let mut output = Vec::new();
    for chunk in chunks {
        output.extend(encoder.feed(chunk).unwrap());
    }
    output.extend(encoder.finish().unwrap());
    output
}

/// Decode a complete xz stream.
pub fn decompress(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::new();
    XzDecoder::new(input).read_to_end(&mut output).unwrap();
    output
}

/// Decode the first `len` bytes out of a possibly unterminated xz stream.
pub fn decompress_prefix(input: &[u8], len: usize) -> Vec<u8> {
    let mut output = vec![0; len];
    XzDecoder::new(input).read_exact(&mut output).unwrap();
    output
}

/// Read one line out of a possibly unterminated xz stream.
pub fn read_line(input: &[u8]) -> Vec<u8> {
    let mut line = Vec::new();
    BufReader::new(XzDecoder::new(input))
        .read_until(b'\n', &mut line)
        .unwrap();
    line
}
