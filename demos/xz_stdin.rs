use std::io::{self, Read, Write};

use clap::Parser;
use tracing_subscriber::EnvFilter;
use xz_sync_stream::StreamEncoder;

// Compress stdin to stdout like `xz` does:
// ```
// echo 'example' | cargo run --example xz_stdin -- --preset 9 | xz -dc
// ```
// Set `RUST_LOG=xz_sync_stream=trace` to watch the encoder work.

#[derive(Parser, Debug)]
struct Args {
    /// Compression preset, 0 (fastest) to 9 (best)
    #[arg(long, default_value_t = 6)]
    preset: u32,
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut encoder = StreamEncoder::with_preset(args.preset)?;

    let mut stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    let mut buf = vec![0; 64 * 1024];
    loop {
        let len = match stdin.read(&mut buf) {
            Ok(0) => break,
            Ok(len) => len,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        stdout.write_all(&encoder.feed(&buf[..len])?)?;
    }
    stdout.write_all(&encoder.finish()?)?;
    stdout.flush()
}
