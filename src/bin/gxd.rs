//! CLI entry point. Dispatches to the engine API in `gxd::compress`/
//! `gxd::decode` and translates the result into an exit code (§6.3:
//! zero on success, non-zero on any surfaced error).

use std::fs::File;
use std::io::{self, Write};
use std::process::ExitCode;

use gxd::cli::{self, Commands};
use gxd::{codec::Algo, compress, decode, sizes};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::parse();

    match args.command {
        Commands::Compress { source, archive, algo, level, block_size, threads, zstd_ratio } => {
            let algo = Algo::from_name(&algo)?;
            if zstd_ratio.is_some() && algo != Algo::Zstd {
                eprintln!("warning: --zstd-ratio has no effect with --algo {}", algo.name());
            }
            let block_size = sizes::parse_size(&block_size)?;
            let opts = compress::CompressOptions { algo, level, block_size, threads, verify: true };
            println!("compressing {} -> {} ({}, block_size={block_size})", source.display(), archive.display(), algo.name());
            compress::compress(&source, &archive, &opts, None)?;
            println!("done");
            Ok(())
        }

        Commands::Decompress { archive, output, threads, verify_blocks, text } => {
            let opts = decode::DecompressOptions { threads, verify_blocks };
            let mut sink: Box<dyn Write> = match &output {
                Some(path) => Box::new(File::create(path)?),
                None => Box::new(io::stdout()),
            };
            if text {
                let mut buf = Vec::new();
                decode::decompress(&archive, &mut buf, &opts, None)?;
                let text = String::from_utf8(buf)
                    .map_err(|e| format!("archive payload is not valid UTF-8: {e}"))?;
                sink.write_all(text.as_bytes())?;
            } else {
                decode::decompress(&archive, &mut sink, &opts, None)?;
            }
            Ok(())
        }

        Commands::Seek { archive, output, offset, length, threads, verify_blocks } => {
            let opts = decode::SeekOptions { offset, length, threads, verify_blocks };
            let mut sink: Box<dyn Write> = match &output {
                Some(path) => Box::new(File::create(path)?),
                None => Box::new(io::stdout()),
            };
            decode::seek(&archive, &mut sink, &opts, None)?;
            Ok(())
        }
    }
}
