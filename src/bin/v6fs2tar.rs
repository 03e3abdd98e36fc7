// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Exports a v6 volume image's directory tree as a tar archive.

use clap::{Parser, ValueEnum};
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use v6fs::archive;
use v6fs::block::BlockDevice;
use v6fs::config::{Compression, Config, Output};
use v6fs::{InodeTable, Result};

#[derive(Clone, Copy, ValueEnum)]
enum CompressionArg {
    Gz,
    Bz2,
    Xz,
}

#[derive(Parser)]
#[command(name = "v6fs2tar", about = "Export a v6 file system image as a tar archive")]
struct Args {
    /// Output file; standard output is used when omitted.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Gzip-compress the archive.
    #[arg(short = 'z', conflicts_with_all = ["bzip2", "xz", "compress"])]
    gzip: bool,

    /// Bzip2-compress the archive.
    #[arg(short = 'j', conflicts_with_all = ["gzip", "xz", "compress"])]
    bzip2: bool,

    /// Xz-compress the archive.
    #[arg(short = 'J', conflicts_with_all = ["gzip", "bzip2", "compress"])]
    xz: bool,

    /// Select compression by name instead of a short flag.
    #[arg(short = 't', long = "type", value_enum)]
    compress: Option<CompressionArg>,

    /// The volume image to read.
    devfile: PathBuf,

    /// Root inode numbers to archive; defaults to the root inode (1).
    inodes: Vec<u32>,
}

fn resolve_compression(args: &Args) -> Compression {
    if let Some(t) = args.compress {
        return match t {
            CompressionArg::Gz => Compression::Gzip,
            CompressionArg::Bz2 => Compression::Bzip2,
            CompressionArg::Xz => Compression::Xz,
        };
    }
    if args.gzip {
        Compression::Gzip
    } else if args.bzip2 {
        Compression::Bzip2
    } else if args.xz {
        Compression::Xz
    } else {
        Compression::None
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config {
        compression: resolve_compression(&args),
        output: match &args.output {
            Some(path) => Output::File(path.clone()),
            None => Output::Stdout,
        },
        roots: args.inodes.clone(),
    };

    let file = File::open(&args.devfile)?;
    let mut dev = BlockDevice::new(file);
    let table = InodeTable::mount(&mut dev)?;
    archive::write_archive(&mut dev, &table, &config)
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("v6fs2tar: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
