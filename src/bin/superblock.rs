// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dumps the decoded superblock of one or more v6 volume images.

use clap::Parser;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use v6fs::block::{BlockDevice, BLOCK_SIZE};
use v6fs::codec::{self, SuperBlock};
use v6fs::{Error, Result};

#[derive(Parser)]
#[command(name = "superblock", about = "Print the decoded superblock of a v6 file system image")]
struct Args {
    /// Volume images to read; standard input is used when none are given.
    files: Vec<PathBuf>,
}

fn print_superblock(label: &str, sb: &SuperBlock) {
    println!("{label}:");
    println!("  isize  = {}", sb.isize);
    println!("  fsize  = {}", sb.fsize);
    println!("  nfree  = {}", sb.nfree);
    println!("  ninode = {}", sb.ninode);
    println!("  flock  = {}", sb.flock);
    println!("  ilock  = {}", sb.ilock);
    println!("  fmod   = {}", sb.fmod);
    println!("  ronly  = {}", sb.ronly);
    println!("  time   = {}", v6fs::listing::format_time(sb.time));
}

/// Reads the boot block then block 1 sequentially, for sources (like
/// standard input) that can't seek.
fn read_superblock_sequential<R: Read>(r: &mut R) -> Result<SuperBlock> {
    let mut boot = [0u8; BLOCK_SIZE];
    r.read_exact(&mut boot).map_err(Error::from)?;
    let mut block1 = [0u8; BLOCK_SIZE];
    r.read_exact(&mut block1).map_err(Error::from)?;
    codec::decode_superblock(&block1)
}

fn run(args: Args) -> Result<()> {
    if args.files.is_empty() {
        let sb = read_superblock_sequential(&mut io::stdin().lock())?;
        print_superblock("<stdin>", &sb);
        return Ok(());
    }
    for path in &args.files {
        let file = File::open(path)?;
        let mut dev = BlockDevice::new(file);
        let block = dev.read_block(1)?;
        let sb = codec::decode_superblock(&block)?;
        print_superblock(&path.display().to_string(), &sb);
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("superblock: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
