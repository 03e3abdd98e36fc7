// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pre-order tree print of a v6 volume image.

use clap::Parser;
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use v6fs::block::BlockDevice;
use v6fs::listing::inode_line;
use v6fs::traversal;
use v6fs::{InodeTable, Result};

#[derive(Parser)]
#[command(name = "itree", about = "Print a v6 file system image as an indented tree")]
struct Args {
    /// The volume image to read.
    devfile: PathBuf,
    /// Root inode numbers to start from; defaults to the root inode (1).
    inodes: Vec<u32>,
}

fn depth_of(path: &str) -> usize {
    if path.is_empty() {
        0
    } else {
        path.matches('/').count() + 1
    }
}

fn name_of(path: &str) -> &str {
    if path.is_empty() {
        "."
    } else {
        path.rsplit('/').next().unwrap_or(path)
    }
}

fn run(args: Args) -> Result<()> {
    let file = File::open(&args.devfile)?;
    let mut dev = BlockDevice::new(file);
    let table = InodeTable::mount(&mut dev)?;

    let roots = if args.inodes.is_empty() { vec![1] } else { args.inodes };
    traversal::walk(&mut dev, &table, &roots, |entry| {
        let path = entry.path().to_string();
        let indent = "->".repeat(depth_of(&path));
        println!("{indent}{}", inode_line(entry.ino(), entry.inode(), name_of(&path)));
        Ok(())
    })
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("itree: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
