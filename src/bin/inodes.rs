// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lists every in-use inode of one or more v6 volume images.

use clap::Parser;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use v6fs::block::BlockDevice;
use v6fs::listing::inode_line;
use v6fs::{InodeTable, Result};

#[derive(Parser)]
#[command(name = "inodes", about = "List in-use inodes of a v6 file system image")]
struct Args {
    /// Volume images to read; standard input is used when none are given.
    files: Vec<PathBuf>,
}

fn print_inodes(table: &InodeTable) {
    for (ino, inode) in table.in_use() {
        println!("{}", inode_line(ino, inode, ""));
    }
}

fn run(args: Args) -> Result<()> {
    if args.files.is_empty() {
        let table = InodeTable::mount_sequential(&mut io::stdin().lock())?;
        print_inodes(&table);
        return Ok(());
    }
    for path in &args.files {
        if args.files.len() > 1 {
            println!("{}:", path.display());
        }
        let file = File::open(path)?;
        let mut dev = BlockDevice::new(file);
        let table = InodeTable::mount(&mut dev)?;
        print_inodes(&table);
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("inodes: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
