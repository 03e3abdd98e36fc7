// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Emits the contents of one or more inodes from a v6 volume image.

use clap::Parser;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use v6fs::block::BlockDevice;
use v6fs::codec::FileType;
use v6fs::dir::DirectoryIterator;
use v6fs::file_reader::FileReader;
use v6fs::{Error, InodeTable, Result};

#[derive(Parser)]
#[command(name = "icat", about = "Print the contents of inodes in a v6 file system image")]
struct Args {
    /// The volume image to read.
    devfile: PathBuf,
    /// Inode numbers to emit; defaults to the root inode (1).
    inodes: Vec<u32>,
}

fn cat_one<D: io::Read + io::Seek>(
    dev: &mut BlockDevice<D>,
    table: &InodeTable,
    ino: u32,
) -> Result<()> {
    let inode = table.get(ino)?;
    match inode.file_type() {
        FileType::Directory => {
            let reader = FileReader::new(dev, inode)?;
            for entry in DirectoryIterator::new(reader) {
                let (d_ino, name) = entry?;
                println!("{d_ino}\t{name}");
            }
        }
        FileType::CharDevice | FileType::BlockDevice => {
            let (major, minor) = inode.device_numbers();
            println!("device major={major} minor={minor}");
        }
        FileType::Regular => {
            let mut reader = FileReader::new(dev, inode)?;
            let data = reader.read(None)?;
            io::stdout().write_all(&data)?;
        }
    }
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let file = File::open(&args.devfile)?;
    let mut dev = BlockDevice::new(file);
    let table = InodeTable::mount(&mut dev)?;

    let targets = if args.inodes.is_empty() { vec![1] } else { args.inodes };
    let mut had_error = false;
    for ino in targets {
        if let Err(e) = cat_one(&mut dev, &table, ino) {
            eprintln!("icat: inode {ino}: {e}");
            had_error = true;
        }
    }
    if had_error {
        return Err(Error::range("one or more requested inodes could not be read"));
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("icat: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
