// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serializes a traversal as a POSIX ustar archive, optionally wrapped
//! in a streaming compressor.

use crate::block::BlockDevice;
use crate::codec::Mode;
use crate::config::{Compression, Config, Output};
use crate::inode_table::InodeTable;
use crate::result::{Error, Result};
use crate::traversal::{self, Entry};
use bzip2::write::BzEncoder;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{self, Read, Seek, Write};
use tar::{EntryType, Header};
use xz2::write::XzEncoder;

/// Bits that have no business in a portable tar header: allocation,
/// file-type, and large-addressing markers are all engine-internal.
const PORTABLE_MODE_MASK: u16 = !(Mode::IALLOC.bits() | Mode::IFMT.bits() | Mode::ILARG.bits());

fn open_sink(output: &Output) -> Result<Box<dyn Write>> {
    match output {
        Output::Stdout => Ok(Box::new(io::stdout())),
        Output::File(path) => Ok(Box::new(File::create(path)?)),
    }
}

fn wrap_compressor(sink: Box<dyn Write>, compression: Compression) -> Box<dyn Write> {
    match compression {
        Compression::None => sink,
        Compression::Gzip => Box::new(GzEncoder::new(sink, flate2::Compression::default())),
        Compression::Bzip2 => Box::new(BzEncoder::new(sink, bzip2::Compression::new(6))),
        Compression::Xz => Box::new(XzEncoder::new(sink, 6)),
    }
}

fn base_header(entry: &Entry<impl Read + Seek>) -> Result<Header> {
    let path = entry.path();
    let mut header = Header::new_ustar();
    header
        .set_path(path)
        .map_err(|_| Error::format(format!("path {path:?} is not representable in a ustar header")))?;
    header.set_mode(u32::from(entry.inode().mode.bits() & PORTABLE_MODE_MASK));
    header.set_uid(entry.inode().uid as u32);
    header.set_gid(entry.inode().gid as u32);
    header.set_mtime(u64::from(entry.inode().mtime));
    Ok(header)
}

/// Writes a tar archive of the traversal rooted at `config.roots()` to
/// `config.output`, compressed per `config.compression`.
pub fn write_archive<D: Read + Seek>(
    dev: &mut BlockDevice<D>,
    table: &InodeTable,
    config: &Config,
) -> Result<()> {
    let sink = wrap_compressor(open_sink(&config.output)?, config.compression);
    let mut builder = tar::Builder::new(sink);

    traversal::walk(dev, table, &config.roots(), |entry| {
        let mut header = base_header(&entry)?;
        let path = entry.path().to_string();

        match entry {
            Entry::Directory { .. } => {
                if path.is_empty() {
                    // The traversal root itself isn't emitted as an entry.
                    return Ok(());
                }
                header.set_entry_type(EntryType::Directory);
                header.set_size(0);
                header.set_cksum();
                let dir_path = format!("{path}/");
                builder.append_data(&mut header, &dir_path, io::empty())?;
            }
            Entry::Device { inode, major, minor, .. } => {
                let entry_type = match inode.file_type() {
                    crate::codec::FileType::CharDevice => EntryType::Char,
                    _ => EntryType::Block,
                };
                header.set_entry_type(entry_type);
                header.set_device_major(u32::from(major)).map_err(Error::IoError)?;
                header.set_device_minor(u32::from(minor)).map_err(Error::IoError)?;
                header.set_size(0);
                header.set_cksum();
                builder.append_data(&mut header, &path, io::empty())?;
            }
            Entry::Regular { inode, mut reader, .. } => {
                header.set_entry_type(EntryType::Regular);
                header.set_size(u64::from(inode.size));
                header.set_cksum();
                let data = reader.read(None)?;
                builder.append_data(&mut header, &path, &data[..])?;
            }
        }
        Ok(())
    })?;

    let mut sink = builder.into_inner()?;
    sink.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BLOCK_SIZE;
    use std::io::Cursor;

    const INODE_SIZE: usize = 32;

    fn write_inode(block: &mut [u8], slot: usize, mode: u16, nlink: u8, size: u32, addr0: u16) {
        let off = slot * INODE_SIZE;
        block[off..off + 2].copy_from_slice(&mode.to_le_bytes());
        block[off + 2] = nlink;
        block[off + 5] = (size >> 16) as u8;
        block[off + 6..off + 8].copy_from_slice(&((size & 0xFFFF) as u16).to_le_bytes());
        block[off + 8..off + 10].copy_from_slice(&addr0.to_le_bytes());
    }

    fn dirent(buf: &mut Vec<u8>, ino: u16, name: &str) {
        buf.extend_from_slice(&ino.to_le_bytes());
        let mut name_bytes = name.as_bytes().to_vec();
        name_bytes.resize(14, 0);
        buf.extend_from_slice(&name_bytes);
    }

    fn sample_image() -> Vec<u8> {
        let mut data = vec![0u8; 20 * BLOCK_SIZE];
        data[BLOCK_SIZE..BLOCK_SIZE + 2].copy_from_slice(&1u16.to_le_bytes());

        let mut inode_block = vec![0u8; BLOCK_SIZE];
        const DIR_MODE: u16 = 0x4000 | 0x8000 | 0x01ED;
        const REG_MODE: u16 = 0x8000 | 0x01A4;
        write_inode(&mut inode_block, 0, DIR_MODE, 2, 32, 10);
        write_inode(&mut inode_block, 1, REG_MODE, 1, 5, 11);
        data[2 * BLOCK_SIZE..3 * BLOCK_SIZE].copy_from_slice(&inode_block);

        let mut dirblock = Vec::new();
        dirent(&mut dirblock, 1, ".");
        dirent(&mut dirblock, 1, "..");
        dirent(&mut dirblock, 2, "hello.txt");
        dirblock.resize(BLOCK_SIZE, 0);
        data[10 * BLOCK_SIZE..11 * BLOCK_SIZE].copy_from_slice(&dirblock);

        data[11 * BLOCK_SIZE..11 * BLOCK_SIZE + 5].copy_from_slice(b"hello");
        data
    }

    #[test]
    fn archive_contains_directory_and_file_entries() {
        let data = sample_image();
        let mut mount_dev = BlockDevice::new(Cursor::new(data.clone()));
        let table = InodeTable::mount(&mut mount_dev).unwrap();
        let mut dev = BlockDevice::new(Cursor::new(data));

        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("out.tar");
        let config = Config {
            compression: Compression::None,
            output: Output::File(out_path.clone()),
            roots: vec![1],
        };
        write_archive(&mut dev, &table, &config).unwrap();

        let mut archive = tar::Archive::new(File::open(&out_path).unwrap());
        let names: Vec<String> = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["hello.txt".to_string()]);
    }
}
