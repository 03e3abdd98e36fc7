// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pre-order walk of a mounted image's directory tree, dispatching to
//! a visitor callback per entry, in the style of this codebase's own
//! `for_each_data_block`/`for_each_directory_entry` callback idiom
//! rather than materializing the whole tree up front.

use crate::block::BlockDevice;
use crate::codec::{FileType, Inode};
use crate::dir::DirectoryIterator;
use crate::file_reader::FileReader;
use crate::inode_table::InodeTable;
use crate::result::{Error, Result};
use std::io::{Read, Seek};

/// One node delivered to a traversal visitor. The payload carried
/// depends on the file type, matching what each front-end actually
/// needs: a `FileReader` for regular files, the raw (major, minor)
/// pair for devices, and nothing beyond the inode itself for
/// directories (their entries are walked internally).
pub enum Entry<'a, D> {
    Regular { path: String, ino: u32, inode: &'a Inode, reader: FileReader<'a, D> },
    Directory { path: String, ino: u32, inode: &'a Inode },
    Device { path: String, ino: u32, inode: &'a Inode, major: u8, minor: u8 },
}

impl<'a, D> Entry<'a, D> {
    pub fn path(&self) -> &str {
        match self {
            Entry::Regular { path, .. } | Entry::Directory { path, .. } | Entry::Device { path, .. } => path,
        }
    }

    pub fn ino(&self) -> u32 {
        match self {
            Entry::Regular { ino, .. } | Entry::Directory { ino, .. } | Entry::Device { ino, .. } => *ino,
        }
    }

    pub fn inode(&self) -> &Inode {
        match self {
            Entry::Regular { inode, .. } | Entry::Directory { inode, .. } | Entry::Device { inode, .. } => inode,
        }
    }
}

/// Walks every inode reachable from `roots` in pre-order, calling
/// `visitor` once per visited entry (the root inodes themselves
/// included).
///
/// "." and ".." entries are never descended into, which is what
/// keeps the walk from looping forever on a well-formed image.
/// Traversal does not attempt cycle detection across hard links
/// beyond that — a limitation accepted from v6 semantics, where a
/// directory entry pointing at an inode with `nlink == 0` is logged as
/// a warning on stderr and skipped rather than treated as fatal.
///
/// A root inode number out of range, or a `RangeError`/`FormatError`
/// anywhere within a root's subtree, is reported to stderr and that
/// root (or sibling) is skipped; an `IoError` is treated as fatal to
/// the whole session and propagated, per the device being the one
/// shared resource a partial read can't recover from.
pub fn walk<D, F>(
    dev: &mut BlockDevice<D>,
    table: &InodeTable,
    roots: &[u32],
    mut visitor: F,
) -> Result<()>
where
    D: Read + Seek,
    F: for<'r> FnMut(Entry<'r, D>) -> Result<()>,
{
    for &root in roots {
        let inode = match table.get(root) {
            Ok(inode) => inode,
            Err(e) => {
                eprintln!("warning: root inode {root}: {e}, skipping");
                continue;
            }
        };
        if let Err(e) = visit_node(dev, table, root, inode, String::new(), &mut visitor) {
            if matches!(e, Error::IoError(_)) {
                return Err(e);
            }
            eprintln!("warning: root inode {root}: {e}, skipping");
        }
    }
    Ok(())
}

fn visit_node<D, F>(
    dev: &mut BlockDevice<D>,
    table: &InodeTable,
    ino: u32,
    inode: &Inode,
    path: String,
    visitor: &mut F,
) -> Result<()>
where
    D: Read + Seek,
    F: for<'r> FnMut(Entry<'r, D>) -> Result<()>,
{
    match inode.file_type() {
        FileType::Regular => {
            let reader = FileReader::new(dev, inode)?;
            visitor(Entry::Regular { path, ino, inode, reader })
        }
        FileType::CharDevice | FileType::BlockDevice => {
            let (major, minor) = inode.device_numbers();
            visitor(Entry::Device { path, ino, inode, major, minor })
        }
        FileType::Directory => {
            visitor(Entry::Directory { path: path.clone(), ino, inode })?;

            let reader = FileReader::new(dev, inode)?;
            let entries: Vec<(u16, String)> = DirectoryIterator::new(reader).collect::<Result<_>>()?;

            for (child_ino, name) in entries {
                if name == "." || name == ".." {
                    continue;
                }
                let child_ino = child_ino as u32;
                let child_inode = match table.get(child_ino) {
                    Ok(inode) => inode,
                    Err(_) => {
                        eprintln!("warning: {path}/{name}: inode {child_ino} is out of range, skipping");
                        continue;
                    }
                };
                if child_inode.is_unused() {
                    eprintln!("warning: {path}/{name}: inode {child_ino} has nlink 0, skipping");
                    continue;
                }

                let child_path = if path.is_empty() { name.clone() } else { format!("{path}/{name}") };
                if let Err(e) = visit_node(dev, table, child_ino, child_inode, child_path, visitor) {
                    if matches!(e, Error::IoError(_)) {
                        return Err(e);
                    }
                    eprintln!("warning: {path}/{name}: {e}, skipping");
                    continue;
                }
            }
            Ok(())
        }
    }
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

    /// Builds a tiny image: root dir (inode 1, block 10) containing
    /// "." "..", and "child.txt" (inode 2, block 11, a regular file).
    fn sample_image() -> Vec<u8> {
        let total_blocks = 20;
        let mut data = vec![0u8; total_blocks * BLOCK_SIZE];

        // Superblock: isize = 1 block of inodes.
        data[BLOCK_SIZE..BLOCK_SIZE + 2].copy_from_slice(&1u16.to_le_bytes());

        let mut inode_block = vec![0u8; BLOCK_SIZE];
        const DIR_MODE: u16 = 0x4000 | 0x8000; // IFMT_DIR | IALLOC
        const REG_MODE: u16 = 0x8000; // regular | IALLOC
        write_inode(&mut inode_block, 0, DIR_MODE, 2, 32, 10);
        write_inode(&mut inode_block, 1, REG_MODE, 1, 5, 11);
        data[2 * BLOCK_SIZE..3 * BLOCK_SIZE].copy_from_slice(&inode_block);

        let mut dirblock = Vec::new();
        dirent(&mut dirblock, 1, ".");
        dirent(&mut dirblock, 1, "..");
        dirent(&mut dirblock, 2, "child.txt");
        dirent(&mut dirblock, 0, ""); // deleted slot, skipped
        dirblock.resize(BLOCK_SIZE, 0);
        data[10 * BLOCK_SIZE..11 * BLOCK_SIZE].copy_from_slice(&dirblock);

        data[11 * BLOCK_SIZE..11 * BLOCK_SIZE + 5].copy_from_slice(b"hello");
        data
    }

    #[test]
    fn walks_root_and_child_skipping_dot_entries() {
        let data = sample_image();
        let mut mount_dev = BlockDevice::new(Cursor::new(data.clone()));
        let table = InodeTable::mount(&mut mount_dev).unwrap();
        let mut dev = BlockDevice::new(Cursor::new(data));

        let mut visited = Vec::new();
        let mut file_contents = Vec::new();
        walk(&mut dev, &table, &[1], |entry| {
            visited.push((entry.path().to_string(), entry.ino()));
            if let Entry::Regular { mut reader, .. } = entry {
                file_contents.push(reader.read(None)?);
            }
            Ok(())
        })
        .unwrap();

        assert_eq!(visited, vec![(String::new(), 1), ("child.txt".to_string(), 2)]);
        assert_eq!(file_contents, vec![b"hello".to_vec()]);
    }
}
