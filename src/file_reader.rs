// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Walks an inode's direct/indirect/double-indirect addressing scheme
//! to produce its data block sequence, then streams file bytes.

use crate::block::{BlockDevice, BLOCK_SIZE};
use crate::codec::{Inode, DIRECT_PTRS_SMALL, INDIRECT_PTRS_LARGE, PTRS_PER_INDIRECT};
use crate::result::{Error, Result};
use std::collections::VecDeque;
use std::io::{Read, Seek};

/// Reads the 512-byte block at `ptr` and returns its non-zero entries
/// as data (or further-indirect) block numbers, in on-disk order.
fn read_pointer_block<D: Read + Seek>(
    dev: &mut BlockDevice<D>,
    ptr: u16,
) -> Result<Vec<u16>> {
    let block = dev.read_block(ptr as u64)?;
    let mut ptrs = Vec::with_capacity(PTRS_PER_INDIRECT);
    for i in 0..PTRS_PER_INDIRECT {
        let entry = u16::from_le_bytes([block[i * 2], block[i * 2 + 1]]);
        if entry != 0 {
            ptrs.push(entry);
        }
    }
    Ok(ptrs)
}

/// Walks an inode's addressing scheme and returns the ordered
/// sequence of non-zero data block numbers that make up its content.
fn collect_blocks<D: Read + Seek>(
    dev: &mut BlockDevice<D>,
    inode: &Inode,
) -> Result<Vec<u16>> {
    let mut blocks = Vec::new();
    if inode.is_large() {
        for &ptr in &inode.addr[..INDIRECT_PTRS_LARGE] {
            if ptr == 0 {
                continue;
            }
            blocks.extend(read_pointer_block(dev, ptr)?);
        }
        let dindirect = inode.addr[7];
        if dindirect != 0 {
            for ptr in read_pointer_block(dev, dindirect)? {
                blocks.extend(read_pointer_block(dev, ptr)?);
            }
        }
    } else {
        for &ptr in &inode.addr[..DIRECT_PTRS_SMALL] {
            if ptr != 0 {
                blocks.push(ptr);
            }
        }
    }
    Ok(blocks)
}

fn expected_block_count(size: u32) -> usize {
    (size as usize).div_ceil(BLOCK_SIZE)
}

/// Streams the data of one file, in the order its blocks appear on
/// disk. Not seekable: `next_block`/`read` consume the underlying
/// device linearly and cannot be replayed.
pub struct FileReader<'a, D> {
    dev: &'a mut BlockDevice<D>,
    blocks: Vec<u16>,
    size: u32,
    next: usize,
    pending: VecDeque<u8>,
}

impl<'a, D: Read + Seek> FileReader<'a, D> {
    /// Builds a reader for `inode`, expanding its block addressing
    /// scheme eagerly and verifying the resulting block count matches
    /// `ceil(size / 512)`.
    pub fn new(dev: &'a mut BlockDevice<D>, inode: &Inode) -> Result<FileReader<'a, D>> {
        let blocks = collect_blocks(dev, inode)?;
        let expected = expected_block_count(inode.size);
        if blocks.len() != expected {
            return Err(Error::format(format!(
                "file claims size {} ({} blocks) but addressing yielded {} blocks",
                inode.size,
                expected,
                blocks.len()
            )));
        }
        Ok(FileReader { dev, blocks, size: inode.size, next: 0, pending: VecDeque::new() })
    }

    /// The data block numbers backing this file, in read order.
    pub fn block_sequence(&self) -> &[u16] {
        &self.blocks
    }

    /// Returns the next data block's contents, truncated to the final
    /// partial block's remainder when `size` isn't a multiple of 512.
    /// Returns `None` once the sequence is exhausted.
    pub fn next_block(&mut self) -> Result<Option<Vec<u8>>> {
        if self.next >= self.blocks.len() {
            return Ok(None);
        }
        let blockno = self.blocks[self.next];
        self.next += 1;
        let data = self.dev.read_block(blockno as u64)?;
        let is_last = self.next == self.blocks.len();
        let remainder = (self.size as usize) % BLOCK_SIZE;
        let take = if is_last && remainder != 0 { remainder } else { BLOCK_SIZE };
        Ok(Some(data[..take].to_vec()))
    }

    /// Returns up to `n` bytes (or, when `n` is `None`, all remaining
    /// bytes) from the concatenation of `next_block` outputs.
    pub fn read(&mut self, n: Option<usize>) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        loop {
            if let Some(n) = n {
                if out.len() >= n {
                    break;
                }
            }
            if self.pending.is_empty() {
                match self.next_block()? {
                    Some(block) => self.pending.extend(block),
                    None => break,
                }
            }
            let take = match n {
                Some(n) => (n - out.len()).min(self.pending.len()),
                None => self.pending.len(),
            };
            out.extend(self.pending.drain(..take));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Mode;
    use std::io::Cursor;

    fn inode(size: u32, addr: [u16; 8], large: bool) -> Inode {
        let mut mode = Mode::IALLOC;
        if large {
            mode |= Mode::ILARG;
        }
        Inode { mode, nlink: 1, uid: 0, gid: 0, size, addr, atime: 0, mtime: 0 }
    }

    fn image(blocks: usize) -> Cursor<Vec<u8>> {
        Cursor::new(vec![0u8; blocks * BLOCK_SIZE])
    }

    #[test]
    fn small_file_full_then_truncated_block() {
        let mut data = vec![0u8; 8 * BLOCK_SIZE];
        data[5 * BLOCK_SIZE..5 * BLOCK_SIZE + 512].fill(0xAA);
        data[6 * BLOCK_SIZE..6 * BLOCK_SIZE + 488].fill(0xBB);
        let mut dev = BlockDevice::new(Cursor::new(data));
        let ino = inode(1000, [5, 6, 0, 0, 0, 0, 0, 0], false);
        let mut reader = FileReader::new(&mut dev, &ino).unwrap();
        assert_eq!(reader.block_sequence(), &[5, 6]);

        let b0 = reader.next_block().unwrap().unwrap();
        assert_eq!(b0.len(), 512);
        assert!(b0.iter().all(|&b| b == 0xAA));

        let b1 = reader.next_block().unwrap().unwrap();
        assert_eq!(b1.len(), 488);
        assert!(b1.iter().all(|&b| b == 0xBB));

        assert!(reader.next_block().unwrap().is_none());
    }

    #[test]
    fn size_multiple_of_block_is_not_truncated() {
        let mut dev = BlockDevice::new(image(4));
        let ino = inode(1024, [2, 3, 0, 0, 0, 0, 0, 0], false);
        let mut reader = FileReader::new(&mut dev, &ino).unwrap();
        assert_eq!(reader.next_block().unwrap().unwrap().len(), 512);
        assert_eq!(reader.next_block().unwrap().unwrap().len(), 512);
        assert!(reader.next_block().unwrap().is_none());
    }

    #[test]
    fn zero_size_file_yields_no_blocks() {
        let mut dev = BlockDevice::new(image(4));
        let ino = inode(0, [0; 8], false);
        let mut reader = FileReader::new(&mut dev, &ino).unwrap();
        assert!(reader.block_sequence().is_empty());
        assert_eq!(reader.read(None).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn large_mode_single_indirect_block() {
        let mut data = vec![0u8; 300 * BLOCK_SIZE];
        // Indirect block 100 contains [200, 201] then zeros.
        let off = 100 * BLOCK_SIZE;
        data[off..off + 2].copy_from_slice(&200u16.to_le_bytes());
        data[off + 2..off + 4].copy_from_slice(&201u16.to_le_bytes());
        let mut dev = BlockDevice::new(Cursor::new(data));
        let ino = inode(1024, [100, 0, 0, 0, 0, 0, 0, 0], true);
        let mut reader = FileReader::new(&mut dev, &ino).unwrap();
        assert_eq!(reader.block_sequence(), &[200, 201]);
    }

    #[test]
    fn large_mode_double_indirect_with_hole_matches_size() {
        let mut data = vec![0u8; 400 * BLOCK_SIZE];
        // Double-indirect block 300 points at indirect blocks 301 and
        // (a hole, zero) then 302.
        let dbl_off = 300 * BLOCK_SIZE;
        data[dbl_off..dbl_off + 2].copy_from_slice(&301u16.to_le_bytes());
        data[dbl_off + 2..dbl_off + 4].copy_from_slice(&0u16.to_le_bytes());
        data[dbl_off + 4..dbl_off + 6].copy_from_slice(&302u16.to_le_bytes());
        // Indirect block 301 -> data block 50.
        let i1_off = 301 * BLOCK_SIZE;
        data[i1_off..i1_off + 2].copy_from_slice(&50u16.to_le_bytes());
        // Indirect block 302 -> data block 51.
        let i2_off = 302 * BLOCK_SIZE;
        data[i2_off..i2_off + 2].copy_from_slice(&51u16.to_le_bytes());
        let mut dev = BlockDevice::new(Cursor::new(data));
        let ino = inode(1024, [0, 0, 0, 0, 0, 0, 0, 300], true);
        let mut reader = FileReader::new(&mut dev, &ino).unwrap();
        assert_eq!(reader.block_sequence(), &[50, 51]);
    }

    #[test]
    fn mismatched_block_count_is_format_error() {
        let mut dev = BlockDevice::new(image(8));
        // size implies 2 blocks but only one direct pointer is set.
        let ino = inode(1000, [5, 0, 0, 0, 0, 0, 0, 0], false);
        match FileReader::new(&mut dev, &ino) {
            Err(Error::FormatError(_)) => {}
            other => panic!("expected FormatError, got {other:?}"),
        }
    }

    #[test]
    fn read_accumulates_across_block_boundaries() {
        let mut data = vec![0u8; 8 * BLOCK_SIZE];
        data[5 * BLOCK_SIZE..5 * BLOCK_SIZE + 512].fill(1);
        data[6 * BLOCK_SIZE..6 * BLOCK_SIZE + 488].fill(2);
        let mut dev = BlockDevice::new(Cursor::new(data));
        let ino = inode(1000, [5, 6, 0, 0, 0, 0, 0, 0], false);
        let mut reader = FileReader::new(&mut dev, &ino).unwrap();
        let first = reader.read(Some(600)).unwrap();
        assert_eq!(first.len(), 600);
        assert!(first[..512].iter().all(|&b| b == 1));
        assert!(first[512..].iter().all(|&b| b == 2));
        let rest = reader.read(None).unwrap();
        assert_eq!(rest.len(), 1000 - 600);
    }
}
