// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loads and owns the full inode array of a mounted v6 image.

use crate::block::{BlockDevice, BLOCK_SIZE};
use crate::codec::{self, Inode, SuperBlock};
use crate::result::{Error, Result};
use std::io::{Read, Seek};

const INODE_SIZE: usize = 32;
const INODES_PER_BLOCK: usize = BLOCK_SIZE / INODE_SIZE;

/// The fully decoded superblock plus the inode array it describes,
/// built once at mount time and thereafter immutable.
pub struct InodeTable {
    super_block: SuperBlock,
    inodes: Vec<Inode>,
}

impl InodeTable {
    /// Mounts a v6 image: decodes the superblock from block 1, then
    /// decodes `isize * 16` inode records starting at block 2.
    pub fn mount<D: Read + Seek>(dev: &mut BlockDevice<D>) -> Result<InodeTable> {
        let sb_block = dev.read_block(1)?;
        let super_block = codec::decode_superblock(&sb_block)?;

        let count = super_block.isize as usize * INODES_PER_BLOCK;
        let bytes = dev.read_blocks(2, super_block.isize as usize * BLOCK_SIZE)?;
        let mut inodes = Vec::with_capacity(count);
        for i in 0..count {
            let off = i * INODE_SIZE;
            inodes.push(codec::decode_inode(&bytes[off..off + INODE_SIZE])?);
        }

        Ok(InodeTable { super_block, inodes })
    }

    /// Mounts a v6 image read forward-only, for sources (like standard
    /// input) that can't seek: the boot block, then the superblock
    /// block, then `isize` inode blocks, all read in on-disk order.
    pub fn mount_sequential<R: Read>(r: &mut R) -> Result<InodeTable> {
        let mut boot = [0u8; BLOCK_SIZE];
        r.read_exact(&mut boot)?;
        let mut sb_block = [0u8; BLOCK_SIZE];
        r.read_exact(&mut sb_block)?;
        let super_block = codec::decode_superblock(&sb_block)?;

        let count = super_block.isize as usize * INODES_PER_BLOCK;
        let mut bytes = vec![0u8; super_block.isize as usize * BLOCK_SIZE];
        r.read_exact(&mut bytes)?;
        let mut inodes = Vec::with_capacity(count);
        for i in 0..count {
            let off = i * INODE_SIZE;
            inodes.push(codec::decode_inode(&bytes[off..off + INODE_SIZE])?);
        }

        Ok(InodeTable { super_block, inodes })
    }

    pub fn super_block(&self) -> &SuperBlock {
        &self.super_block
    }

    /// Number of inode slots in the table (not all allocated).
    pub fn len(&self) -> usize {
        self.inodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inodes.is_empty()
    }

    /// Looks up inode `ino` (1-based). Fails with `RangeError` if
    /// `ino` is zero or exceeds the table length. A returned inode
    /// with `nlink == 0` is unused, but is still returned rather than
    /// treated as an error — callers decide whether to skip it.
    pub fn get(&self, ino: u32) -> Result<&Inode> {
        if ino == 0 || ino as usize > self.inodes.len() {
            return Err(Error::range(format!(
                "inode {ino} is out of range (1..={})",
                self.inodes.len()
            )));
        }
        Ok(&self.inodes[ino as usize - 1])
    }

    /// Iterates all in-use (`nlink > 0`) inodes as `(number, inode)`
    /// pairs, in ascending inode-number order.
    pub fn in_use(&self) -> impl Iterator<Item = (u32, &Inode)> {
        self.inodes
            .iter()
            .enumerate()
            .filter(|(_, inode)| !inode.is_unused())
            .map(|(i, inode)| (i as u32 + 1, inode))
    }
}
