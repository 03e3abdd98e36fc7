// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Random-access reader of fixed 512-byte blocks.

use crate::result::{Error, Result};
use std::io::{Read, Seek, SeekFrom};

/// Size, in bytes, of a v6 disk block.
pub const BLOCK_SIZE: usize = 512;

/// A `BlockDevice` reads fixed-size blocks out of any seekable byte
/// source, addressed by absolute block number rather than byte offset.
///
/// The device is not buffered beyond what the underlying reader
/// provides; each `read_block` call performs one seek and one read.
pub struct BlockDevice<D> {
    dev: D,
}

impl<D: Read + Seek> BlockDevice<D> {
    /// Wraps `dev` as a block device.
    pub fn new(dev: D) -> BlockDevice<D> {
        BlockDevice { dev }
    }

    /// Reads the block at the given block number.
    ///
    /// Fails with `RangeError` if the device does not have enough
    /// bytes remaining to satisfy a full block, and `IoError` for
    /// any other I/O failure.
    pub fn read_block(&mut self, n: u64) -> Result<[u8; BLOCK_SIZE]> {
        let offset = n
            .checked_mul(BLOCK_SIZE as u64)
            .ok_or_else(|| Error::range(format!("block {n} overflows offset")))?;
        self.dev.seek(SeekFrom::Start(offset))?;
        let mut buf = [0u8; BLOCK_SIZE];
        self.dev.read_exact(&mut buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                Error::range(format!("block {n} is beyond the end of the device"))
            } else {
                Error::IoError(e)
            }
        })?;
        Ok(buf)
    }

    /// Reads `len` bytes of raw device contents starting at block `n`,
    /// spanning as many blocks as necessary. Used by `InodeTable` to
    /// slurp the whole inode list in one pass.
    pub fn read_blocks(&mut self, n: u64, len: usize) -> Result<Vec<u8>> {
        let offset = n
            .checked_mul(BLOCK_SIZE as u64)
            .ok_or_else(|| Error::range(format!("block {n} overflows offset")))?;
        self.dev.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; len];
        self.dev.read_exact(&mut buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                Error::range(format!(
                    "read of {len} bytes at block {n} runs past the end of the device"
                ))
            } else {
                Error::IoError(e)
            }
        })?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn image(blocks: usize) -> Cursor<Vec<u8>> {
        Cursor::new(vec![0u8; blocks * BLOCK_SIZE])
    }

    #[test]
    fn reads_a_block_in_range() {
        let mut data = vec![0u8; 4 * BLOCK_SIZE];
        data[BLOCK_SIZE] = 0xAB;
        let mut dev = BlockDevice::new(Cursor::new(data));
        let block = dev.read_block(1).unwrap();
        assert_eq!(block[0], 0xAB);
    }

    #[test]
    fn read_past_end_is_range_error() {
        let mut dev = BlockDevice::new(image(2));
        match dev.read_block(5) {
            Err(Error::RangeError(_)) => {}
            other => panic!("expected RangeError, got {other:?}"),
        }
    }

    #[test]
    fn read_blocks_spans_multiple_blocks() {
        let mut dev = BlockDevice::new(image(4));
        let bytes = dev.read_blocks(0, 3 * BLOCK_SIZE).unwrap();
        assert_eq!(bytes.len(), 3 * BLOCK_SIZE);
    }
}
