// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Iterates the entries of a directory inode.

use crate::codec::{self, dirent_size};
use crate::file_reader::FileReader;
use crate::result::Result;
use std::io::{Read, Seek};

/// Walks a directory's contents 16 bytes at a time, yielding
/// `(inode_number, name)` for each occupied slot. Slots whose inode
/// number is zero are skipped; a short tail record (fewer than 16
/// bytes remaining) ends the iteration without error, since the
/// format itself allows a directory's size to round up to the block
/// boundary.
pub struct DirectoryIterator<'a, D> {
    reader: FileReader<'a, D>,
}

impl<'a, D: Read + Seek> DirectoryIterator<'a, D> {
    pub fn new(reader: FileReader<'a, D>) -> DirectoryIterator<'a, D> {
        DirectoryIterator { reader }
    }

    fn next_entry(&mut self) -> Result<Option<(u16, String)>> {
        loop {
            let bytes = self.reader.read(Some(dirent_size()))?;
            if bytes.len() < dirent_size() {
                return Ok(None);
            }
            if let Some(entry) = codec::decode_dirent(&bytes) {
                return Ok(Some(entry));
            }
        }
    }
}

impl<'a, D: Read + Seek> Iterator for DirectoryIterator<'a, D> {
    type Item = Result<(u16, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().transpose()
    }
}
