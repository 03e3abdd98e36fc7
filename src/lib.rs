// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Read-only decoder and traversal engine for Unix Sixth Edition (v6)
//! file system images.
//!
//! The pipeline is `BlockDevice -> codec -> {InodeTable, FileReader,
//! DirectoryIterator} -> traversal -> {front-ends, archive}`; each
//! stage is its own module and none but `block` touches I/O directly.

pub mod archive;
pub mod block;
pub mod codec;
pub mod config;
pub mod dir;
pub mod file_reader;
pub mod inode_table;
pub mod listing;
pub mod result;
pub mod traversal;

pub use block::BlockDevice;
pub use codec::{FileType, Inode, Mode, SuperBlock};
pub use config::{Compression, Config, Output};
pub use dir::DirectoryIterator;
pub use file_reader::FileReader;
pub use inode_table::InodeTable;
pub use result::{Error, Result};
pub use traversal::Entry;
