// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The validated configuration the CLI layer hands to the archive
//! front-end. Nothing in this module parses arguments; that is
//! `clap`'s job in `src/bin/v6fs2tar.rs`.

use std::path::PathBuf;

/// Compressor wrapped around the tar stream, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    None,
    Gzip,
    Bzip2,
    Xz,
}

/// Where the finished archive is written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

impl Default for Output {
    fn default() -> Output {
        Output::Stdout
    }
}

/// Already-validated archive configuration.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub compression: Compression,
    pub output: Output,
    /// Starting inode numbers. Empty is treated as `[1]` by `roots()`.
    pub roots: Vec<u32>,
}

impl Config {
    /// The effective root list: `roots` verbatim, or `[1]` if empty.
    pub fn roots(&self) -> Vec<u32> {
        if self.roots.is_empty() {
            vec![1]
        } else {
            self.roots.clone()
        }
    }
}
