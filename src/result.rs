// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;
use std::io;

/// Errors raised while decoding or traversing a v6 file system image.
#[derive(Debug)]
pub enum Error {
    /// An inode number or block number fell outside the valid range.
    RangeError(String),
    /// A decoded structure violated one of the format's invariants.
    FormatError(String),
    /// The underlying device failed to produce the requested bytes.
    IoError(io::Error),
    /// A command-line argument was invalid.
    UsageError(String),
}

impl Error {
    pub fn range(msg: impl Into<String>) -> Error {
        Error::RangeError(msg.into())
    }

    pub fn format(msg: impl Into<String>) -> Error {
        Error::FormatError(msg.into())
    }

    pub fn usage(msg: impl Into<String>) -> Error {
        Error::UsageError(msg.into())
    }

    /// Returns the exit code this error should produce in a front-end
    /// binary, per the v6fs2tar convention of 0/1/2 applied uniformly
    /// across the tool family.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::UsageError(_) => 1,
            Error::RangeError(_) | Error::FormatError(_) | Error::IoError(_) => 2,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::RangeError(msg) => write!(f, "out of range: {msg}"),
            Error::FormatError(msg) => write!(f, "bad format: {msg}"),
            Error::IoError(err) => write!(f, "I/O error: {err}"),
            Error::UsageError(msg) => write!(f, "usage error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::IoError(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
