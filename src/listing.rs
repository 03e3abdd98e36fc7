// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared line formatting for the `inodes` and `itree` front-ends:
//! `NNNNN MODESTR LL UU GG SSSSSSSS MTIME ATIME NAME`.

use crate::codec::{FileType, Inode};
use chrono::{Local, LocalResult, TimeZone};

/// Formats a repaired Unix timestamp as local-time
/// "YYYY-MM-DD HH:MM:SS", matching the style of this codebase's own
/// human-readable dumps.
pub fn format_time(unix: u32) -> String {
    match Local.timestamp_opt(i64::from(unix), 0) {
        LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        _ => "????-??-?? ??:??:??".to_string(),
    }
}

/// One listing line for inode `ino`. `name` is the empty string when
/// there is no path context (the bare `inodes` front-end); `itree`
/// passes the indented path.
pub fn inode_line(ino: u32, inode: &Inode, name: &str) -> String {
    let size_field = match inode.file_type() {
        FileType::CharDevice | FileType::BlockDevice => {
            let (major, minor) = inode.device_numbers();
            format!("{major},{minor}")
        }
        _ => inode.size.to_string(),
    };
    format!(
        "{:>5} {} {:>2} {:>3} {:>3} {:>8} {} {} {}",
        ino,
        inode.mode_string(),
        inode.nlink,
        inode.uid,
        inode.gid,
        size_field,
        format_time(inode.mtime),
        format_time(inode.atime),
        name,
    )
}
