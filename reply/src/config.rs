use std::time::Duration;

use story_reply_protocol::SendFilesWay;

/// Regular accounts may upload files up to 2000 MiB.
pub const FILE_SIZE_LIMIT: u64 = 2000 * 1024 * 1024;

/// Premium accounts may upload files up to 4000 MiB.
pub const PREMIUM_FILE_SIZE_LIMIT: u64 = 4000 * 1024 * 1024;

/// Read-only settings injected into a [`ReplyArea`](crate::ReplyArea) at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyAreaConfig {
    /// Delay between an attach request and the file dialog, so the button ripple can finish.
    pub attach_ripple_delay: Duration,
    pub file_size_limit: u64,
    pub premium_file_size_limit: u64,
    /// Initial way offered by the files confirmation surface.
    pub send_files_way: SendFilesWay,
}

impl Default for ReplyAreaConfig {
    fn default() -> Self {
        Self {
            attach_ripple_delay: Duration::from_millis(200),
            file_size_limit: FILE_SIZE_LIMIT,
            premium_file_size_limit: PREMIUM_FILE_SIZE_LIMIT,
            send_files_way: SendFilesWay::default(),
        }
    }
}

impl ReplyAreaConfig {
    pub fn file_size_limit(&self, premium: bool) -> u64 {
        if premium {
            self.premium_file_size_limit
        } else {
            self.file_size_limit
        }
    }
}
