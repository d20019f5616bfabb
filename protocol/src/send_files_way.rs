use serde::Deserialize;
use serde::Serialize;

/// How the user wants a batch of files delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendFilesWay {
    pub group_files: bool,
    pub send_images_as_photos: bool,
    pub send_high_quality: bool,
}

impl Default for SendFilesWay {
    fn default() -> Self {
        Self {
            group_files: true,
            send_images_as_photos: true,
            send_high_quality: false,
        }
    }
}

impl SendFilesWay {
    /// Stable integer form used by persisted settings.
    ///
    /// The low two bits select the grouping/compression pair, bit 2 stores high quality.
    pub fn serialize(self) -> i32 {
        let base = match (self.send_images_as_photos, self.group_files) {
            (true, true) => 0,
            (true, false) => 1,
            (false, false) => 2,
            (false, true) => 3,
        };
        base | if self.send_high_quality { 4 } else { 0 }
    }

    pub fn from_serialized(value: i32) -> Option<Self> {
        if !(0..=7).contains(&value) {
            return None;
        }
        let low = value & 0x03;
        Some(Self {
            group_files: low == 0 || low == 3,
            send_images_as_photos: low < 2,
            send_high_quality: value & 0x04 != 0,
        })
    }
}
