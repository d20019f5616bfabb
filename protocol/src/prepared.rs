use std::path::PathBuf;

use derive_more::IsVariant;
use serde::Deserialize;
use serde::Serialize;

/// Media classification of a prepared file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum PreparedFileType {
    /// Not classified yet (still waiting for processing).
    #[default]
    None,
    Photo,
    Video,
    Music,
    File,
}

/// One candidate upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedFile {
    /// Local path, when the file comes from disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// In-memory bytes, when the file comes from the clipboard or a remote dialog.
    #[serde(skip)]
    pub content: Option<Vec<u8>>,
    pub display_name: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub file_type: PreparedFileType,
    /// Pixel size for photos and videos.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<(u32, u32)>,
    #[serde(default)]
    pub is_animated: bool,
}

impl PreparedFile {
    pub fn from_path(path: PathBuf, size: u64) -> Self {
        let display_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            path: Some(path),
            display_name,
            size,
            ..Default::default()
        }
    }

    pub fn from_content(display_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            display_name: display_name.into(),
            size: content.len() as u64,
            content: Some(content),
            ..Default::default()
        }
    }
}

/// Outcome of preparing a list. Anything but `None` blocks dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum PreparedListError {
    #[default]
    None,
    EmptyFile,
    Directory,
    NonLocalUrl,
    TooLargeFile,
}

/// Normalized description of everything pending a send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedList {
    pub error: PreparedListError,
    /// Name (or URL) of the offending input when `error` is set.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error_data: String,
    pub files: Vec<PreparedFile>,
    /// Files whose classification has not finished yet. Must be empty before dispatch.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files_to_process: Vec<PreparedFile>,
    /// Forces "send images as photos" (or as files) regardless of the chosen way.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_send_images_as_photos: Option<bool>,
}

impl PreparedList {
    pub fn new(files: Vec<PreparedFile>) -> Self {
        Self {
            files,
            ..Default::default()
        }
    }

    pub fn with_error(error: PreparedListError, error_data: impl Into<String>) -> Self {
        Self {
            error,
            error_data: error_data.into(),
            ..Default::default()
        }
    }

    pub fn has_error(&self) -> bool {
        !self.error.is_none()
    }

    /// Size of the last file, which is the offending one for `TooLargeFile`.
    pub fn last_file_size(&self) -> Option<u64> {
        self.files.last().map(|file| file.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn from_path_uses_file_name_for_display() {
        let file = PreparedFile::from_path(PathBuf::from("/tmp/dir/photo.jpg"), 12);
        assert_eq!(file.display_name, "photo.jpg");
        assert_eq!(file.size, 12);
        assert_eq!(file.file_type, PreparedFileType::None);
    }

    #[test]
    fn last_file_size_reports_offending_file() {
        let mut list = PreparedList::new(vec![
            PreparedFile::from_content("a", vec![1, 2, 3]),
            PreparedFile::from_path(PathBuf::from("big.bin"), 2_000_000_000),
        ]);
        list.error = PreparedListError::TooLargeFile;
        assert!(list.has_error());
        assert_eq!(list.last_file_size(), Some(2_000_000_000));
        assert_eq!(PreparedList::default().last_file_size(), None);
    }

    #[test]
    fn in_memory_content_is_not_serialized() {
        let file = PreparedFile::from_content("clip.png", vec![0; 4]);
        let json = serde_json::to_value(&file).expect("serialize");
        assert!(json.get("content").is_none());
        assert_eq!(json["size"], 4);
    }
}
