use std::sync::Mutex;
use std::sync::PoisonError;

use derive_more::IsVariant;
use serde::Deserialize;
use serde::Serialize;

use crate::PreparedList;
use crate::SendOptions;

/// Largest number of files the receiving side accepts in one media group.
pub const MAX_ALBUM_ITEMS: usize = 10;

/// Grouping of a send group. Every variant except `None` is delivered as one album.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum AlbumType {
    #[default]
    None,
    PhotoVideo,
    Music,
    File,
}

impl AlbumType {
    pub fn is_album(self) -> bool {
        !self.is_none()
    }
}

/// A contiguous run of a prepared list dispatched as one send action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendGroup {
    pub list: PreparedList,
    pub album_type: AlbumType,
    /// This group carries the caption; at most one group of a division has it set.
    pub sent_with_caption: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumItem {
    pub display_name: String,
    pub size: u64,
}

/// Accumulator shared by every upload of one album so the remote side can reassemble them.
#[derive(Debug)]
pub struct SendingAlbum {
    pub group_id: u64,
    pub options: SendOptions,
    items: Mutex<Vec<AlbumItem>>,
}

impl SendingAlbum {
    pub fn new(group_id: u64, options: SendOptions) -> Self {
        Self {
            group_id,
            options,
            items: Mutex::new(Vec::new()),
        }
    }

    /// Record an upload queued against this album.
    pub fn push(&self, item: AlbumItem) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(item);
    }

    pub fn items(&self) -> Vec<AlbumItem> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn items_pushed_through_any_handle_are_shared() {
        let album = Arc::new(SendingAlbum::new(7, SendOptions::default()));
        let other = Arc::clone(&album);
        album.push(AlbumItem {
            display_name: "a.jpg".to_string(),
            size: 1,
        });
        other.push(AlbumItem {
            display_name: "b.jpg".to_string(),
            size: 2,
        });
        let items = album.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].display_name, "b.jpg");
    }

    #[test]
    fn only_none_is_not_an_album() {
        assert!(!AlbumType::None.is_album());
        assert!(AlbumType::PhotoVideo.is_album());
        assert!(AlbumType::Music.is_album());
        assert!(AlbumType::File.is_album());
    }
}
