//! Splits a confirmed [`PreparedList`] into the groups dispatched one send action each.
//!
//! Consecutive files that map to the same [`AlbumType`] share a group. Album groups are capped at
//! [`MAX_ALBUM_ITEMS`]; a `None` group may hold several files that are uploaded independently.
//! With slow mode applied every file is its own group, whatever way was requested.

use story_reply_protocol::AlbumType;
use story_reply_protocol::MAX_ALBUM_ITEMS;
use story_reply_protocol::PreparedFile;
use story_reply_protocol::PreparedFileType;
use story_reply_protocol::PreparedList;
use story_reply_protocol::SendFilesWay;
use story_reply_protocol::SendGroup;

pub fn divide_by_groups(
    list: PreparedList,
    way: SendFilesWay,
    slowmode_applied: bool,
) -> Vec<SendGroup> {
    let PreparedList {
        files,
        override_send_images_as_photos,
        ..
    } = list;
    let make_list = |files: Vec<PreparedFile>| PreparedList {
        files,
        override_send_images_as_photos,
        ..Default::default()
    };

    let mut groups = Vec::new();
    if slowmode_applied {
        groups.extend(files.into_iter().map(|file| SendGroup {
            list: make_list(vec![file]),
            album_type: AlbumType::None,
            sent_with_caption: false,
        }));
    } else {
        let mut current: Vec<PreparedFile> = Vec::new();
        let mut current_type = AlbumType::None;
        for file in files {
            let file_type = album_type_for(&file, way);
            let full = current_type.is_album() && current.len() == MAX_ALBUM_ITEMS;
            if !current.is_empty() && (current_type != file_type || full) {
                groups.push(SendGroup {
                    list: make_list(std::mem::take(&mut current)),
                    album_type: current_type,
                    sent_with_caption: false,
                });
            }
            current.push(file);
            current_type = file_type;
        }
        if !current.is_empty() {
            groups.push(SendGroup {
                list: make_list(current),
                album_type: current_type,
                sent_with_caption: false,
            });
        }
    }

    if let [only] = groups.as_mut_slice()
        && can_carry_caption(only)
    {
        only.sent_with_caption = true;
    }
    tracing::debug!(
        groups = groups.len(),
        slowmode_applied,
        group_files = way.group_files,
        "divided files into send groups"
    );
    groups
}

fn album_type_for(file: &PreparedFile, way: SendFilesWay) -> AlbumType {
    if !way.group_files {
        return AlbumType::None;
    }
    match file.file_type {
        PreparedFileType::Music => AlbumType::Music,
        PreparedFileType::Video => AlbumType::PhotoVideo,
        PreparedFileType::Photo if way.send_images_as_photos => AlbumType::PhotoVideo,
        PreparedFileType::Photo | PreparedFileType::File | PreparedFileType::None => {
            AlbumType::File
        }
    }
}

/// A single file, or a media album, can show a caption under it.
fn can_carry_caption(group: &SendGroup) -> bool {
    group.list.files.len() == 1 || group.album_type == AlbumType::PhotoVideo
}
