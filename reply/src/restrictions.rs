//! Policy checks deciding whether the current recipient accepts a reply.
//!
//! Everything here is a pure function of its inputs; presenting the result is up to the caller.

use story_reply_protocol::PreparedFile;
use story_reply_protocol::PreparedFileType;
use story_reply_protocol::PreparedList;
use story_reply_protocol::PreparedListError;
use story_reply_protocol::Recipient;
use story_reply_protocol::TextWithTags;
use strum_macros::Display;
use thiserror::Error;

/// Kind of content a recipient can forbid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum MediaRight {
    Photos,
    Videos,
    Music,
    Files,
    #[strum(serialize = "voice messages")]
    Voice,
    /// Every media kind at once.
    Media,
}

/// Why a prepared list cannot be sent. `Display` is the user-facing text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendingFilesError {
    #[error("Sending {0} isn't allowed here.")]
    Restricted(MediaRight),

    #[error("Could not send an empty file or a folder: {name}")]
    CannotSend { name: String },

    /// Rendered as a dedicated size-limit surface rather than a toast.
    #[error("The file is too large to send ({size} bytes).")]
    TooLarge { size: u64 },

    #[error("Sorry, no way to send files here.")]
    Unsupported,
}

/// Why a text message should not be sent right now.
///
/// Unlike [`SendingFilesError`] these are warnings: the message is still dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendingTextError {
    #[error("Sending messages isn't allowed here.")]
    Restricted,

    #[error("{name} only accepts messages from Premium subscribers.")]
    PremiumRequired { name: String },

    #[error("Slow mode is on. You can send your next message in {}.", format_countdown(.seconds_left))]
    SlowmodeCountdown { seconds_left: u32 },
}

/// Full check for a list about to be confirmed or dispatched.
///
/// `compress` is the resolved "send images as photos" decision; when `None` the list's own
/// override is used, and photos are not checked at all if neither is known.
pub fn sending_files_error(
    recipient: Option<&Recipient>,
    list: &PreparedList,
    compress: Option<bool>,
) -> Option<SendingFilesError> {
    let compress = compress.or(list.override_send_images_as_photos);
    if let Some(recipient) = recipient
        && let Some(error) = list_restriction_error(recipient, list, compress)
    {
        return Some(error);
    }

    match list.error {
        PreparedListError::None => None,
        PreparedListError::EmptyFile
        | PreparedListError::Directory
        | PreparedListError::NonLocalUrl => Some(SendingFilesError::CannotSend {
            name: list.error_data.clone(),
        }),
        PreparedListError::TooLargeFile => match list.last_file_size() {
            Some(size) => Some(SendingFilesError::TooLarge { size }),
            None => Some(SendingFilesError::Unsupported),
        },
    }
}

/// First recipient-level restriction hit by any file of `list`.
pub fn list_restriction_error(
    recipient: &Recipient,
    list: &PreparedList,
    compress: Option<bool>,
) -> Option<SendingFilesError> {
    list.files
        .iter()
        .find_map(|file| file_restriction_error(recipient, file, compress))
}

pub fn file_restriction_error(
    recipient: &Recipient,
    file: &PreparedFile,
    compress: Option<bool>,
) -> Option<SendingFilesError> {
    let right = match file.file_type {
        PreparedFileType::Photo => match compress {
            Some(true) => MediaRight::Photos,
            Some(false) => MediaRight::Files,
            None => return None,
        },
        PreparedFileType::Video => MediaRight::Videos,
        PreparedFileType::Music => MediaRight::Music,
        PreparedFileType::File | PreparedFileType::None => MediaRight::Files,
    };
    (!allows(recipient, right)).then_some(SendingFilesError::Restricted(right))
}

/// Whether the recipient accepts no media at all; checked before opening the file picker.
pub fn any_file_restriction_error(recipient: &Recipient) -> Option<SendingFilesError> {
    (!recipient.rights.any_media()).then_some(SendingFilesError::Restricted(MediaRight::Media))
}

pub fn voice_restriction_error(recipient: &Recipient) -> Option<SendingFilesError> {
    (!allows(recipient, MediaRight::Voice))
        .then_some(SendingFilesError::Restricted(MediaRight::Voice))
}

/// Check a text message body. `ignore_slowmode_countdown` is set for scheduled sends.
pub fn sending_text_error(
    recipient: &Recipient,
    text: &TextWithTags,
    self_premium: bool,
    ignore_slowmode_countdown: bool,
) -> Option<SendingTextError> {
    if !text.is_empty() && !recipient.rights.send_plain {
        return Some(SendingTextError::Restricted);
    }
    if recipient.premium_required_to_write && !self_premium {
        return Some(SendingTextError::PremiumRequired {
            name: recipient.name.clone(),
        });
    }
    if !ignore_slowmode_countdown && recipient.slowmode_seconds_left > 0 {
        return Some(SendingTextError::SlowmodeCountdown {
            seconds_left: recipient.slowmode_seconds_left,
        });
    }
    None
}

fn allows(recipient: &Recipient, right: MediaRight) -> bool {
    let rights = &recipient.rights;
    match right {
        MediaRight::Photos => rights.send_photos,
        MediaRight::Videos => rights.send_videos,
        MediaRight::Music => rights.send_music,
        MediaRight::Files => rights.send_files,
        MediaRight::Voice => rights.send_voice,
        MediaRight::Media => rights.any_media(),
    }
}

// thiserror hands fields over by reference.
#[allow(clippy::trivially_copy_pass_by_ref)]
fn format_countdown(seconds: &u32) -> String {
    let (hours, minutes, seconds) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use pretty_assertions::assert_eq;
    use story_reply_protocol::PeerId;
    use story_reply_protocol::RecipientRights;

    fn recipient() -> Recipient {
        Recipient::new(PeerId(10), "Alice")
    }

    fn file(name: &str, file_type: PreparedFileType, size: u64) -> PreparedFile {
        PreparedFile {
            file_type,
            ..PreparedFile::from_path(PathBuf::from(name), size)
        }
    }

    fn photos(names: &[&str]) -> PreparedList {
        PreparedList::new(
            names
                .iter()
                .map(|name| file(name, PreparedFileType::Photo, 2_000_000))
                .collect(),
        )
    }

    #[test]
    fn clean_list_passes() {
        assert_eq!(
            sending_files_error(Some(&recipient()), &photos(&["a.jpg"]), Some(true)),
            None
        );
    }

    #[test]
    fn structural_errors_name_the_input() {
        for error in [
            PreparedListError::EmptyFile,
            PreparedListError::Directory,
            PreparedListError::NonLocalUrl,
        ] {
            let list = PreparedList::with_error(error, "/tmp/thing");
            assert_eq!(
                sending_files_error(Some(&recipient()), &list, None),
                Some(SendingFilesError::CannotSend {
                    name: "/tmp/thing".to_string()
                }),
                "{error:?}"
            );
        }
    }

    #[test]
    fn too_large_reports_last_file_size() {
        let mut list = PreparedList::new(vec![
            file("small.txt", PreparedFileType::File, 10),
            file("huge.bin", PreparedFileType::File, 2_000_000_000),
        ]);
        list.error = PreparedListError::TooLargeFile;
        assert_eq!(
            sending_files_error(Some(&recipient()), &list, None),
            Some(SendingFilesError::TooLarge {
                size: 2_000_000_000
            })
        );
    }

    #[test]
    fn too_large_without_files_falls_back_to_generic_error() {
        let list = PreparedList::with_error(PreparedListError::TooLargeFile, "");
        assert_eq!(
            sending_files_error(None, &list, None),
            Some(SendingFilesError::Unsupported)
        );
    }

    #[test]
    fn recipient_restriction_supersedes_list_error() {
        let mut restricted = recipient();
        restricted.rights.send_files = false;
        let mut list = PreparedList::new(vec![file("doc.pdf", PreparedFileType::File, 5)]);
        list.error = PreparedListError::TooLargeFile;
        assert_eq!(
            sending_files_error(Some(&restricted), &list, None),
            Some(SendingFilesError::Restricted(MediaRight::Files))
        );
    }

    #[test]
    fn photo_check_follows_compression_decision() {
        let mut no_photos = recipient();
        no_photos.rights.send_photos = false;
        let list = photos(&["a.jpg"]);

        assert_eq!(
            sending_files_error(Some(&no_photos), &list, Some(true)),
            Some(SendingFilesError::Restricted(MediaRight::Photos))
        );
        assert_eq!(sending_files_error(Some(&no_photos), &list, Some(false)), None);
        assert_eq!(sending_files_error(Some(&no_photos), &list, None), None);
    }

    #[test]
    fn list_override_is_used_when_no_decision_given() {
        let mut no_photos = recipient();
        no_photos.rights.send_photos = false;
        let mut list = photos(&["a.jpg"]);
        list.override_send_images_as_photos = Some(true);
        assert_eq!(
            sending_files_error(Some(&no_photos), &list, None),
            Some(SendingFilesError::Restricted(MediaRight::Photos))
        );
    }

    #[test]
    fn any_file_restriction_requires_all_media_denied() {
        let mut only_music = recipient();
        only_music.rights = RecipientRights {
            send_photos: false,
            send_videos: false,
            send_files: false,
            ..RecipientRights::ALL
        };
        assert_eq!(any_file_restriction_error(&only_music), None);

        only_music.rights.send_music = false;
        let error = any_file_restriction_error(&only_music).expect("restricted");
        assert_eq!(error.to_string(), "Sending media isn't allowed here.");
    }

    #[test]
    fn voice_right_is_checked_on_its_own() {
        let mut no_voice = recipient();
        no_voice.rights.send_voice = false;
        assert_eq!(voice_restriction_error(&recipient()), None);

        let error = voice_restriction_error(&no_voice).expect("restricted");
        assert_eq!(error.to_string(), "Sending voice messages isn't allowed here.");
        assert_eq!(any_file_restriction_error(&no_voice), None);
    }

    #[test]
    fn slowmode_countdown_is_skipped_for_scheduled_sends() {
        let mut slow = recipient();
        slow.slowmode_seconds_left = 65;
        let text = TextWithTags::plain("hi");

        let error = sending_text_error(&slow, &text, false, false).expect("countdown");
        assert_eq!(
            error.to_string(),
            "Slow mode is on. You can send your next message in 1:05."
        );
        assert_eq!(sending_text_error(&slow, &text, false, true), None);
    }

    #[test]
    fn premium_only_recipient_rejects_regular_accounts() {
        let mut picky = recipient();
        picky.premium_required_to_write = true;
        let text = TextWithTags::plain("hi");
        assert_eq!(
            sending_text_error(&picky, &text, false, false),
            Some(SendingTextError::PremiumRequired {
                name: "Alice".to_string()
            })
        );
        assert_eq!(sending_text_error(&picky, &text, true, false), None);
    }

    #[test]
    fn countdown_formats_hours() {
        assert_eq!(format_countdown(&3_725), "1:02:05");
        assert_eq!(format_countdown(&9), "0:09");
    }
}
