use serde::Deserialize;
use serde::Serialize;

use crate::PeerId;
use crate::StoryId;

/// Per-recipient permissions for what a reply may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientRights {
    pub send_plain: bool,
    pub send_photos: bool,
    pub send_videos: bool,
    pub send_music: bool,
    pub send_files: bool,
    pub send_voice: bool,
}

impl RecipientRights {
    pub const ALL: Self = Self {
        send_plain: true,
        send_photos: true,
        send_videos: true,
        send_music: true,
        send_files: true,
        send_voice: true,
    };

    pub fn any_media(&self) -> bool {
        self.send_photos || self.send_videos || self.send_music || self.send_files
    }
}

impl Default for RecipientRights {
    fn default() -> Self {
        Self::ALL
    }
}

/// Snapshot of the user a story reply is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: PeerId,
    pub name: String,
    #[serde(default)]
    pub rights: RecipientRights,
    /// The recipient only accepts messages from premium accounts.
    #[serde(default)]
    pub premium_required_to_write: bool,
    /// Slow mode forbids multi-file sends in one action.
    #[serde(default)]
    pub slowmode_applied: bool,
    /// Seconds until the next immediate send is allowed.
    #[serde(default)]
    pub slowmode_seconds_left: u32,
}

impl Recipient {
    pub fn new(id: PeerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            rights: RecipientRights::ALL,
            premium_required_to_write: false,
            slowmode_applied: false,
            slowmode_seconds_left: 0,
        }
    }
}

/// The (recipient, story) pair a reply is currently aimed at.
///
/// Equality only looks at identities: a refreshed recipient snapshot with the same id and story
/// is the same target.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplyTarget {
    pub recipient: Option<Recipient>,
    pub story_id: StoryId,
}

impl ReplyTarget {
    pub fn new(recipient: Recipient, story_id: StoryId) -> Self {
        Self {
            recipient: Some(recipient),
            story_id,
        }
    }

    pub fn recipient_id(&self) -> Option<PeerId> {
        self.recipient.as_ref().map(|recipient| recipient.id)
    }
}

impl PartialEq for ReplyTarget {
    fn eq(&self, other: &Self) -> bool {
        self.recipient_id() == other.recipient_id() && self.story_id == other.story_id
    }
}

impl Eq for ReplyTarget {}
