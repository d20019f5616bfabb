use serde::Deserialize;
use serde::Serialize;
use strum_macros::Display;

use crate::FullStoryId;
use crate::PeerId;
use crate::TextWithTags;

/// Options chosen by the user for a single send (from the send button or its menu).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendOptions {
    /// Unix timestamp for a scheduled send. `None` sends immediately.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled: Option<i64>,
    #[serde(default)]
    pub silent: bool,
    /// Identity to send as, when the composer offers one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_as: Option<PeerId>,
}

impl SendOptions {
    pub fn is_scheduled(&self) -> bool {
        self.scheduled.is_some_and(|at| at != 0)
    }
}

/// What a send replies to. Story replies only ever carry `story_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullReplyTo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_id: Option<FullStoryId>,
}

/// Recipient-scoped context for one dispatch.
///
/// `reply_to` is captured when the action is built and never follows later retargeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendAction {
    /// History (chat) the send lands in.
    pub history: PeerId,
    pub options: SendOptions,
    pub reply_to: FullReplyTo,
    /// Whether the session should clear a cloud draft for `history` after sending.
    pub clear_draft: bool,
}

impl SendAction {
    pub fn new(history: PeerId, options: SendOptions) -> Self {
        Self {
            history,
            options,
            reply_to: FullReplyTo::default(),
            clear_draft: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageToSend {
    pub action: SendAction,
    pub text: TextWithTags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_page_id: Option<u64>,
}

impl MessageToSend {
    pub fn new(action: SendAction) -> Self {
        Self {
            action,
            text: TextWithTags::default(),
            web_page_id: None,
        }
    }
}

/// A recorded voice note ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceToSend {
    pub bytes: Vec<u8>,
    /// Compressed amplitude summary rendered by the receiving side.
    pub waveform: Vec<u8>,
    pub duration_ms: u64,
    pub options: SendOptions,
}

/// How uploaded media should be presented by the receiving side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SendMediaType {
    Photo,
    Audio,
    File,
}
