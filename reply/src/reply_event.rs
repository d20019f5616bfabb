//! Events routed into a [`ReplyArea`](crate::ReplyArea).
//!
//! Composer requests and completions from asynchronous collaborators (the file dialog, the files
//! confirmation surface) all arrive here. Using an event for completions avoids handing the
//! collaborators a reference back into the reply area.

use story_reply_protocol::PeerId;
use story_reply_protocol::PreparedList;
use story_reply_protocol::SendFilesWay;
use story_reply_protocol::SendOptions;
use story_reply_protocol::TextWithTags;
use story_reply_protocol::VoiceToSend;
use strum_macros::Display;

use crate::Guard;
use crate::MimeData;
use crate::collaborators::OpenResult;

#[allow(clippy::large_enum_variant)]
#[derive(Debug)]
pub enum ReplyEvent {
    /// Escape in the composer: give focus back to the story viewer.
    CancelRequested,
    SendRequested(SendOptions),
    SendVoiceRequested(VoiceToSend),

    /// Attach button pressed. `Some(true)` asks for images to be sent as photos.
    AttachRequested {
        override_send_images_as_photos: Option<bool>,
    },

    /// The file dialog returned. `guard` is the shown-recipient guard captured when it opened.
    AttachDialogFinished {
        guard: Guard,
        override_send_images_as_photos: Option<bool>,
        result: OpenResult,
    },

    SendingFilesConfirmed(FilesConfirmed),

    /// The files confirmation surface was dismissed.
    SendingFilesCancelled {
        guard: Guard,
        insert_text_on_cancel: String,
    },

    /// Content pasted or dropped onto the composer.
    PasteMimeData {
        data: MimeData,
        override_send_images_as_photos: Option<bool>,
    },

    FileChosen(ChosenDocument),
    PhotoChosen(ChosenPhoto),
    InlineResultChosen(ChosenInlineResult),
}

/// Everything the files confirmation surface hands back on confirm.
#[derive(Debug)]
pub struct FilesConfirmed {
    pub guard: Guard,
    pub list: PreparedList,
    pub way: SendFilesWay,
    pub caption: TextWithTags,
    pub options: SendOptions,
    pub ctrl_shift_enter: bool,
}

/// A document picked from the sticker/GIF panels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChosenDocument {
    pub document_id: u64,
    pub options: SendOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChosenPhoto {
    pub photo_id: u64,
    pub options: SendOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChosenInlineResult {
    pub query_id: u64,
    pub result_id: String,
    pub bot: PeerId,
    pub options: SendOptions,
}

/// What [`ReplyArea::handle_event`](crate::ReplyArea::handle_event) did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Handled,
    /// Nothing to do: no recipient, an attach already in flight, an empty dialog result, or
    /// content the reply area declined.
    Ignored,
    /// A completion that belongs to a recipient no longer shown.
    Dropped,
    Unsupported(UnsupportedSend),
}

/// Sends a story reply cannot issue yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum UnsupportedSend {
    ExistingDocument,
    ExistingPhoto,
    InlineResult,
}
