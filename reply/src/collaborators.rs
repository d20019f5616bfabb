//! Interfaces of the surfaces a [`ReplyArea`](crate::ReplyArea) drives but does not own.

use std::path::PathBuf;
use std::sync::Arc;

use story_reply_protocol::MessageToSend;
use story_reply_protocol::PeerId;
use story_reply_protocol::PreparedList;
use story_reply_protocol::SendAction;
use story_reply_protocol::SendFilesWay;
use story_reply_protocol::SendMediaType;
use story_reply_protocol::SendOptions;
use story_reply_protocol::SendingAlbum;
use story_reply_protocol::TextWithTags;
use tokio::sync::watch;

use crate::FilesConfirmed;
use crate::Guard;
use crate::ReplyEvent;
use crate::ReplyEventSender;

/// The text input with its panels (emoji, voice recorder, web page preview).
pub trait Composer {
    /// Current text with markdown shortcuts converted into tags.
    fn text_with_applied_markdown(&self) -> TextWithTags;
    fn web_page_id(&self) -> Option<u64>;
    fn send_as_peer(&self) -> Option<PeerId>;

    fn clear(&mut self);
    /// Drop the recorded voice preview without touching the text.
    fn clear_listen_state(&mut self);
    fn hide_panels_animated(&mut self);
    fn set_history(&mut self, history: Option<PeerId>);

    /// Offer `list` to an already open media editor. Returns `true` when it was absorbed there.
    fn confirm_media_edit(&mut self, list: &PreparedList) -> bool;
    fn restore_text(&mut self, text: &str);

    fn focused_value(&self) -> watch::Receiver<bool>;
}

/// Network layer. Every call is fire-and-forget; delivery and retries are its own concern.
pub trait SessionApi: Send + Sync {
    fn is_premium(&self) -> bool;
    fn send_message(&self, message: MessageToSend);
    fn send_voice_message(
        &self,
        bytes: Vec<u8>,
        waveform: Vec<u8>,
        duration_ms: u64,
        action: SendAction,
    );
    fn send_file(&self, content: Vec<u8>, media_type: SendMediaType, action: SendAction);
    /// Upload every file of `list`. Files of an album group all reference the same `album`.
    fn send_files(
        &self,
        list: PreparedList,
        media_type: SendMediaType,
        caption: TextWithTags,
        album: Option<Arc<SendingAlbum>>,
        action: SendAction,
    );
}

/// Which filter the open dialog selects first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileDialogFilter {
    ImagesOrAll,
    AllOrImages,
}

/// Files picked in the open dialog.
///
/// Platforms that hand back content instead of paths (sandboxed pickers, remote storage) fill
/// `remote_content`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenResult {
    pub paths: Vec<PathBuf>,
    pub remote_content: Vec<u8>,
}

impl OpenResult {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.remote_content.is_empty()
    }
}

pub type OpenCallback = Box<dyn FnOnce(OpenResult) + Send>;

pub trait FileDialog {
    /// Open the dialog without blocking. `callback` runs at most once; a dialog dismissed
    /// without a choice may drop it instead.
    fn get_open_paths(&mut self, caption: &str, filter: FileDialogFilter, callback: OpenCallback);
}

/// Toasts, boxes and focus handling of the story viewer.
pub trait UiShow {
    fn show_toast(&mut self, text: &str);
    fn show_file_size_limit_box(&mut self, file_size: u64);
    fn show_send_files_box(&mut self, files_box: SendFilesBox);
    fn hide_layer(&mut self);
    fn unfocus_reply(&mut self);
    /// Move keyboard focus back to the story viewer after a send.
    fn focus_surface(&mut self);
}

/// The files confirmation surface's model.
///
/// The surface may edit `list`, `caption` and `way`, then finishes with exactly one of
/// [`confirm`](Self::confirm) or [`cancel`](Self::cancel). Both post an event back to the reply
/// area that opened it; the event is dropped there if the shown recipient changed meanwhile.
#[derive(Debug)]
pub struct SendFilesBox {
    pub list: PreparedList,
    pub caption: TextWithTags,
    pub way: SendFilesWay,
    pub insert_text_on_cancel: String,
    guard: Guard,
    events: ReplyEventSender,
}

impl SendFilesBox {
    pub(crate) fn new(
        list: PreparedList,
        caption: TextWithTags,
        way: SendFilesWay,
        insert_text_on_cancel: String,
        guard: Guard,
        events: ReplyEventSender,
    ) -> Self {
        Self {
            list,
            caption,
            way,
            insert_text_on_cancel,
            guard,
            events,
        }
    }

    pub fn confirm(self, options: SendOptions, ctrl_shift_enter: bool) {
        self.events
            .send(ReplyEvent::SendingFilesConfirmed(FilesConfirmed {
                guard: self.guard,
                list: self.list,
                way: self.way,
                caption: self.caption,
                options,
                ctrl_shift_enter,
            }));
    }

    pub fn cancel(self) {
        self.events.send(ReplyEvent::SendingFilesCancelled {
            guard: self.guard,
            insert_text_on_cancel: self.insert_text_on_cancel,
        });
    }
}
