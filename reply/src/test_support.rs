//! Recording fakes for the reply area collaborators.

use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use story_reply_protocol::AlbumItem;
use story_reply_protocol::MessageToSend;
use story_reply_protocol::PeerId;
use story_reply_protocol::PreparedList;
use story_reply_protocol::Recipient;
use story_reply_protocol::ReplyTarget;
use story_reply_protocol::SendAction;
use story_reply_protocol::SendMediaType;
use story_reply_protocol::SendingAlbum;
use story_reply_protocol::StoryId;
use story_reply_protocol::TextWithTags;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::watch;

use crate::EventOutcome;
use crate::ReplyArea;
use crate::ReplyAreaConfig;
use crate::ReplyAreaDescriptor;
use crate::ReplyEvent;
use crate::ReplyEventSender;
use crate::collaborators::Composer;
use crate::collaborators::FileDialog;
use crate::collaborators::FileDialogFilter;
use crate::collaborators::OpenCallback;
use crate::collaborators::OpenResult;
use crate::collaborators::SendFilesBox;
use crate::collaborators::SessionApi;
use crate::collaborators::UiShow;

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().expect("test state lock")
}

/// One call into the session layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Dispatch {
    Message {
        action: SendAction,
        text: String,
    },
    Voice {
        action: SendAction,
        duration_ms: u64,
    },
    File {
        action: SendAction,
        media_type: SendMediaType,
        size: usize,
    },
    Files {
        action: SendAction,
        media_type: SendMediaType,
        names: Vec<String>,
        caption: String,
        album: Option<u64>,
    },
}

impl Dispatch {
    pub(crate) fn action(&self) -> &SendAction {
        match self {
            Dispatch::Message { action, .. }
            | Dispatch::Voice { action, .. }
            | Dispatch::File { action, .. }
            | Dispatch::Files { action, .. } => action,
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeSession {
    pub premium: Mutex<bool>,
    pub dispatches: Mutex<Vec<Dispatch>>,
    pub albums: Mutex<Vec<Arc<SendingAlbum>>>,
}

impl FakeSession {
    pub(crate) fn dispatches(&self) -> Vec<Dispatch> {
        lock(&self.dispatches).clone()
    }
}

impl SessionApi for FakeSession {
    fn is_premium(&self) -> bool {
        *lock(&self.premium)
    }

    fn send_message(&self, message: MessageToSend) {
        lock(&self.dispatches).push(Dispatch::Message {
            action: message.action,
            text: message.text.text,
        });
    }

    fn send_voice_message(
        &self,
        _bytes: Vec<u8>,
        _waveform: Vec<u8>,
        duration_ms: u64,
        action: SendAction,
    ) {
        lock(&self.dispatches).push(Dispatch::Voice {
            action,
            duration_ms,
        });
    }

    fn send_file(&self, content: Vec<u8>, media_type: SendMediaType, action: SendAction) {
        lock(&self.dispatches).push(Dispatch::File {
            action,
            media_type,
            size: content.len(),
        });
    }

    fn send_files(
        &self,
        list: PreparedList,
        media_type: SendMediaType,
        caption: TextWithTags,
        album: Option<Arc<SendingAlbum>>,
        action: SendAction,
    ) {
        if let Some(album) = &album {
            for file in &list.files {
                album.push(AlbumItem {
                    display_name: file.display_name.clone(),
                    size: file.size,
                });
            }
            lock(&self.albums).push(Arc::clone(album));
        }
        lock(&self.dispatches).push(Dispatch::Files {
            action,
            media_type,
            names: list.files.into_iter().map(|f| f.display_name).collect(),
            caption: caption.text,
            album: album.map(|album| album.group_id),
        });
    }
}

#[derive(Default)]
pub(crate) struct ComposerState {
    pub text: TextWithTags,
    pub web_page_id: Option<u64>,
    pub send_as: Option<PeerId>,
    pub clears: usize,
    pub listen_clears: usize,
    pub panels_hidden: usize,
    pub histories: Vec<Option<PeerId>>,
    pub absorb_media_edits: bool,
    pub absorbed: Vec<PreparedList>,
    pub restored: Vec<String>,
}

pub(crate) struct FakeComposer {
    state: Arc<Mutex<ComposerState>>,
    focus: watch::Receiver<bool>,
}

impl Composer for FakeComposer {
    fn text_with_applied_markdown(&self) -> TextWithTags {
        lock(&self.state).text.clone()
    }

    fn web_page_id(&self) -> Option<u64> {
        lock(&self.state).web_page_id
    }

    fn send_as_peer(&self) -> Option<PeerId> {
        lock(&self.state).send_as
    }

    fn clear(&mut self) {
        let mut state = lock(&self.state);
        state.text = TextWithTags::default();
        state.clears += 1;
    }

    fn clear_listen_state(&mut self) {
        lock(&self.state).listen_clears += 1;
    }

    fn hide_panels_animated(&mut self) {
        lock(&self.state).panels_hidden += 1;
    }

    fn set_history(&mut self, history: Option<PeerId>) {
        lock(&self.state).histories.push(history);
    }

    fn confirm_media_edit(&mut self, list: &PreparedList) -> bool {
        let mut state = lock(&self.state);
        if state.absorb_media_edits {
            state.absorbed.push(list.clone());
        }
        state.absorb_media_edits
    }

    fn restore_text(&mut self, text: &str) {
        lock(&self.state).restored.push(text.to_string());
    }

    fn focused_value(&self) -> watch::Receiver<bool> {
        self.focus.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum UiCall {
    Toast(String),
    FileSizeLimit(u64),
    FilesBox,
    HideLayer,
    UnfocusReply,
    FocusSurface,
}

#[derive(Default)]
pub(crate) struct UiState {
    pub calls: Vec<UiCall>,
    pub boxes: Vec<SendFilesBox>,
}

pub(crate) struct FakeUi {
    state: Arc<Mutex<UiState>>,
}

impl UiShow for FakeUi {
    fn show_toast(&mut self, text: &str) {
        lock(&self.state).calls.push(UiCall::Toast(text.to_string()));
    }

    fn show_file_size_limit_box(&mut self, file_size: u64) {
        lock(&self.state)
            .calls
            .push(UiCall::FileSizeLimit(file_size));
    }

    fn show_send_files_box(&mut self, files_box: SendFilesBox) {
        let mut state = lock(&self.state);
        state.calls.push(UiCall::FilesBox);
        state.boxes.push(files_box);
    }

    fn hide_layer(&mut self) {
        lock(&self.state).calls.push(UiCall::HideLayer);
    }

    fn unfocus_reply(&mut self) {
        lock(&self.state).calls.push(UiCall::UnfocusReply);
    }

    fn focus_surface(&mut self) {
        lock(&self.state).calls.push(UiCall::FocusSurface);
    }
}

pub(crate) struct OpenDialog {
    pub filter: FileDialogFilter,
    pub callback: OpenCallback,
}

#[derive(Default)]
pub(crate) struct DialogState {
    pub opened: usize,
    pub pending: Vec<OpenDialog>,
}

pub(crate) struct FakeDialog {
    state: Arc<Mutex<DialogState>>,
}

impl FileDialog for FakeDialog {
    fn get_open_paths(&mut self, _caption: &str, filter: FileDialogFilter, callback: OpenCallback) {
        let mut state = lock(&self.state);
        state.opened += 1;
        state.pending.push(OpenDialog { filter, callback });
    }
}

/// A reply area wired to recording fakes, with the event loop driven by hand.
pub(crate) struct Harness {
    pub area: ReplyArea,
    pub session: Arc<FakeSession>,
    pub composer: Arc<Mutex<ComposerState>>,
    pub ui: Arc<Mutex<UiState>>,
    pub dialog: Arc<Mutex<DialogState>>,
    pub focus_tx: watch::Sender<bool>,
    rx: UnboundedReceiver<ReplyEvent>,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::with_config(ReplyAreaConfig::default())
    }

    pub(crate) fn with_config(config: ReplyAreaConfig) -> Self {
        let (tx, rx) = unbounded_channel();
        let (focus_tx, focus_rx) = watch::channel(false);
        let session = Arc::new(FakeSession::default());
        let composer = Arc::new(Mutex::new(ComposerState::default()));
        let ui = Arc::new(Mutex::new(UiState::default()));
        let dialog = Arc::new(Mutex::new(DialogState::default()));

        let area = ReplyArea::new(ReplyAreaDescriptor {
            composer: Box::new(FakeComposer {
                state: Arc::clone(&composer),
                focus: focus_rx,
            }),
            session: Arc::clone(&session) as Arc<dyn SessionApi>,
            file_dialog: Box::new(FakeDialog {
                state: Arc::clone(&dialog),
            }),
            ui: Box::new(FakeUi {
                state: Arc::clone(&ui),
            }),
            events: ReplyEventSender::new(tx),
            config,
        });

        Self {
            area,
            session,
            composer,
            ui,
            dialog,
            focus_tx,
            rx,
        }
    }

    /// A harness already showing story 1 of `recipient`.
    pub(crate) fn showing(recipient: Recipient) -> Self {
        let mut harness = Self::new();
        harness.area.show(ReplyTarget::new(recipient, StoryId(1)));
        harness
    }

    /// Feed every queued event to the reply area.
    pub(crate) fn pump(&mut self) -> Vec<EventOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            outcomes.push(self.area.handle_event(event));
        }
        outcomes
    }

    pub(crate) fn set_text(&self, text: &str) {
        lock(&self.composer).text = TextWithTags::plain(text);
    }

    pub(crate) fn dispatches(&self) -> Vec<Dispatch> {
        self.session.dispatches()
    }

    pub(crate) fn ui_calls(&self) -> Vec<UiCall> {
        lock(&self.ui).calls.clone()
    }

    /// Take the most recently shown files box.
    pub(crate) fn take_files_box(&self) -> SendFilesBox {
        lock(&self.ui).boxes.pop().expect("files box shown")
    }

    /// Resolve the oldest open dialog with `result`.
    pub(crate) fn complete_dialog(&self, result: OpenResult) {
        let dialog = lock(&self.dialog).pending.remove(0);
        (dialog.callback)(result);
    }

    pub(crate) fn dialogs_opened(&self) -> usize {
        lock(&self.dialog).opened
    }
}

pub(crate) fn alice() -> Recipient {
    Recipient::new(PeerId(100), "Alice")
}

pub(crate) fn bob() -> Recipient {
    Recipient::new(PeerId(200), "Bob")
}

/// Write a real PNG of the given size into `dir`.
pub(crate) fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> std::path::PathBuf {
    let path = dir.join(name);
    image::RgbImage::new(width, height)
        .save_with_format(&path, image::ImageFormat::Png)
        .expect("write png");
    path
}

pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = std::io::Cursor::new(Vec::new());
    image::RgbImage::new(width, height)
        .write_to(&mut bytes, image::ImageFormat::Png)
        .expect("encode png");
    bytes.into_inner()
}
