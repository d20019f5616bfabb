//! Headless run of the reply pipeline: the files confirmation is accepted automatically and
//! every session call is recorded instead of being sent.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use serde::Serialize;
use story_reply::MimeData;
use story_reply::ReplyArea;
use story_reply::ReplyAreaConfig;
use story_reply::ReplyAreaDescriptor;
use story_reply::ReplyEventSender;
use story_reply::collaborators::Composer;
use story_reply::collaborators::FileDialog;
use story_reply::collaborators::FileDialogFilter;
use story_reply::collaborators::OpenCallback;
use story_reply::collaborators::SendFilesBox;
use story_reply::collaborators::SessionApi;
use story_reply::collaborators::UiShow;
use story_reply_protocol::AlbumItem;
use story_reply_protocol::MessageToSend;
use story_reply_protocol::PeerId;
use story_reply_protocol::PreparedFile;
use story_reply_protocol::PreparedList;
use story_reply_protocol::Recipient;
use story_reply_protocol::ReplyTarget;
use story_reply_protocol::SendAction;
use story_reply_protocol::SendFilesWay;
use story_reply_protocol::SendMediaType;
use story_reply_protocol::SendOptions;
use story_reply_protocol::SendingAlbum;
use story_reply_protocol::StoryId;
use story_reply_protocol::TextWithTags;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::watch;

/// Everything `story-reply plan` needs to know.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub recipient: Recipient,
    pub story: StoryId,
    pub caption: String,
    pub inputs: Vec<String>,
    /// `Some(false)` forces images to be sent as files.
    pub override_send_images_as_photos: Option<bool>,
    pub group_files: Option<bool>,
    pub premium: bool,
    pub options: SendOptions,
}

/// One recorded session call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Dispatch {
    Message {
        action: SendAction,
        text: TextWithTags,
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
        files: Vec<PreparedFile>,
        caption: TextWithTags,
        #[serde(skip_serializing_if = "Option::is_none")]
        album_id: Option<u64>,
        /// Items the album handle held once this upload was queued.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        album_items: Vec<AlbumItem>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanReport {
    pub dispatches: Vec<Dispatch>,
    /// Toasts and boxes the user would have seen.
    pub notices: Vec<String>,
    /// The way the confirmation was accepted with, if it was reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub way: Option<SendFilesWay>,
}

pub fn run_plan(request: PlanRequest, config: ReplyAreaConfig) -> PlanReport {
    let (tx, mut rx) = unbounded_channel();
    let report = Arc::new(Mutex::new(PlanReport::default()));
    let boxes = Arc::new(Mutex::new(Vec::new()));
    let (_focus_tx, focus_rx) = watch::channel(false);

    let mut area = ReplyArea::new(ReplyAreaDescriptor {
        composer: Box::new(CaptionComposer {
            caption: TextWithTags::plain(request.caption),
            focus: focus_rx,
        }),
        session: Arc::new(RecordingSession {
            premium: request.premium,
            report: Arc::clone(&report),
        }),
        file_dialog: Box::new(NoFileDialog),
        ui: Box::new(RecordingUi {
            report: Arc::clone(&report),
            boxes: Arc::clone(&boxes),
        }),
        events: ReplyEventSender::new(tx),
        config,
    });
    area.show(ReplyTarget::new(request.recipient, request.story));

    let data = MimeData {
        urls: request.inputs,
        ..Default::default()
    };
    if !area.confirm_sending_mime(&data, request.override_send_images_as_photos, String::new()) {
        lock(&report).notices.push("no files to send".to_string());
    }

    let shown: Vec<SendFilesBox> = std::mem::take(&mut *lock(&boxes));
    for mut files_box in shown {
        if let Some(group_files) = request.group_files {
            files_box.way.group_files = group_files;
        }
        lock(&report).way = Some(files_box.way);
        files_box.confirm(request.options.clone(), false);
    }
    while let Ok(event) = rx.try_recv() {
        let outcome = area.handle_event(event);
        tracing::debug!(?outcome, "handled reply event");
    }

    drop(area);
    std::mem::take(&mut *lock(&report))
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct CaptionComposer {
    caption: TextWithTags,
    focus: watch::Receiver<bool>,
}

impl Composer for CaptionComposer {
    fn text_with_applied_markdown(&self) -> TextWithTags {
        self.caption.clone()
    }

    fn web_page_id(&self) -> Option<u64> {
        None
    }

    fn send_as_peer(&self) -> Option<PeerId> {
        None
    }

    fn clear(&mut self) {}

    fn clear_listen_state(&mut self) {}

    fn hide_panels_animated(&mut self) {}

    fn set_history(&mut self, history: Option<PeerId>) {
        tracing::debug!(?history, "history set");
    }

    fn confirm_media_edit(&mut self, _list: &PreparedList) -> bool {
        false
    }

    fn restore_text(&mut self, _text: &str) {}

    fn focused_value(&self) -> watch::Receiver<bool> {
        self.focus.clone()
    }
}

struct RecordingSession {
    premium: bool,
    report: Arc<Mutex<PlanReport>>,
}

impl RecordingSession {
    fn record(&self, dispatch: Dispatch) {
        lock(&self.report).dispatches.push(dispatch);
    }
}

impl SessionApi for RecordingSession {
    fn is_premium(&self) -> bool {
        self.premium
    }

    fn send_message(&self, message: MessageToSend) {
        self.record(Dispatch::Message {
            action: message.action,
            text: message.text,
        });
    }

    fn send_voice_message(
        &self,
        _bytes: Vec<u8>,
        _waveform: Vec<u8>,
        duration_ms: u64,
        action: SendAction,
    ) {
        self.record(Dispatch::Voice {
            action,
            duration_ms,
        });
    }

    fn send_file(&self, content: Vec<u8>, media_type: SendMediaType, action: SendAction) {
        self.record(Dispatch::File {
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
        let (album_id, album_items) = match album {
            Some(album) => {
                for file in &list.files {
                    album.push(AlbumItem {
                        display_name: file.display_name.clone(),
                        size: file.size,
                    });
                }
                (Some(album.group_id), album.items())
            }
            None => (None, Vec::new()),
        };
        self.record(Dispatch::Files {
            action,
            media_type,
            files: list.files,
            caption,
            album_id,
            album_items,
        });
    }
}

/// `plan` never opens the picker; its inputs come from the command line.
struct NoFileDialog;

impl FileDialog for NoFileDialog {
    fn get_open_paths(&mut self, _caption: &str, filter: FileDialogFilter, _callback: OpenCallback) {
        tracing::warn!(?filter, "file dialog requested in a headless run");
    }
}

struct RecordingUi {
    report: Arc<Mutex<PlanReport>>,
    boxes: Arc<Mutex<Vec<SendFilesBox>>>,
}

impl UiShow for RecordingUi {
    fn show_toast(&mut self, text: &str) {
        lock(&self.report).notices.push(text.to_string());
    }

    fn show_file_size_limit_box(&mut self, file_size: u64) {
        lock(&self.report)
            .notices
            .push(format!("file of {file_size} bytes exceeds the upload limit"));
    }

    fn show_send_files_box(&mut self, files_box: SendFilesBox) {
        lock(&self.boxes).push(files_box);
    }

    fn hide_layer(&mut self) {}

    fn unfocus_reply(&mut self) {}

    fn focus_surface(&mut self) {}
}
