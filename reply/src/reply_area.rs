//! The story reply orchestrator.
//!
//! [`ReplyArea`] owns the current [`ReplyTarget`] and sequences every reply: text and voice
//! sends go straight to the session, files go through preparation, the restriction check, the
//! confirmation surface and finally the group divider.
//!
//! The only asynchronous edge is the attach flow. An attach request arms a short delay (so the
//! button ripple can finish) and the host fires it from its tick with
//! [`ReplyArea::fire_pending_attach_if_due`]. The dialog callback is wrapped in a guard scoped to
//! the shown recipient; showing someone else kills the guard, so a late result is dropped instead
//! of being sent to the wrong chat.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Instant;

use story_reply_protocol::FullStoryId;
use story_reply_protocol::MessageToSend;
use story_reply_protocol::PreparedList;
use story_reply_protocol::ReplyTarget;
use story_reply_protocol::SendAction;
use story_reply_protocol::SendFilesWay;
use story_reply_protocol::SendMediaType;
use story_reply_protocol::SendOptions;
use story_reply_protocol::SendingAlbum;
use story_reply_protocol::TextWithTags;
use story_reply_protocol::VoiceToSend;
use thiserror::Error;
use tokio::sync::watch;

use crate::EventOutcome;
use crate::FilesConfirmed;
use crate::GuardScope;
use crate::MimeData;
use crate::ReplyAreaConfig;
use crate::ReplyEvent;
use crate::ReplyEventSender;
use crate::UnsupportedSend;
use crate::collaborators::Composer;
use crate::collaborators::FileDialog;
use crate::collaborators::FileDialogFilter;
use crate::collaborators::OpenResult;
use crate::collaborators::SendFilesBox;
use crate::collaborators::SessionApi;
use crate::collaborators::UiShow;
use crate::group_divider::divide_by_groups;
use crate::media_prepare::DecodedImage;
use crate::media_prepare::prepare_media_from_image;
use crate::media_prepare::prepare_media_from_urls;
use crate::media_prepare::prepare_media_list;
use crate::media_prepare::read_image;
use crate::read_mime_urls;
use crate::restrictions::SendingFilesError;
use crate::restrictions::any_file_restriction_error;
use crate::restrictions::sending_files_error;
use crate::restrictions::sending_text_error;
use crate::restrictions::voice_restriction_error;

const CHOOSE_FILES_CAPTION: &str = "Choose files";

/// Collaborators and settings a [`ReplyArea`] is built from.
pub struct ReplyAreaDescriptor {
    pub composer: Box<dyn Composer>,
    pub session: Arc<dyn SessionApi>,
    pub file_dialog: Box<dyn FileDialog>,
    pub ui: Box<dyn UiShow>,
    /// Sender side of the channel the host feeds back into [`ReplyArea::handle_event`].
    pub events: ReplyEventSender,
    pub config: ReplyAreaConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyAreaState {
    /// No recipient shown.
    Idle,
    Ready,
    /// An attach is armed or its dialog is open.
    ChoosingAttachment,
}

#[derive(Debug, Error)]
pub(crate) enum ReplyAreaError {
    #[error("no recipient is shown")]
    NoRecipient,
    #[error("{count} files are still being processed")]
    FilesStillProcessing { count: usize },
}

/// Holds the "choosing attachment" flag while alive.
///
/// It travels from the armed attach into the dialog callback, so whichever way the flow ends
/// (result delivered, callback dropped, attach cancelled) the flag is released exactly once.
#[derive(Debug)]
struct ChoosingTicket {
    flag: Arc<AtomicBool>,
}

impl ChoosingTicket {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for ChoosingTicket {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[derive(Debug)]
struct PendingAttach {
    deadline: Instant,
    override_send_images_as_photos: Option<bool>,
    ticket: ChoosingTicket,
}

pub struct ReplyArea {
    composer: Box<dyn Composer>,
    session: Arc<dyn SessionApi>,
    file_dialog: Box<dyn FileDialog>,
    ui: Box<dyn UiShow>,
    events: ReplyEventSender,
    config: ReplyAreaConfig,

    data: ReplyTarget,
    shown_user_guard: GuardScope,
    choosing_attach: Arc<AtomicBool>,
    pending_attach: Option<PendingAttach>,
}

impl ReplyArea {
    pub fn new(descriptor: ReplyAreaDescriptor) -> Self {
        let ReplyAreaDescriptor {
            composer,
            session,
            file_dialog,
            ui,
            events,
            config,
        } = descriptor;
        Self {
            composer,
            session,
            file_dialog,
            ui,
            events,
            config,
            data: ReplyTarget::default(),
            shown_user_guard: GuardScope::new(),
            choosing_attach: Arc::new(AtomicBool::new(false)),
            pending_attach: None,
        }
    }

    pub fn state(&self) -> ReplyAreaState {
        if self.data.recipient.is_none() {
            ReplyAreaState::Idle
        } else if self.choosing_attach.load(Ordering::Acquire) {
            ReplyAreaState::ChoosingAttachment
        } else {
            ReplyAreaState::Ready
        }
    }

    pub fn target(&self) -> &ReplyTarget {
        &self.data
    }

    /// Retarget the reply.
    ///
    /// The same (recipient, story) pair only refreshes the recipient snapshot. A new story of
    /// the same recipient clears the composer. A different recipient additionally kills every
    /// outstanding guard, cancels an armed attach and switches the composer's history.
    pub fn show(&mut self, data: ReplyTarget) {
        if self.data == data {
            self.data.recipient = data.recipient;
            return;
        }
        let user_changed = self.data.recipient_id() != data.recipient_id();
        self.data = data;
        if !user_changed {
            if self.data.recipient.is_some() {
                self.composer.clear();
            }
            return;
        }

        tracing::debug!(
            recipient = ?self.data.recipient_id(),
            story = %self.data.story_id,
            "reply target changed"
        );
        self.shown_user_guard.invalidate();
        self.pending_attach = None;
        self.composer.set_history(self.data.recipient_id());
        self.composer.clear();
    }

    pub fn focused_value(&self) -> watch::Receiver<bool> {
        self.composer.focused_value()
    }

    /// Route one event from the composer or an asynchronous collaborator.
    pub fn handle_event(&mut self, event: ReplyEvent) -> EventOutcome {
        match event {
            ReplyEvent::CancelRequested => {
                self.ui.unfocus_reply();
                EventOutcome::Handled
            }
            ReplyEvent::SendRequested(options) => handled_if(self.send(options)),
            ReplyEvent::SendVoiceRequested(voice) => handled_if(self.send_voice(voice)),
            ReplyEvent::AttachRequested {
                override_send_images_as_photos,
            } => handled_if(self.request_attach(override_send_images_as_photos, Instant::now())),
            ReplyEvent::AttachDialogFinished {
                guard,
                override_send_images_as_photos,
                result,
            } => {
                if !guard.is_alive() {
                    tracing::debug!("dropping attach result for a recipient no longer shown");
                    return EventOutcome::Dropped;
                }
                handled_if(self.attach_chosen(result, override_send_images_as_photos))
            }
            ReplyEvent::SendingFilesConfirmed(FilesConfirmed {
                guard,
                list,
                way,
                caption,
                options,
                ctrl_shift_enter,
            }) => {
                if !guard.is_alive() {
                    tracing::debug!("dropping files confirmation for a recipient no longer shown");
                    return EventOutcome::Dropped;
                }
                handled_if(self.sending_files_confirmed(
                    list,
                    way,
                    caption,
                    options,
                    ctrl_shift_enter,
                ))
            }
            ReplyEvent::SendingFilesCancelled {
                guard,
                insert_text_on_cancel,
            } => {
                if !guard.is_alive() {
                    return EventOutcome::Dropped;
                }
                if !insert_text_on_cancel.is_empty() {
                    self.composer.restore_text(&insert_text_on_cancel);
                }
                EventOutcome::Handled
            }
            ReplyEvent::PasteMimeData {
                data,
                override_send_images_as_photos,
            } => {
                let insert_text_on_cancel = data.text.clone().unwrap_or_default();
                handled_if(self.confirm_sending_mime(
                    &data,
                    override_send_images_as_photos,
                    insert_text_on_cancel,
                ))
            }
            ReplyEvent::FileChosen(chosen) => {
                self.ui.hide_layer();
                tracing::debug!(document = chosen.document_id, "existing document sends are not supported");
                EventOutcome::Unsupported(UnsupportedSend::ExistingDocument)
            }
            ReplyEvent::PhotoChosen(chosen) => {
                tracing::debug!(photo = chosen.photo_id, "existing photo sends are not supported");
                EventOutcome::Unsupported(UnsupportedSend::ExistingPhoto)
            }
            ReplyEvent::InlineResultChosen(chosen) => {
                tracing::debug!(
                    bot = %chosen.bot,
                    result = %chosen.result_id,
                    "inline result sends are not supported"
                );
                EventOutcome::Unsupported(UnsupportedSend::InlineResult)
            }
        }
    }

    /// Send the composer text. Eligibility problems are shown but do not stop the send.
    ///
    /// Returns `false` without dispatching when the composer is empty.
    pub fn send(&mut self, options: SendOptions) -> bool {
        let ignore_slowmode_countdown = options.is_scheduled();
        let action = match self.prepare_send_action(options) {
            Ok(action) => action,
            Err(err) => {
                tracing::warn!("send ignored: {err}");
                return false;
            }
        };

        let text = self.composer.text_with_applied_markdown();
        if text.is_empty() {
            tracing::trace!("nothing to send");
            return false;
        }
        let mut message = MessageToSend::new(action);
        message.text = text;
        message.web_page_id = self.composer.web_page_id();

        if let Some(recipient) = self.data.recipient.as_ref()
            && let Some(error) = sending_text_error(
                recipient,
                &message.text,
                self.session.is_premium(),
                ignore_slowmode_countdown,
            )
        {
            self.ui.show_toast(&error.to_string());
        }

        tracing::info!(history = %message.action.history, "sending reply text");
        self.session.send_message(message);
        self.composer.clear();
        self.finish_sending();
        true
    }

    pub fn send_voice(&mut self, voice: VoiceToSend) -> bool {
        let VoiceToSend {
            bytes,
            waveform,
            duration_ms,
            options,
        } = voice;
        let action = match self.prepare_send_action(options) {
            Ok(action) => action,
            Err(err) => {
                tracing::warn!("voice send ignored: {err}");
                return false;
            }
        };
        if let Some(recipient) = self.data.recipient.as_ref()
            && let Some(error) = voice_restriction_error(recipient)
        {
            self.ui.show_toast(&error.to_string());
            return false;
        }
        self.session
            .send_voice_message(bytes, waveform, duration_ms, action);
        self.composer.clear_listen_state();
        self.finish_sending();
        true
    }

    /// Upload content that needs no confirmation.
    pub fn upload_file(&mut self, content: Vec<u8>, media_type: SendMediaType) -> bool {
        match self.prepare_send_action(SendOptions::default()) {
            Ok(action) => {
                self.session.send_file(content, media_type, action);
                true
            }
            Err(err) => {
                tracing::warn!("upload ignored: {err}");
                false
            }
        }
    }

    /// Arm the attach dialog to open once `now` plus the ripple delay has passed.
    ///
    /// Returns `false` when an attach is already armed or its dialog is still open.
    pub fn request_attach(
        &mut self,
        override_send_images_as_photos: Option<bool>,
        now: Instant,
    ) -> bool {
        let Some(ticket) = ChoosingTicket::acquire(&self.choosing_attach) else {
            tracing::trace!("attach already in progress");
            return false;
        };
        self.pending_attach = Some(PendingAttach {
            deadline: now + self.config.attach_ripple_delay,
            override_send_images_as_photos,
            ticket,
        });
        true
    }

    /// When the armed attach should fire, so the host can schedule its next tick.
    pub fn pending_attach_deadline(&self) -> Option<Instant> {
        self.pending_attach.as_ref().map(|pending| pending.deadline)
    }

    /// Open the armed attach dialog if its deadline has passed. Call this from the host's tick.
    ///
    /// Returns `true` only if the dialog was actually opened. A due attach that was refused
    /// (recipient gone or taking no media) is consumed and reports `false`.
    pub fn fire_pending_attach_if_due(&mut self, now: Instant) -> bool {
        let Some(pending) = self
            .pending_attach
            .take_if(|pending| now >= pending.deadline)
        else {
            return false;
        };
        self.open_attach_dialog(pending.override_send_images_as_photos, pending.ticket)
    }

    /// Open the attach dialog right away, unless one is already in flight.
    pub fn choose_attach(&mut self, override_send_images_as_photos: Option<bool>) -> bool {
        let Some(ticket) = ChoosingTicket::acquire(&self.choosing_attach) else {
            return false;
        };
        self.open_attach_dialog(override_send_images_as_photos, ticket)
    }

    fn open_attach_dialog(
        &mut self,
        override_send_images_as_photos: Option<bool>,
        ticket: ChoosingTicket,
    ) -> bool {
        let Some(recipient) = self.data.recipient.as_ref() else {
            return false;
        };
        if let Some(error) = any_file_restriction_error(recipient) {
            self.ui.show_toast(&error.to_string());
            return false;
        }

        let filter = if override_send_images_as_photos == Some(true) {
            FileDialogFilter::ImagesOrAll
        } else {
            FileDialogFilter::AllOrImages
        };
        let guard = self.shown_user_guard.guard();
        let event_guard = guard.clone();
        let events = self.events.clone();
        let callback = guard.wrap(move |result: OpenResult| {
            drop(ticket);
            events.send(ReplyEvent::AttachDialogFinished {
                guard: event_guard,
                override_send_images_as_photos,
                result,
            });
        });
        self.file_dialog
            .get_open_paths(CHOOSE_FILES_CAPTION, filter, Box::new(callback));
        true
    }

    fn attach_chosen(
        &mut self,
        result: OpenResult,
        override_send_images_as_photos: Option<bool>,
    ) -> bool {
        if result.is_empty() {
            return false;
        }
        let OpenResult {
            paths,
            remote_content,
        } = result;

        if !remote_content.is_empty() {
            return match read_image(&remote_content) {
                Some(image) if !image.animated => self.confirm_sending_image(
                    &image,
                    remote_content,
                    override_send_images_as_photos,
                    String::new(),
                ),
                _ => self.upload_file(remote_content, SendMediaType::File),
            };
        }

        let premium = self.session.is_premium();
        let mut list = prepare_media_list(&paths, self.config.file_size_limit(premium));
        list.override_send_images_as_photos = override_send_images_as_photos;
        self.confirm_sending_files(list, String::new())
    }

    /// Offer pasted or dropped content for sending.
    ///
    /// URL entries win unless they are remote, or they failed while an image is also offered,
    /// in which case the image is used. Returns `false` when the content was not taken and the
    /// caller should insert it as text.
    pub fn confirm_sending_mime(
        &mut self,
        data: &MimeData,
        override_send_images_as_photos: Option<bool>,
        insert_text_on_cancel: String,
    ) -> bool {
        let has_image = data.has_image();
        let premium = self.session.is_premium();

        let urls = read_mime_urls(data);
        if !urls.is_empty() {
            let mut list = prepare_media_from_urls(&urls, self.config.file_size_limit(premium));
            if !list.error.is_non_local_url() && (!list.has_error() || !has_image) {
                list.override_send_images_as_photos = override_send_images_as_photos;
                self.confirm_sending_files(list, String::new());
                return true;
            }
        }

        let Some(content) = data.image.as_ref().filter(|_| has_image) else {
            return false;
        };
        match read_image(content) {
            Some(image) if !image.animated => {
                self.confirm_sending_image(
                    &image,
                    content.clone(),
                    override_send_images_as_photos,
                    insert_text_on_cancel,
                );
            }
            _ => {
                self.upload_file(content.clone(), SendMediaType::File);
            }
        }
        true
    }

    pub fn confirm_sending_image(
        &mut self,
        image: &DecodedImage,
        content: Vec<u8>,
        override_send_images_as_photos: Option<bool>,
        insert_text_on_cancel: String,
    ) -> bool {
        let mut list = prepare_media_from_image(image, content);
        list.override_send_images_as_photos = override_send_images_as_photos;
        self.confirm_sending_files(list, insert_text_on_cancel)
    }

    /// Validate `list` and open the confirmation surface for it.
    ///
    /// Returns `false` when the list was rejected; the error has already been shown.
    pub fn confirm_sending_files(
        &mut self,
        list: PreparedList,
        insert_text_on_cancel: String,
    ) -> bool {
        if self.composer.confirm_media_edit(&list) {
            return true;
        }
        if self.data.recipient.is_none() {
            tracing::warn!("files ignored: {}", ReplyAreaError::NoRecipient);
            return false;
        }
        if self.show_sending_files_error(&list, None) {
            return false;
        }

        let defaults = self.config.send_files_way;
        let way = SendFilesWay {
            send_images_as_photos: list
                .override_send_images_as_photos
                .unwrap_or(defaults.send_images_as_photos),
            ..defaults
        };
        let files_box = SendFilesBox::new(
            list,
            self.composer.text_with_applied_markdown(),
            way,
            insert_text_on_cancel,
            self.shown_user_guard.guard(),
            self.events.clone(),
        );
        self.ui.show_send_files_box(files_box);
        true
    }

    /// Dispatch a confirmed list, one send action per group.
    pub fn sending_files_confirmed(
        &mut self,
        list: PreparedList,
        way: SendFilesWay,
        mut caption: TextWithTags,
        options: SendOptions,
        ctrl_shift_enter: bool,
    ) -> bool {
        if !list.files_to_process.is_empty() {
            let err = ReplyAreaError::FilesStillProcessing {
                count: list.files_to_process.len(),
            };
            tracing::error!("refusing to send files: {err}");
            return false;
        }
        let Some(slowmode_applied) = self
            .data
            .recipient
            .as_ref()
            .map(|recipient| recipient.slowmode_applied)
        else {
            tracing::warn!("files ignored: {}", ReplyAreaError::NoRecipient);
            return false;
        };
        if self.show_sending_files_error(&list, Some(way.send_images_as_photos)) {
            return false;
        }
        let mut action = match self.prepare_send_action(options) {
            Ok(action) => action,
            Err(err) => {
                tracing::warn!("files ignored: {err}");
                return false;
            }
        };
        action.clear_draft = false;

        let groups = divide_by_groups(list, way, slowmode_applied);
        let media_type = if way.send_images_as_photos {
            SendMediaType::Photo
        } else {
            SendMediaType::File
        };
        tracing::info!(
            history = %action.history,
            groups = groups.len(),
            %media_type,
            ctrl_shift_enter,
            "sending confirmed files"
        );

        let caption_rides_along = matches!(groups.as_slice(), [only] if only.sent_with_caption);
        if !caption_rides_along && !caption.is_empty() {
            let mut message = MessageToSend::new(action.clone());
            message.text = caption.take();
            self.session.send_message(message);
        }
        for group in groups {
            let album = group
                .album_type
                .is_album()
                .then(|| Arc::new(SendingAlbum::new(rand::random(), action.options.clone())));
            self.session.send_files(
                group.list,
                media_type,
                caption.take(),
                album,
                action.clone(),
            );
        }
        self.finish_sending();
        true
    }

    fn finish_sending(&mut self) {
        self.composer.hide_panels_animated();
        self.ui.focus_surface();
    }

    /// Show why `list` cannot be sent. Returns `true` if something was shown.
    fn show_sending_files_error(&mut self, list: &PreparedList, compress: Option<bool>) -> bool {
        match sending_files_error(self.data.recipient.as_ref(), list, compress) {
            None => false,
            Some(SendingFilesError::TooLarge { size }) => {
                self.ui.show_file_size_limit_box(size);
                true
            }
            Some(error) => {
                self.ui.show_toast(&error.to_string());
                true
            }
        }
    }

    fn prepare_send_action(&self, options: SendOptions) -> Result<SendAction, ReplyAreaError> {
        let recipient = self
            .data
            .recipient
            .as_ref()
            .ok_or(ReplyAreaError::NoRecipient)?;
        let mut action = SendAction::new(recipient.id, options);
        action.options.send_as = self.composer.send_as_peer();
        action.reply_to.story_id = Some(FullStoryId {
            peer: recipient.id,
            story: self.data.story_id,
        });
        Ok(action)
    }
}

fn handled_if(handled: bool) -> EventOutcome {
    if handled {
        EventOutcome::Handled
    } else {
        EventOutcome::Ignored
    }
}
