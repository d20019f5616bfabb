//! Story reply composer core.
//!
//! [`ReplyArea`] turns composer events (send, voice, attach, paste) into dispatches on a session
//! layer. Files go through three stages before anything is sent:
//!
//! - [`media_prepare`] normalizes paths, clipboard data and dialog results into a
//!   [`PreparedList`](story_reply_protocol::PreparedList).
//! - [`restrictions`] decides whether the current recipient accepts that list.
//! - [`group_divider`] splits a confirmed list into the send groups that are dispatched one by one.
//!
//! Rendering, text editing, the file picker and the network layer are collaborators behind the
//! traits in [`collaborators`].

// Forbid accidental stdout/stderr writes in the library.
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod collaborators;
mod config;
pub mod group_divider;
mod guard;
pub mod media_prepare;
mod mime_data;
mod reply_area;
mod reply_event;
mod reply_event_sender;
pub mod restrictions;

#[cfg(test)]
mod test_support;

pub use config::ReplyAreaConfig;
pub use guard::Guard;
pub use guard::GuardScope;
pub use mime_data::DroppedUrl;
pub use mime_data::MimeData;
pub use mime_data::normalize_dropped_path;
pub use mime_data::read_mime_urls;
pub use reply_area::ReplyArea;
pub use reply_area::ReplyAreaDescriptor;
pub use reply_area::ReplyAreaState;
pub use reply_event::ChosenDocument;
pub use reply_event::ChosenInlineResult;
pub use reply_event::ChosenPhoto;
pub use reply_event::EventOutcome;
pub use reply_event::FilesConfirmed;
pub use reply_event::ReplyEvent;
pub use reply_event::UnsupportedSend;
pub use reply_event_sender::ReplyEventSender;
