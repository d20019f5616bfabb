//! Data model shared between the reply orchestrator, its collaborators and the CLI.
//!
//! Nothing in this crate performs I/O. Types are plain values (mostly serde-serializable) so the
//! host can log them, persist them or hand them to a session layer verbatim.

mod album;
mod ids;
mod prepared;
mod recipient;
mod send;
mod send_files_way;
mod text;

pub use album::AlbumItem;
pub use album::AlbumType;
pub use album::MAX_ALBUM_ITEMS;
pub use album::SendGroup;
pub use album::SendingAlbum;
pub use ids::FullStoryId;
pub use ids::PeerId;
pub use ids::StoryId;
pub use prepared::PreparedFile;
pub use prepared::PreparedFileType;
pub use prepared::PreparedList;
pub use prepared::PreparedListError;
pub use recipient::Recipient;
pub use recipient::RecipientRights;
pub use recipient::ReplyTarget;
pub use send::FullReplyTo;
pub use send::MessageToSend;
pub use send::SendAction;
pub use send::SendMediaType;
pub use send::SendOptions;
pub use send::VoiceToSend;
pub use send_files_way::SendFilesWay;
pub use text::ByteRange;
pub use text::TextTag;
pub use text::TextWithTags;
