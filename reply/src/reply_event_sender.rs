use tokio::sync::mpsc::UnboundedSender;

use crate::reply_event::ReplyEvent;

/// Cloneable handle collaborators use to post [`ReplyEvent`]s back to the owning
/// [`ReplyArea`](crate::ReplyArea).
#[derive(Clone, Debug)]
pub struct ReplyEventSender {
    reply_event_tx: UnboundedSender<ReplyEvent>,
}

impl ReplyEventSender {
    pub fn new(reply_event_tx: UnboundedSender<ReplyEvent>) -> Self {
        Self { reply_event_tx }
    }

    /// Send an event to the reply area. Errors are logged: a closed channel means the reply area
    /// is gone and the event no longer applies.
    pub fn send(&self, event: ReplyEvent) {
        if let Err(e) = self.reply_event_tx.send(event) {
            tracing::error!("failed to send reply event: {e}");
        }
    }
}
