/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 15/10/26
******************************************************************************/

//! Downstream delivery of resequenced elements.

use tokio::sync::mpsc;
use tracing::warn;

/// Receives elements from a [`ResequencerEngine`](super::ResequencerEngine)
/// in sequence order.
///
/// `send` is called while the engine holds its internal lock, possibly from
/// the scheduler's runtime when an eviction fires. It must not block and
/// must not call back into the engine.
pub trait SequenceSender<E>: Send + Sync {
    /// Hands the next element downstream.
    fn send(&self, element: E);
}

impl<E: Send> SequenceSender<E> for mpsc::UnboundedSender<E> {
    fn send(&self, element: E) {
        if mpsc::UnboundedSender::send(self, element).is_err() {
            warn!("resequencer receiver closed, dropping delivered element");
        }
    }
}
