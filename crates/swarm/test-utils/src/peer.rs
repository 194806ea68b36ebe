//! A peer that records outbound messages.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;
use vertex_swarm_api::{
    ChunkAddress, OverlayAddress, PeerAddress, PeerError, PeerHandle, PeersOffer,
    RetrieveRequest, StoreRequest, SwarmPeer,
};

/// A message a [`RecordingPeer`] received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedMessage {
    /// `announce` was called.
    Announce(ChunkAddress),
    /// `retrieve` was called.
    Retrieve(RetrieveRequest),
    /// `deliver` was called.
    Deliver(StoreRequest),
    /// `offer_peers` was called.
    Offer(PeersOffer),
}

/// Peer that records every message and optionally fails them all.
///
/// Failed messages are recorded too.
#[derive(Debug)]
pub struct RecordingPeer {
    overlay: OverlayAddress,
    messages: Mutex<Vec<RecordedMessage>>,
    failure: Mutex<Option<PeerError>>,
    notify: Notify,
}

impl RecordingPeer {
    /// Create a peer with the given identity.
    pub fn new(overlay: OverlayAddress) -> Arc<Self> {
        Arc::new(Self {
            overlay,
            messages: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            notify: Notify::new(),
        })
    }

    /// Create a peer whose sends all fail with `error`.
    pub fn failing(overlay: OverlayAddress, error: PeerError) -> Arc<Self> {
        let peer = Self::new(overlay);
        peer.set_failure(Some(error));
        peer
    }

    /// Make future sends fail with `error`, or succeed with `None`.
    pub fn set_failure(&self, error: Option<PeerError>) {
        *self.failure.lock() = error;
    }

    /// This peer as a shareable handle.
    pub fn handle(self: &Arc<Self>) -> PeerHandle {
        Arc::clone(self) as PeerHandle
    }

    /// Everything received so far, in order.
    pub fn messages(&self) -> Vec<RecordedMessage> {
        self.messages.lock().clone()
    }

    /// Received retrieve requests.
    pub fn retrieves(&self) -> Vec<RetrieveRequest> {
        self.filter(|m| match m {
            RecordedMessage::Retrieve(msg) => Some(msg.clone()),
            _ => None,
        })
    }

    /// Received deliveries.
    pub fn deliveries(&self) -> Vec<StoreRequest> {
        self.filter(|m| match m {
            RecordedMessage::Deliver(msg) => Some(msg.clone()),
            _ => None,
        })
    }

    /// Received peers offers.
    pub fn offers(&self) -> Vec<PeersOffer> {
        self.filter(|m| match m {
            RecordedMessage::Offer(msg) => Some(msg.clone()),
            _ => None,
        })
    }

    /// Received announcements.
    pub fn announces(&self) -> Vec<ChunkAddress> {
        self.filter(|m| match m {
            RecordedMessage::Announce(address) => Some(*address),
            _ => None,
        })
    }

    /// Wait until at least `count` messages have been received.
    pub async fn wait_for_messages(&self, count: usize) {
        loop {
            let notified = self.notify.notified();
            if self.messages.lock().len() >= count {
                return;
            }
            notified.await;
        }
    }

    fn filter<T>(&self, f: impl FnMut(&RecordedMessage) -> Option<T>) -> Vec<T> {
        self.messages.lock().iter().filter_map(f).collect()
    }

    fn record(&self, message: RecordedMessage) -> Result<(), PeerError> {
        self.messages.lock().push(message);
        self.notify.notify_waiters();
        match self.failure.lock().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SwarmPeer for RecordingPeer {
    fn address(&self) -> OverlayAddress {
        self.overlay
    }

    fn endpoint(&self) -> PeerAddress {
        PeerAddress::new(self.overlay, format!("/memory/{}", self.overlay))
    }

    async fn announce(&self, address: ChunkAddress) -> Result<(), PeerError> {
        self.record(RecordedMessage::Announce(address))
    }

    async fn retrieve(&self, request: RetrieveRequest) -> Result<(), PeerError> {
        self.record(RecordedMessage::Retrieve(request))
    }

    async fn deliver(&self, request: StoreRequest) -> Result<(), PeerError> {
        self.record(RecordedMessage::Deliver(request))
    }

    async fn offer_peers(&self, offer: PeersOffer) -> Result<(), PeerError> {
        self.record(RecordedMessage::Offer(offer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay;

    #[tokio::test]
    async fn test_records_and_fails() {
        let peer = RecordingPeer::failing(overlay(1), PeerError::Disconnected);
        let handle = peer.handle();

        let address = ChunkAddress::new([9; 32]);
        assert_eq!(handle.announce(address).await, Err(PeerError::Disconnected));

        peer.set_failure(None);
        assert_eq!(handle.announce(address).await, Ok(()));

        peer.wait_for_messages(2).await;
        assert_eq!(peer.announces(), vec![address, address]);
    }
}
