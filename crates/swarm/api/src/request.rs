//! Per-chunk request bookkeeping.
//!
//! A [`RequestRecord`] tracks the network search for one chunk: whether it is
//! still searching, which peers asked this node for the chunk under which
//! request id, and a completion signal that fires once when content arrives.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::{sync::watch, time::Instant};
use vertex_swarm_primitives::{OverlayAddress, RequestId};

use crate::PeerHandle;

/// Search status of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum RequestStatus {
    /// Content is missing and a search may be in flight.
    Searching,
    /// Content has arrived. Terminal.
    Found,
}

/// A peer that asked this node for a chunk.
#[derive(Debug, Clone)]
pub struct Requester {
    /// The asking peer.
    pub peer: PeerHandle,
    /// Until when the peer is still interested in a delivery.
    pub deadline: Instant,
}

#[derive(Debug)]
struct RequestState {
    status: RequestStatus,
    requesters: HashMap<RequestId, Vec<Requester>>,
    search_deadline: Option<Instant>,
}

/// Request record shared by every clone of a chunk.
///
/// Status only ever moves from [`RequestStatus::Searching`] to
/// [`RequestStatus::Found`]; the transition fires the completion signal
/// exactly once.
#[derive(Debug)]
pub struct RequestRecord {
    state: Mutex<RequestState>,
    completion: watch::Sender<bool>,
}

impl Default for RequestRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestRecord {
    /// Create a record for a chunk whose content is missing.
    pub fn new() -> Self {
        Self::with_status(RequestStatus::Searching)
    }

    /// Create a record for a chunk whose content is already present.
    pub fn found() -> Self {
        Self::with_status(RequestStatus::Found)
    }

    fn with_status(status: RequestStatus) -> Self {
        let (completion, _) = watch::channel(status == RequestStatus::Found);
        Self {
            state: Mutex::new(RequestState {
                status,
                requesters: HashMap::new(),
                search_deadline: None,
            }),
            completion,
        }
    }

    /// Current status.
    pub fn status(&self) -> RequestStatus {
        self.state.lock().status
    }

    /// Whether content has arrived.
    pub fn is_found(&self) -> bool {
        self.status() == RequestStatus::Found
    }

    /// Note that a search running until `deadline` was started.
    ///
    /// Returns `false` without changes if the record is already found.
    pub fn mark_searching(&self, deadline: Instant) -> bool {
        let mut state = self.state.lock();
        if state.status == RequestStatus::Found {
            return false;
        }
        state.search_deadline = Some(match state.search_deadline {
            Some(current) if current > deadline => current,
            _ => deadline,
        });
        true
    }

    /// Whether a search started by this node is still running at `now`.
    pub fn search_in_flight(&self, now: Instant) -> bool {
        let state = self.state.lock();
        state.status == RequestStatus::Searching
            && state.search_deadline.is_some_and(|deadline| deadline > now)
    }

    /// Flip to found and fire the completion signal.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn mark_found(&self) -> bool {
        {
            let mut state = self.state.lock();
            if state.status == RequestStatus::Found {
                return false;
            }
            state.status = RequestStatus::Found;
        }
        self.completion.send_replace(true);
        true
    }

    /// Record that `peer` asked for the chunk under `id`.
    ///
    /// A peer asking again under the same id keeps its place in the arrival
    /// order and has its deadline refreshed.
    pub fn add_requester(&self, id: RequestId, peer: PeerHandle, deadline: Instant) {
        let mut state = self.state.lock();
        let requesters = state.requesters.entry(id).or_default();
        let address = peer.address();
        match requesters.iter_mut().find(|r| r.peer.address() == address) {
            Some(existing) => existing.deadline = deadline,
            None => requesters.push(Requester { peer, deadline }),
        }
    }

    /// Whether `peer` asked for the chunk under `id`.
    pub fn is_requester(&self, id: RequestId, peer: &OverlayAddress) -> bool {
        self.state
            .lock()
            .requesters
            .get(&id)
            .is_some_and(|requesters| requesters.iter().any(|r| r.peer.address() == *peer))
    }

    /// All requesters recorded under `id`, in arrival order.
    pub fn requesters(&self, id: RequestId) -> Vec<Requester> {
        self.state
            .lock()
            .requesters
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of distinct request ids recorded.
    pub fn request_ids(&self) -> usize {
        self.state.lock().requesters.len()
    }

    /// Select who should receive the content once it arrives.
    ///
    /// For every request id, at most `limit` requesters whose deadline is
    /// after `now`, in arrival order, skipping `exclude`.
    pub fn propagation_targets(
        &self,
        now: Instant,
        limit: usize,
        exclude: Option<&OverlayAddress>,
    ) -> Vec<(RequestId, Vec<Requester>)> {
        let state = self.state.lock();
        state
            .requesters
            .iter()
            .map(|(id, requesters)| {
                let selected = requesters
                    .iter()
                    .filter(|r| r.deadline > now)
                    .filter(|r| exclude.is_none_or(|source| r.peer.address() != *source))
                    .take(limit)
                    .cloned()
                    .collect::<Vec<_>>();
                (*id, selected)
            })
            .filter(|(_, selected)| !selected.is_empty())
            .collect()
    }

    /// Subscribe to the completion signal.
    pub fn subscribe(&self) -> Completion {
        Completion(self.completion.subscribe())
    }
}

/// Handle for waiting on a [`RequestRecord`]'s completion.
///
/// Any number of handles can wait; none of them consumes the signal.
#[derive(Debug, Clone)]
pub struct Completion(watch::Receiver<bool>);

impl Completion {
    /// Whether completion already fired.
    pub fn is_complete(&self) -> bool {
        *self.0.borrow()
    }

    /// Wait until completion fires.
    ///
    /// Returns immediately if it already has. Returns `false` if the record
    /// was dropped without completing.
    pub async fn wait(mut self) -> bool {
        self.0.wait_for(|found| *found).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use async_trait::async_trait;

    use super::*;
    use crate::{PeerAddress, PeerError, PeersOffer, RetrieveRequest, StoreRequest, SwarmPeer};
    use vertex_swarm_primitives::ChunkAddress;

    #[derive(Debug)]
    struct NullPeer(OverlayAddress);

    #[async_trait]
    impl SwarmPeer for NullPeer {
        fn address(&self) -> OverlayAddress {
            self.0
        }

        fn endpoint(&self) -> PeerAddress {
            PeerAddress::new(self.0, "/memory/0")
        }

        async fn announce(&self, _address: ChunkAddress) -> Result<(), PeerError> {
            Ok(())
        }

        async fn retrieve(&self, _request: RetrieveRequest) -> Result<(), PeerError> {
            Ok(())
        }

        async fn deliver(&self, _request: StoreRequest) -> Result<(), PeerError> {
            Ok(())
        }

        async fn offer_peers(&self, _offer: PeersOffer) -> Result<(), PeerError> {
            Ok(())
        }
    }

    fn peer(n: u8) -> PeerHandle {
        Arc::new(NullPeer(OverlayAddress::new([n; 32])))
    }

    #[test]
    fn test_status_is_monotonic() {
        let record = RequestRecord::new();
        assert_eq!(record.status(), RequestStatus::Searching);

        assert!(record.mark_found());
        assert!(!record.mark_found());
        assert!(!record.mark_searching(Instant::now() + Duration::from_secs(3)));
        assert_eq!(record.status(), RequestStatus::Found);
    }

    #[tokio::test]
    async fn test_completion_reaches_every_waiter() {
        let record = Arc::new(RequestRecord::new());
        let waiters = (0..5)
            .map(|_| tokio::spawn(record.subscribe().wait()))
            .collect::<Vec<_>>();

        assert!(record.mark_found());
        for waiter in waiters {
            assert!(waiter.await.unwrap());
        }

        // Late subscribers see the fired signal without blocking.
        let late = record.subscribe();
        assert!(late.is_complete());
        assert!(late.wait().await);
    }

    #[test]
    fn test_found_record_is_already_complete() {
        let record = RequestRecord::found();
        assert!(record.is_found());
        assert!(record.subscribe().is_complete());
    }

    #[test]
    fn test_requesters_dedup_by_peer() {
        let record = RequestRecord::new();
        let id = RequestId::new(7);
        let now = Instant::now();

        record.add_requester(id, peer(1), now + Duration::from_secs(1));
        record.add_requester(id, peer(2), now + Duration::from_secs(1));
        record.add_requester(id, peer(1), now + Duration::from_secs(5));

        let requesters = record.requesters(id);
        assert_eq!(requesters.len(), 2);
        assert_eq!(requesters[0].peer.address(), OverlayAddress::new([1; 32]));
        assert_eq!(requesters[0].deadline, now + Duration::from_secs(5));
        assert!(record.is_requester(id, &OverlayAddress::new([2; 32])));
        assert!(!record.is_requester(RequestId::new(8), &OverlayAddress::new([2; 32])));
        assert_eq!(record.request_ids(), 1);

        record.add_requester(RequestId::new(8), peer(2), now + Duration::from_secs(1));
        assert_eq!(record.request_ids(), 2);
    }

    #[test]
    fn test_propagation_targets_cap_and_expiry() {
        let record = RequestRecord::new();
        let id = RequestId::new(1);
        let now = Instant::now();

        record.add_requester(id, peer(1), now - Duration::from_millis(1));
        for n in 2..=6 {
            record.add_requester(id, peer(n), now + Duration::from_secs(10));
        }

        let targets = record.propagation_targets(now, 3, Some(&OverlayAddress::new([2; 32])));
        assert_eq!(targets.len(), 1);
        let (target_id, selected) = &targets[0];
        assert_eq!(*target_id, id);
        let selected = selected.iter().map(|r| r.peer.address()).collect::<Vec<_>>();
        assert_eq!(
            selected,
            vec![
                OverlayAddress::new([3; 32]),
                OverlayAddress::new([4; 32]),
                OverlayAddress::new([5; 32]),
            ]
        );
    }

    #[test]
    fn test_search_in_flight() {
        let record = RequestRecord::new();
        let now = Instant::now();
        assert!(!record.search_in_flight(now));

        record.mark_searching(now + Duration::from_secs(3));
        assert!(record.search_in_flight(now));
        assert!(!record.search_in_flight(now + Duration::from_secs(3)));

        // An earlier deadline does not shorten a running search.
        record.mark_searching(now + Duration::from_secs(1));
        assert!(record.search_in_flight(now + Duration::from_secs(2)));
    }
}
