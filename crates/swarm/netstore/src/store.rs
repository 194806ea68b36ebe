//! The distributed chunk store.

use std::sync::Arc;

use tokio::{sync::broadcast, time::Instant};
use tracing::{debug, trace};
use vertex_swarm_api::{
    Chunk, ChunkAddress, OverlayAddress, PeerAddress, PeerHandle, PeersOffer, RequestId,
    RequestRecord, RequestStatus, Requester, RetrieveRequest, StoreRequest, SwarmError,
    SwarmLocalStore, SwarmResult, SwarmTopology,
};
use vertex_tasks::TaskExecutor;

use crate::{
    NetStoreConfig, NetStoreEvent, SendKind, locks::StripedLocks, metrics::NetStoreMetrics,
};

/// Capacity of the diagnostic event channel.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// An outbound message waiting to be sent.
#[derive(Debug)]
enum Outbound {
    Announce(ChunkAddress),
    Retrieve(RetrieveRequest),
    Deliver(StoreRequest),
    Offer(PeersOffer),
}

impl Outbound {
    fn kind(&self) -> SendKind {
        match self {
            Self::Announce(_) => SendKind::Announce,
            Self::Retrieve(_) => SendKind::Retrieve,
            Self::Deliver(_) => SendKind::Deliver,
            Self::Offer(_) => SendKind::OfferPeers,
        }
    }

    fn address(&self) -> ChunkAddress {
        match self {
            Self::Announce(address) => *address,
            Self::Retrieve(msg) => msg.address,
            Self::Deliver(msg) => msg.address,
            Self::Offer(msg) => msg.address,
        }
    }
}

/// What a write did to the stored entry.
enum Merged {
    /// Content was already present; nothing changed.
    Duplicate,
    /// Content is stored and nobody was searching for it.
    Stored(Chunk),
    /// Content filled a chunk that was being searched for. Carries the
    /// requesters recorded at the moment of the transition.
    Found(Chunk, Vec<(RequestId, Vec<Requester>)>),
}

/// Distributed chunk store.
///
/// Generic over the local cache `C` and peer discovery `T`. See the crate
/// docs for the per-chunk state machine.
pub struct NetStore<C, T> {
    cache: C,
    topology: T,
    executor: TaskExecutor,
    config: NetStoreConfig,
    locks: StripedLocks,
    events: broadcast::Sender<NetStoreEvent>,
    metrics: NetStoreMetrics,
}

impl<C, T> std::fmt::Debug for NetStore<C, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<C: SwarmLocalStore, T: SwarmTopology> NetStore<C, T> {
    /// Create a store over `cache`, finding peers through `topology` and
    /// sending through `executor`.
    pub fn new(cache: C, topology: T, executor: TaskExecutor, config: NetStoreConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            locks: StripedLocks::new(config.lock_stripes),
            cache,
            topology,
            executor,
            config,
            events,
            metrics: NetStoreMetrics::default(),
        }
    }

    /// The local cache.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// The peer discovery.
    pub fn topology(&self) -> &T {
        &self.topology
    }

    /// The settings in use.
    pub fn config(&self) -> &NetStoreConfig {
        &self.config
    }

    /// Subscribe to diagnostic events.
    pub fn subscribe(&self) -> broadcast::Receiver<NetStoreEvent> {
        self.events.subscribe()
    }

    /// Search status of a chunk, if a search was ever started for it and the
    /// cache still holds its entry.
    pub fn request_status(&self, address: &ChunkAddress) -> SwarmResult<Option<RequestStatus>> {
        Ok(self
            .cache
            .get(address)?
            .and_then(|chunk| chunk.request().map(|record| record.status())))
    }

    /// Store a chunk produced locally.
    ///
    /// Content already present is kept: the first write wins. If the chunk
    /// was being searched for, waiters are woken and the content is sent on
    /// to the peers that asked for it; otherwise it is announced to the
    /// closest peers.
    pub fn put(&self, chunk: Chunk) -> SwarmResult<()> {
        self.store(chunk)
    }

    /// Accept content delivered by `from`.
    ///
    /// Fails with [`SwarmError::MalformedContent`] if the data cannot carry a
    /// span prefix.
    pub fn add_store_request(&self, from: PeerHandle, msg: StoreRequest) -> SwarmResult<()> {
        self.metrics.store_requests_total.increment(1);
        let peer = from.address();
        debug!(address = %msg.address, id = %msg.id, %peer, "store request");

        let chunk = Chunk::new(msg.address, msg.data)?.with_source(peer);
        self.store(chunk)
    }

    /// Fetch a chunk, from the cache or the network.
    ///
    /// Waits at most the search timeout for the network. A search already in
    /// flight for the chunk is joined rather than duplicated, and a timed-out
    /// call leaves the search running.
    pub async fn get(&self, address: &ChunkAddress) -> SwarmResult<Chunk> {
        self.metrics.gets_total.increment(1);

        let completion = {
            let _guard = self.locks.lock(address);
            let mut entry = self.fetch_or_placeholder(address)?;
            if entry.has_data() {
                trace!(%address, "local hit");
                self.metrics.local_hits_total.increment(1);
                return Ok(entry);
            }

            let record = self.ensure_record(&mut entry)?;
            let now = Instant::now();
            if record.search_in_flight(now) {
                trace!(%address, "joining search in flight");
            } else {
                let deadline = now + self.config.search_timeout;
                self.start_search(address, &record, RequestId::random(), deadline);
            }
            record.subscribe()
        };

        let found = tokio::time::timeout(self.config.search_timeout, completion.wait())
            .await
            .unwrap_or(false);

        if found {
            let _guard = self.locks.lock(address);
            if let Some(chunk) = self.cache.get(address)?.filter(Chunk::has_data) {
                return Ok(chunk);
            }
            debug!(%address, "found chunk was evicted before it could be read");
        } else {
            debug!(%address, "get timed out");
            self.metrics.get_timeouts_total.increment(1);
            self.publish(NetStoreEvent::GetTimedOut { address: *address });
        }

        Err(SwarmError::ChunkNotFound { address: *address })
    }

    /// Handle a peer asking for a chunk.
    ///
    /// Content at hand is delivered to `from` straight away. Otherwise `from`
    /// is recorded as a requester, offered closer peers, and the search
    /// continues under the same request id.
    pub fn add_retrieve_request(&self, from: PeerHandle, msg: RetrieveRequest) -> SwarmResult<()> {
        self.metrics.retrieve_requests_total.increment(1);
        let address = msg.address;
        let peer = from.address();
        debug!(%address, id = %msg.id, %peer, "retrieve request");

        let _guard = self.locks.lock(&address);
        let mut entry = self.fetch_or_placeholder(&address)?;
        let record = self.ensure_record(&mut entry)?;

        let now = Instant::now();
        let relay_deadline = now + self.config.relay_timeout;

        if let Some(data) = entry.data() {
            record.mark_found();
            record.add_requester(msg.id, from.clone(), msg.deadline.unwrap_or(relay_deadline));

            self.dispatch(
                from,
                Outbound::Deliver(StoreRequest {
                    address,
                    id: msg.id,
                    data: data.clone(),
                    deadline: msg.deadline,
                }),
            );
            self.publish(NetStoreEvent::Delivered {
                address,
                id: msg.id,
                peer,
            });
            return Ok(());
        }

        record.add_requester(msg.id, from.clone(), relay_deadline);

        let search_deadline = now + self.config.search_timeout;
        let committed = msg
            .deadline
            .map_or(search_deadline, |deadline| deadline.min(search_deadline));

        let max_peers = match msg.max_peers {
            0 => self.config.max_peers,
            n => usize::try_from(n).unwrap_or(usize::MAX),
        };
        let peers = self.offer_candidates(&address, &peer, max_peers);
        let offered = peers.len();

        self.dispatch(
            from,
            Outbound::Offer(PeersOffer {
                address,
                id: msg.id,
                peers,
                deadline: committed,
            }),
        );
        self.publish(NetStoreEvent::PeersOffered {
            address,
            id: msg.id,
            peer,
            offered,
        });

        self.start_search(&address, &record, msg.id, committed);
        Ok(())
    }

    /// Up to `max` closest peers other than `asker`, `0` meaning the
    /// topology's default count.
    fn offer_candidates(
        &self,
        address: &ChunkAddress,
        asker: &OverlayAddress,
        max: usize,
    ) -> Vec<PeerAddress> {
        let max = match max {
            0 => self.topology.closest_peers(address, 0).len(),
            n => n,
        };
        // One extra in case the asker is among the closest.
        self.topology
            .closest_peers(address, max.saturating_add(1))
            .into_iter()
            .filter(|candidate| candidate.address() != *asker)
            .take(max)
            .map(|candidate| candidate.endpoint())
            .collect()
    }

    /// Ask the closest peers for a chunk under `id`.
    ///
    /// Peers that asked this node under the same id are skipped. Must be
    /// called with the chunk's stripe held.
    fn start_search(
        &self,
        address: &ChunkAddress,
        record: &RequestRecord,
        id: RequestId,
        deadline: Instant,
    ) {
        if !record.mark_searching(deadline) {
            trace!(%address, "already found, not searching");
            return;
        }
        self.metrics.searches_total.increment(1);

        let mut asked = 0;
        for peer in self.topology.closest_peers(address, self.config.max_peers) {
            if record.is_requester(id, &peer.address()) {
                trace!(%address, %id, peer = %peer.address(), "skipping requester");
                continue;
            }
            asked += 1;
            self.dispatch(
                peer,
                Outbound::Retrieve(RetrieveRequest {
                    address: *address,
                    id,
                    deadline: Some(deadline),
                    max_peers: u32::try_from(self.config.max_peers).unwrap_or(u32::MAX),
                }),
            );
        }

        debug!(%address, %id, peers = asked, "search started");
        self.publish(NetStoreEvent::SearchStarted {
            address: *address,
            id,
            peers: asked,
            deadline,
        });
    }

    /// Merge `chunk` into the cache and act on the outcome.
    fn store(&self, chunk: Chunk) -> SwarmResult<()> {
        self.metrics.puts_total.increment(1);
        let address = *chunk.address();

        let merged = {
            let _guard = self.locks.lock(&address);
            self.merge(chunk)?
        };

        match merged {
            Merged::Duplicate => {
                trace!(%address, "content already present");
                self.metrics.duplicate_puts_total.increment(1);
            }
            Merged::Stored(entry) => self.announce(&entry),
            Merged::Found(entry, targets) => {
                debug!(%address, source = ?entry.source(), "chunk found");
                self.publish(NetStoreEvent::Found {
                    address,
                    source: entry.source().copied(),
                });
                self.propagate(&entry, targets);
            }
        }
        Ok(())
    }

    /// Must be called with the chunk's stripe held. Propagation targets are
    /// taken before the stripe is released; later askers are served directly.
    fn merge(&self, chunk: Chunk) -> SwarmResult<Merged> {
        let entry = match self.cache.get(chunk.address())? {
            None => chunk,
            Some(existing) if existing.has_data() => return Ok(Merged::Duplicate),
            Some(mut placeholder) => {
                placeholder.fill_from(&chunk);
                placeholder
            }
        };
        self.cache.put(entry.clone())?;

        // Completion fires only once the content is visible in the cache.
        Ok(match entry.request().cloned() {
            Some(record) if record.mark_found() => {
                let targets = record.propagation_targets(
                    Instant::now(),
                    self.config.requester_count,
                    entry.source(),
                );
                Merged::Found(entry, targets)
            }
            Some(_) => Merged::Duplicate,
            None => Merged::Stored(entry),
        })
    }

    /// Send newly arrived content to the peers waiting for it.
    ///
    /// `targets` holds, per request id, up to `requester_count` requesters
    /// whose deadline had not passed, in the order they asked, excluding the
    /// content's source.
    fn propagate(&self, entry: &Chunk, targets: Vec<(RequestId, Vec<Requester>)>) {
        let Some(data) = entry.data() else {
            return;
        };
        let address = *entry.address();

        let mut deliveries = 0;
        for (id, requesters) in targets {
            for requester in requesters {
                deliveries += 1;
                self.dispatch(
                    requester.peer,
                    Outbound::Deliver(StoreRequest {
                        address,
                        id,
                        data: data.clone(),
                        deadline: Some(requester.deadline),
                    }),
                );
            }
        }

        debug!(%address, deliveries, "propagated chunk");
        self.publish(NetStoreEvent::Propagated {
            address,
            deliveries,
        });
    }

    /// Tell the closest peers, other than the source, about a stored chunk.
    fn announce(&self, entry: &Chunk) {
        let address = *entry.address();
        let mut notified = 0;
        for peer in self.topology.closest_peers(&address, self.config.max_peers) {
            if entry.source() == Some(&peer.address()) {
                continue;
            }
            notified += 1;
            self.dispatch(peer, Outbound::Announce(address));
        }

        trace!(%address, peers = notified, "announced chunk");
        self.publish(NetStoreEvent::Announced {
            address,
            peers: notified,
        });
    }

    /// Load the entry for `address`, storing an empty placeholder if absent.
    ///
    /// Must be called with the chunk's stripe held.
    fn fetch_or_placeholder(&self, address: &ChunkAddress) -> SwarmResult<Chunk> {
        if let Some(chunk) = self.cache.get(address)? {
            return Ok(chunk);
        }
        let placeholder = Chunk::placeholder(*address);
        self.cache.put(placeholder.clone())?;
        Ok(placeholder)
    }

    /// The entry's request record, attaching and storing a new one if needed.
    ///
    /// Must be called with the chunk's stripe held.
    fn ensure_record(&self, entry: &mut Chunk) -> SwarmResult<Arc<RequestRecord>> {
        if let Some(record) = entry.request() {
            return Ok(Arc::clone(record));
        }
        let record = Arc::new(if entry.has_data() {
            RequestRecord::found()
        } else {
            RequestRecord::new()
        });
        entry.attach_request(Arc::clone(&record));
        self.cache.put(entry.clone())?;
        Ok(record)
    }

    /// Send `message` to `peer` in the background.
    ///
    /// Failures are logged, counted and published, never returned.
    fn dispatch(&self, peer: PeerHandle, message: Outbound) {
        let kind = message.kind();
        let events = self.events.clone();
        let metrics = self.metrics.clone();

        self.executor.spawn(kind.into(), async move {
            let address = message.address();
            let result = match message {
                Outbound::Announce(address) => peer.announce(address).await,
                Outbound::Retrieve(msg) => peer.retrieve(msg).await,
                Outbound::Deliver(msg) => peer.deliver(msg).await,
                Outbound::Offer(msg) => peer.offer_peers(msg).await,
            };

            match result {
                Ok(()) => metrics.inc_sent(kind),
                Err(error) => {
                    debug!(%address, peer = %peer.address(), %kind, %error, "send failed");
                    metrics.send_failures_total.increment(1);
                    let _ = events.send(NetStoreEvent::SendFailed {
                        address,
                        peer: peer.address(),
                        kind,
                        error,
                    });
                }
            }
        });
    }

    fn publish(&self, event: NetStoreEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
