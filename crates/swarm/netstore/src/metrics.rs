//! NetStore metrics.

use metrics::Counter;

use crate::SendKind;

/// Counters for store operations and outbound traffic.
#[derive(Clone, Debug)]
pub(crate) struct NetStoreMetrics {
    /// Local get calls
    pub(crate) gets_total: Counter,
    /// Gets answered from the local cache
    pub(crate) local_hits_total: Counter,
    /// Gets that gave up waiting
    pub(crate) get_timeouts_total: Counter,
    /// Content writes, local or from peers
    pub(crate) puts_total: Counter,
    /// Writes ignored because content was already present
    pub(crate) duplicate_puts_total: Counter,
    /// Inbound store requests
    pub(crate) store_requests_total: Counter,
    /// Inbound retrieve requests
    pub(crate) retrieve_requests_total: Counter,
    /// Searches started
    pub(crate) searches_total: Counter,
    /// Outbound messages that reached the peer
    sent_announce: Counter,
    sent_retrieve: Counter,
    sent_deliver: Counter,
    sent_offer: Counter,
    /// Outbound messages that failed
    pub(crate) send_failures_total: Counter,
}

impl Default for NetStoreMetrics {
    fn default() -> Self {
        Self {
            gets_total: metrics::counter!("netstore.gets_total"),
            local_hits_total: metrics::counter!("netstore.local_hits_total"),
            get_timeouts_total: metrics::counter!("netstore.get_timeouts_total"),
            puts_total: metrics::counter!("netstore.puts_total"),
            duplicate_puts_total: metrics::counter!("netstore.duplicate_puts_total"),
            store_requests_total: metrics::counter!("netstore.store_requests_total"),
            retrieve_requests_total: metrics::counter!("netstore.retrieve_requests_total"),
            searches_total: metrics::counter!("netstore.searches_total"),
            sent_announce: metrics::counter!("netstore.sent_total", "kind" => "announce"),
            sent_retrieve: metrics::counter!("netstore.sent_total", "kind" => "retrieve"),
            sent_deliver: metrics::counter!("netstore.sent_total", "kind" => "deliver"),
            sent_offer: metrics::counter!("netstore.sent_total", "kind" => "offer_peers"),
            send_failures_total: metrics::counter!("netstore.send_failures_total"),
        }
    }
}

impl NetStoreMetrics {
    pub(crate) fn inc_sent(&self, kind: SendKind) {
        match kind {
            SendKind::Announce => &self.sent_announce,
            SendKind::Retrieve => &self.sent_retrieve,
            SendKind::Deliver => &self.sent_deliver,
            SendKind::OfferPeers => &self.sent_offer,
        }
        .increment(1);
    }
}
