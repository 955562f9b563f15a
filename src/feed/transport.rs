//! Where feed datagrams go.
//!
//! The default transport is connectionless UDP multicast, matching the
//! reference implementation: datagram loss is tolerated, and a subscriber
//! detects it by watching for gaps in a record's sequence number (see
//! [`super::sequencer::FeedSequencer`]). The optional `nats` feature swaps in
//! an at-least-once alternative with the same wire record layout.

use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket};

use super::error::FeedError;

/// Something that can carry a raw wire record to subscribers.
pub trait FeedTransport: Send + Sync {
    /// Sends one already-encoded record. Errors are expected to be logged
    /// by the caller, not treated as a reason to fail the submission that
    /// produced the record.
    fn send(&self, bytes: &[u8]) -> Result<(), FeedError>;
}

/// Publishes records as UDP datagrams to an IPv4 multicast group.
pub struct UdpMulticastTransport {
    socket: UdpSocket,
    destination: SocketAddrV4,
}

impl UdpMulticastTransport {
    /// Binds an ephemeral send socket and joins `group:port` with TTL 1, so
    /// datagrams stay on the local network segment — this is a market-data
    /// feed for a simulated exchange, not a routed production multicast
    /// deployment.
    pub fn bind(group: Ipv4Addr, port: u16) -> Result<Self, FeedError> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        socket.set_multicast_ttl_v4(1)?;
        Ok(UdpMulticastTransport {
            socket,
            destination: SocketAddrV4::new(group, port),
        })
    }
}

impl FeedTransport for UdpMulticastTransport {
    fn send(&self, bytes: &[u8]) -> Result<(), FeedError> {
        self.socket.send_to(bytes, self.destination)?;
        Ok(())
    }
}

/// A transport that only records what it was sent; used in tests and in
/// place of a live network when one isn't available.
#[derive(Default)]
pub struct RecordingTransport {
    sent: std::sync::Mutex<Vec<Vec<u8>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().expect("recording transport mutex poisoned").clone()
    }
}

impl FeedTransport for RecordingTransport {
    fn send(&self, bytes: &[u8]) -> Result<(), FeedError> {
        self.sent.lock().expect("recording transport mutex poisoned").push(bytes.to_vec());
        Ok(())
    }
}

#[cfg(feature = "nats")]
pub mod nats {
    //! Alternate feed transport over NATS, for deployments that want
    //! at-least-once delivery instead of loss-tolerant multicast. The wire
    //! record layout (see [`super::super::codec`]) is unchanged; only the
    //! carrier differs.

    use async_nats::Client;
    use bytes::Bytes;

    use super::super::error::FeedError;
    use super::FeedTransport;

    /// Publishes records to a single NATS subject.
    pub struct NatsFeedTransport {
        client: Client,
        subject: String,
        runtime: tokio::runtime::Handle,
    }

    impl NatsFeedTransport {
        pub fn new(client: Client, subject: impl Into<String>, runtime: tokio::runtime::Handle) -> Self {
            NatsFeedTransport { client, subject: subject.into(), runtime }
        }
    }

    impl FeedTransport for NatsFeedTransport {
        fn send(&self, bytes: &[u8]) -> Result<(), FeedError> {
            let client = self.client.clone();
            let subject = self.subject.clone();
            let payload = Bytes::copy_from_slice(bytes);
            self.runtime.block_on(async move {
                client
                    .publish(subject, payload)
                    .await
                    .map_err(|e| FeedError::Transport(std::io::Error::other(e)))
            })
        }
    }
}
