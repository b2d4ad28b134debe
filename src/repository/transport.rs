use crate::codec;
use crate::model::{Name, Response};
use hostwalk_proto::buffer::{BytePacketBuffer, ReaderError, WriterError};
use hostwalk_proto::packet::QueryType;
use std::fmt::Display;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;
use tokio::net::UdpSocket;

/// Upper bound on one UDP round-trip. A server that takes longer is treated
/// as dead and the walker moves on.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(3);

const DNS_PORT: u16 = 53;

#[derive(Debug)]
pub enum TransportError {
    Io(std::io::Error),
    Timeout,
    Encode(WriterError),
    Decode(ReaderError),
}

impl Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "socket error: {error}"),
            Self::Timeout => write!(f, "timed out waiting for a reply"),
            Self::Encode(error) => write!(f, "unable to encode query: {error}"),
            Self::Decode(error) => write!(f, "unable to decode reply: {error}"),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<std::io::Error> for TransportError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<WriterError> for TransportError {
    fn from(value: WriterError) -> Self {
        Self::Encode(value)
    }
}

impl From<ReaderError> for TransportError {
    fn from(value: ReaderError) -> Self {
        Self::Decode(value)
    }
}

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn query(
        &self,
        server: Ipv4Addr,
        name: &Name,
        qtype: QueryType,
    ) -> Result<Response, TransportError>;
}

/// One encode + UDP exchange + decode per call, bounded by [`QUERY_TIMEOUT`],
/// no retry at this layer. Every call binds a fresh ephemeral socket.
pub struct UdpTransport {
    timeout: Duration,
    index: AtomicU16,
}

impl Default for UdpTransport {
    fn default() -> Self {
        Self {
            timeout: QUERY_TIMEOUT,
            index: AtomicU16::new(0),
        }
    }
}

#[async_trait::async_trait]
impl Transport for UdpTransport {
    #[tracing::instrument(skip(self))]
    async fn query(
        &self,
        server: Ipv4Addr,
        name: &Name,
        qtype: QueryType,
    ) -> Result<Response, TransportError> {
        let id = self.index.fetch_add(1, Ordering::SeqCst);
        let request = codec::encode_query(id, name, qtype)?;

        let exchange = async {
            let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
            socket
                .send_to(&request.buf[..request.pos()], (server, DNS_PORT))
                .await?;

            let mut reply = BytePacketBuffer::default();
            let (size, _) = socket.recv_from(&mut reply.buf).await?;
            tracing::debug!("received {size} bytes from {server}");
            Ok::<_, TransportError>(reply)
        };

        let reply = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| TransportError::Timeout)??;

        Ok(codec::decode(reply)?)
    }
}
