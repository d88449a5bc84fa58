//! HTTP observe transport
//!
//! Nodes expose each resource as a streaming HTTP endpoint at
//! `http://<address>:<port>/<resource>`. Subscribing issues one long-lived
//! GET; every newline-delimited chunk of the response body is one
//! compact-encoded notification. The connection is expected to stay open
//! and idle between notifications indefinitely, so no read timeout is set.

use std::net::IpAddr;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use iotgw_core::{GatewayError, GatewayResult, NotificationReceiver, ObserveTransport, ResourceType};
use tokio::sync::mpsc;
use tracing::trace;

/// Per-relation channel depth; the node side blocks once the decoder falls
/// this far behind.
const NOTIFICATION_BUFFER: usize = 32;

/// Canonical URL of a node's resource endpoint. IPv6 addresses are
/// bracketed, matching the directory's bare-address storage format.
pub fn resource_url(address: &str, port: u16, resource: ResourceType) -> String {
    let authority = match address.parse::<IpAddr>() {
        Ok(IpAddr::V6(v6)) => format!("[{}]", v6),
        _ => address.to_string(),
    };
    format!("http://{}:{}/{}", authority, port, resource)
}

/// Observe transport over streaming HTTP
pub struct HttpObserveTransport {
    client: reqwest::Client,
    node_port: u16,
}

impl HttpObserveTransport {
    /// `node_port` is the well-known port every node serves its resource
    /// endpoints on; registration only learns the node's address.
    pub fn new(client: reqwest::Client, node_port: u16) -> Self {
        Self { client, node_port }
    }
}

#[async_trait]
impl ObserveTransport for HttpObserveTransport {
    async fn observe(
        &self,
        address: &str,
        resource: ResourceType,
    ) -> GatewayResult<NotificationReceiver> {
        let url = resource_url(address, self.node_port, resource);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        let (tx, rx) = mpsc::channel(NOTIFICATION_BUFFER);
        tokio::spawn(pump_notifications(response, tx));
        Ok(rx)
    }
}

/// Reads the response body and forwards one complete line per notification.
/// Exits when the node closes the stream, the body errors, or the receiver
/// is dropped (which also drops the connection).
async fn pump_notifications(response: reqwest::Response, tx: mpsc::Sender<GatewayResult<Bytes>>) {
    let mut body = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();

    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(err) => {
                let _ = tx.send(Err(GatewayError::Transport(err.to_string()))).await;
                return;
            }
        };
        buffer.extend_from_slice(&chunk);

        while let Some(newline) = buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = buffer.drain(..=newline).collect();
            let mut line = &line[..line.len() - 1];
            if line.last() == Some(&b'\r') {
                line = &line[..line.len() - 1];
            }
            if line.is_empty() {
                continue;
            }
            trace!(bytes = line.len(), "notification line");
            if tx.send(Ok(Bytes::copy_from_slice(line))).await.is_err() {
                return;
            }
        }
    }

    // A trailing unterminated line is still one notification
    if !buffer.is_empty() {
        let _ = tx.send(Ok(Bytes::from(buffer))).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv4_resource_url() {
        assert_eq!(
            resource_url("192.168.1.20", 5683, ResourceType::Co),
            "http://192.168.1.20:5683/co"
        );
    }

    #[test]
    fn ipv6_resource_url_is_bracketed() {
        assert_eq!(
            resource_url("2001:db8::1", 5683, ResourceType::Hvac),
            "http://[2001:db8::1]:5683/hvac"
        );
    }

    #[test]
    fn hostname_resource_url() {
        assert_eq!(
            resource_url("node7.local", 8080, ResourceType::Movement),
            "http://node7.local:8080/movement"
        );
    }
}
