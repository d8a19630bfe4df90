//! Remote gateway: the I/O boundary towards the remote quote source.
//!
//! The remote source is treated as unreliable. Reads degrade to "no remote records this
//! cycle", writes are best-effort mirrors that run on a detached thread and are never
//! retried. No merge logic lives here.
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};
use quote_common::net::REMOTE_BATCH_LIMIT;
use quote_common::{QuoteRecord, Result, SyncError};
use serde::Deserialize;

/// Capability to read from and write to the remote quote source.
pub trait RemoteGateway: Send + Sync {
    /// Fetches the current remote batch, already mapped to records.
    ///
    /// Never fails: any transport or parse problem yields an empty batch.
    fn fetch_remote_batch(&self) -> Vec<QuoteRecord>;

    /// Writes one record to the remote source.
    fn post_record(&self, record: &QuoteRecord) -> Result<()>;
}

/// Remote item shape; fields other than `id` and `title` are ignored.
#[derive(Debug, Deserialize)]
struct RemoteItem {
    id: u64,
    title: String,
}

/// Maps decoded remote items to records, keeping at most `REMOTE_BATCH_LIMIT`.
fn map_items(items: Vec<RemoteItem>) -> Vec<QuoteRecord> {
    items
        .into_iter()
        .take(REMOTE_BATCH_LIMIT)
        .map(|item| QuoteRecord::from_remote(item.id, item.title))
        .collect()
}

/// Decodes a raw response body into a remote batch.
pub fn parse_remote_batch(body: &str) -> Result<Vec<QuoteRecord>> {
    let items: Vec<RemoteItem> = serde_json::from_str(body)?;
    Ok(map_items(items))
}

/// Gateway speaking JSON over HTTP to a single endpoint.
pub struct HttpGateway {
    agent: ureq::Agent,
    url: String,
}

impl HttpGateway {
    /// Creates a gateway for `url`; every request, body included, is abandoned once
    /// `timeout` has passed since it started.
    pub fn new(url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout(timeout)
            .build();
        Self {
            agent,
            url: url.to_string(),
        }
    }

    /// Endpoint this gateway talks to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches the remote batch, surfacing the failure instead of swallowing it.
    pub fn try_fetch(&self) -> Result<Vec<QuoteRecord>> {
        let response = self
            .agent
            .get(&self.url)
            .set("Accept", "application/json")
            .call()
            .map_err(remote_error)?;
        let body = response.into_string()?;
        parse_remote_batch(&body)
    }
}

impl RemoteGateway for HttpGateway {
    fn fetch_remote_batch(&self) -> Vec<QuoteRecord> {
        match self.try_fetch() {
            Ok(batch) => {
                debug!("Fetched {} remote quotes from {}", batch.len(), self.url);
                batch
            }
            Err(e) => {
                warn!("Error fetching server quotes: {}", e);
                Vec::new()
            }
        }
    }

    fn post_record(&self, record: &QuoteRecord) -> Result<()> {
        self.agent
            .post(&self.url)
            .set("Content-Type", "application/json")
            .send_json(record)
            .map_err(remote_error)?;
        Ok(())
    }
}

fn remote_error(err: ureq::Error) -> SyncError {
    match err {
        ureq::Error::Status(code, _) => SyncError::Remote(format!("http status {}", code)),
        ureq::Error::Transport(transport) => SyncError::Remote(transport.to_string()),
    }
}

/// Mirrors `record` to the remote source on a detached thread.
///
/// No retry, no propagation: a failure is logged and dropped. The handle may be joined by
/// callers that need to wait for the attempt (e.g. a process about to exit) or dropped.
pub fn spawn_post(gateway: Arc<dyn RemoteGateway>, record: QuoteRecord) -> JoinHandle<()> {
    thread::spawn(move || match gateway.post_record(&record) {
        Ok(()) => info!("Quote {} mirrored to the server", record.id),
        Err(e) => warn!("Failed to mirror quote {} to the server: {}", record.id, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote_common::record::SERVER_CATEGORY;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::time::Instant;

    #[test]
    fn maps_title_and_keeps_remote_id() {
        let body = r#"[{"userId":1,"id":4,"title":"eum et est","body":"ullam"}]"#;
        let batch = parse_remote_batch(body).unwrap();
        assert_eq!(batch, vec![QuoteRecord::new(4, "eum et est", SERVER_CATEGORY)]);
    }

    #[test]
    fn keeps_only_the_first_items() {
        let items: Vec<String> = (1..=25)
            .map(|i| format!(r#"{{"id":{},"title":"t{}"}}"#, i, i))
            .collect();
        let body = format!("[{}]", items.join(","));
        let batch = parse_remote_batch(&body).unwrap();
        assert_eq!(batch.len(), REMOTE_BATCH_LIMIT);
        assert_eq!(batch.last().map(|r| r.id), Some(REMOTE_BATCH_LIMIT as u64));
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(parse_remote_batch("<html>").is_err());
        assert!(parse_remote_batch(r#"{"id":1,"title":"x"}"#).is_err());
    }

    #[test]
    fn unreachable_endpoint_yields_empty_batch() {
        let gateway = HttpGateway::new("http://127.0.0.1:9/posts", Duration::from_millis(300));
        assert!(gateway.try_fetch().is_err());
        assert!(gateway.fetch_remote_batch().is_empty());
    }

    #[test]
    fn slow_response_is_cut_off_by_the_overall_deadline() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/posts", listener.local_addr().unwrap());
        thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let mut request = [0u8; 1024];
            let _ = stream.read(&mut request);
            if stream.write_all(b"HTTP/1.1 200 OK\r\nX-Slow: ").is_err() {
                return;
            }
            // One header byte at a time, each well inside a per-read timeout.
            for _ in 0..80 {
                thread::sleep(Duration::from_millis(50));
                if stream.write_all(b"a").is_err() {
                    return;
                }
            }
        });

        let gateway = HttpGateway::new(&url, Duration::from_millis(300));
        let started = Instant::now();
        assert!(gateway.try_fetch().is_err());
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
