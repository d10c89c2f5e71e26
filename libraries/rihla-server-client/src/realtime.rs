//! Change-feed subscriptions over server-sent events.
//!
//! One reader task per subscribed resource streams
//! `GET /realtime/v1/stream?resource={name}` and fans events out on a
//! broadcast channel. The reader stops once every receiver is dropped and a
//! later subscribe starts a fresh one.

use crate::client::{FeedChannel, RihlaServerClient};
use crate::error::Result;
use crate::types::ServerConfig;
use futures_util::StreamExt;
use reqwest::Client;
use rihla_core::{ChangeEvent, ChangeFeed};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};

/// Broadcast capacity per resource feed
const FEED_CHANNEL_CAPACITY: usize = 64;

/// Delay before reconnecting after the stream drops
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

impl ChangeFeed for RihlaServerClient {
    fn subscribe(&self, resource: &str) -> broadcast::Receiver<ChangeEvent> {
        let mut feeds = match self.feeds.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let channel = feeds
            .entry(resource.to_string())
            .or_insert_with(|| FeedChannel {
                sender: broadcast::channel(FEED_CHANNEL_CAPACITY).0,
                reader: None,
            });

        let receiver = channel.sender.subscribe();

        let reader_alive = channel
            .reader
            .as_ref()
            .is_some_and(|handle| !handle.is_finished());
        if !reader_alive {
            debug!(resource = %resource, "Starting change-feed reader");
            channel.reader = Some(tokio::spawn(run_feed(
                self.http.clone(),
                Arc::clone(&self.config),
                resource.to_string(),
                channel.sender.clone(),
            )));
        }

        receiver
    }
}

/// Stream the resource's event feed until every subscriber is gone,
/// reconnecting when the stream drops while interest remains.
async fn run_feed(
    http: Client,
    config: Arc<RwLock<ServerConfig>>,
    resource: String,
    tx: broadcast::Sender<ChangeEvent>,
) {
    loop {
        if tx.receiver_count() == 0 {
            debug!(resource = %resource, "No subscribers left; stopping change-feed reader");
            return;
        }

        if let Err(e) = stream_once(&http, &config, &resource, &tx).await {
            warn!(resource = %resource, error = %e, "Change-feed stream failed");
        }

        if tx.receiver_count() == 0 {
            return;
        }
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

/// Open one SSE connection and forward its events until it ends.
async fn stream_once(
    http: &Client,
    config: &Arc<RwLock<ServerConfig>>,
    resource: &str,
    tx: &broadcast::Sender<ChangeEvent>,
) -> Result<()> {
    let (base, api_key, access_token) = {
        let config = config.read().await;
        (
            config.url.clone(),
            config.api_key.clone(),
            config.access_token.clone(),
        )
    };

    let url = format!("{base}/realtime/v1/stream?resource={resource}");
    let mut request = http
        .get(&url)
        .header("apikey", &api_key)
        .header("Accept", "text/event-stream");
    if let Some(token) = access_token {
        request = request.bearer_auth(token);
    }

    let response = request.send().await.map_err(RihlaServerClient::classify)?;
    let response = response.error_for_status().map_err(RihlaServerClient::classify)?;

    debug!(resource = %resource, "Change-feed stream connected");

    let mut stream = response.bytes_stream();
    let mut buffer = String::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(RihlaServerClient::classify)?;
        buffer.push_str(&String::from_utf8_lossy(&chunk));

        while let Some(newline) = buffer.find('\n') {
            let line = buffer[..newline].trim_end_matches('\r').to_string();
            buffer.drain(..=newline);

            if let Some(event) = parse_sse_line(&line) {
                if tx.send(event).is_err() {
                    // All receivers dropped mid-stream
                    return Ok(());
                }
            }
        }

        if tx.receiver_count() == 0 {
            return Ok(());
        }
    }

    debug!(resource = %resource, "Change-feed stream ended");
    Ok(())
}

/// Decode one SSE line into a change event.
///
/// Only `data:` lines carry events; comments, `event:` fields, and blank
/// separators are skipped, as are data payloads that fail to decode.
fn parse_sse_line(line: &str) -> Option<ChangeEvent> {
    let payload = line.strip_prefix("data:")?.trim();
    if payload.is_empty() {
        return None;
    }

    match serde_json::from_str::<ChangeEvent>(payload) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(error = %e, "Skipping undecodable change-feed payload");
            None
        }
    }
}
