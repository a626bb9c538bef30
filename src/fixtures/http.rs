use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::models::{parse_fixture_list, Fixture, FixtureId, FixtureStats};
use super::provider::{ErrorFn, FixtureGateway, Subscription, UpdateFn};
use super::sse::SseDecoder;
use super::websocket;
use crate::config::PushTransport;
use crate::error::{Error, Result};

/// Gateway backed by the fixtures REST service and its push channel.
pub struct HttpFixtureGateway {
    /// Client for one-shot calls (with request timeout)
    http: Client,
    /// Client for the long-lived push channel (no timeout)
    stream_http: Client,
    base_url: String,
    push_transport: PushTransport,
}

impl HttpFixtureGateway {
    pub fn new(base_url: &str, timeout: Duration, push_transport: PushTransport) -> Result<Self> {
        let build_err = |source: reqwest::Error| Error::Request {
            url: base_url.to_string(),
            source,
        };
        let http = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .map_err(build_err)?;
        let stream_http = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(build_err)?;
        Ok(HttpFixtureGateway {
            http,
            stream_http,
            base_url: base_url.trim_end_matches('/').to_string(),
            push_transport,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path);
        debug!("GET {}", url);

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| Error::Request {
                url: url.clone(),
                source,
            })?;

        if !resp.status().is_success() {
            return Err(Error::Status {
                url,
                status: resp.status().as_u16(),
            });
        }

        let body = resp.bytes().await.map_err(|source| Error::Request {
            url: url.clone(),
            source,
        })?;
        serde_json::from_slice(&body).map_err(|source| Error::Decode { url, source })
    }
}

#[async_trait]
impl FixtureGateway for HttpFixtureGateway {
    fn name(&self) -> &str {
        "fixtures-api"
    }

    async fn fetch_live(&self) -> Result<Vec<Fixture>> {
        let fixtures: Vec<Fixture> = self.get_json("fixtures/live").await?;
        debug!("Fetched {} live fixtures", fixtures.len());
        Ok(fixtures)
    }

    async fn fetch_today(&self) -> Result<Vec<Fixture>> {
        let fixtures: Vec<Fixture> = self.get_json("fixtures/today").await?;
        debug!("Fetched {} fixtures for today", fixtures.len());
        Ok(fixtures)
    }

    async fn fetch_stats(&self, fixture_id: FixtureId) -> Result<Vec<FixtureStats>> {
        self.get_json(&format!("fixtures/{}/stats", fixture_id)).await
    }

    fn subscribe(&self, on_update: UpdateFn, on_error: ErrorFn) -> Subscription {
        let url = self.endpoint("fixtures/stream");
        let transport = self.push_transport;
        let http = self.stream_http.clone();

        // Set on release; nothing reaches the caller once it is set.
        let released = Arc::new(AtomicBool::new(false));
        let gate = Arc::clone(&released);
        let deliver: UpdateFn = Box::new(move |fixtures| {
            if !gate.load(Ordering::SeqCst) {
                on_update(fixtures);
            }
        });

        info!("Opening {} push channel: {}", transport, url);
        let task_released = Arc::clone(&released);
        let task = tokio::spawn(async move {
            let failure = match transport {
                PushTransport::Sse => run_sse(&http, &url, &deliver).await,
                PushTransport::Websocket => match websocket::ws_url(&url) {
                    Ok(ws_url) => websocket::run_websocket(&ws_url, &deliver).await,
                    Err(e) => e,
                },
            };
            if task_released.load(Ordering::SeqCst) {
                debug!("Push channel already released, dropping failure: {}", failure);
                return;
            }
            warn!("Push channel failed: {}", failure);
            on_error(failure);
        });

        Subscription::new(move || {
            released.store(true, Ordering::SeqCst);
            task.abort();
            info!("Push channel released");
        })
    }
}

/// Read the SSE body until it fails; the returned error says why it stopped.
async fn run_sse(http: &Client, url: &str, deliver: &UpdateFn) -> Error {
    let resp = match http
        .get(url)
        .header(ACCEPT, "text/event-stream")
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => return Error::Channel(format!("connect to {} failed: {}", url, e)),
    };

    if !resp.status().is_success() {
        return Error::Channel(format!("{} returned HTTP {}", url, resp.status()));
    }
    if let Some(content_type) = resp.headers().get(CONTENT_TYPE) {
        let content_type = content_type.to_str().unwrap_or_default();
        if !content_type.starts_with("text/event-stream") {
            return Error::Channel(format!("unexpected content type '{}'", content_type));
        }
    }
    info!("Push channel connected");

    let mut decoder = SseDecoder::new();
    let mut body = resp.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => return Error::Channel(format!("read failed: {}", e)),
        };
        for event in decoder.push(&chunk) {
            if !event.is_message() {
                debug!("Ignoring '{}' event", event.event);
                continue;
            }
            match parse_fixture_list(&event.data) {
                Ok(fixtures) => {
                    debug!("Push message with {} fixtures", fixtures.len());
                    deliver(fixtures);
                }
                Err(e) => return e,
            }
        }
    }

    Error::Channel("stream ended".to_string())
}
