//! WebSocket rendition of the fixtures push channel.
//!
//! Same contract as the SSE channel: every text frame carries the full
//! fixture list, and the first failure ends the channel for good.

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info};
use url::Url;

use super::models::parse_fixture_list;
use super::provider::UpdateFn;
use crate::error::Error;

/// Map an `http(s)://` endpoint onto its `ws(s)://` twin.
pub fn ws_url(http_url: &str) -> Result<String, Error> {
    let mut url = Url::parse(http_url)
        .map_err(|e| Error::Channel(format!("invalid push URL '{}': {}", http_url, e)))?;
    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => {
            return Err(Error::Channel(format!(
                "unsupported scheme '{}' for push channel",
                other
            )))
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| Error::Channel(format!("cannot use '{}' with {}", scheme, http_url)))?;
    Ok(url.to_string())
}

/// Read frames until the socket fails; the returned error says why it stopped.
pub async fn run_websocket(url: &str, deliver: &UpdateFn) -> Error {
    let ws_stream = match tokio_tungstenite::connect_async(url).await {
        Ok((ws_stream, _response)) => ws_stream,
        Err(e) => return Error::Channel(format!("connect to {} failed: {}", url, e)),
    };
    info!("Push channel connected: {}", url);

    let (mut write, mut read) = ws_stream.split();
    while let Some(msg) = read.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if text.trim() == "ping" {
                    let _ = write.send(Message::Text("pong".to_string())).await;
                    continue;
                }
                match parse_fixture_list(&text) {
                    Ok(fixtures) => {
                        debug!("Push message with {} fixtures", fixtures.len());
                        deliver(fixtures);
                    }
                    Err(e) => return e,
                }
            }
            Ok(Message::Ping(data)) => {
                if let Err(e) = write.send(Message::Pong(data)).await {
                    return Error::Channel(format!("pong failed: {}", e));
                }
            }
            Ok(Message::Close(_)) => {
                return Error::Channel("server closed the channel".to_string());
            }
            Ok(_) => {}
            Err(e) => return Error::Channel(format!("websocket error: {}", e)),
        }
    }

    Error::Channel("stream ended".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    async fn listen() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}/fixtures/stream", listener.local_addr().unwrap());
        (listener, url)
    }

    fn recording() -> (UpdateFn, Arc<Mutex<Vec<Vec<u64>>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let deliver: UpdateFn = Box::new(move |fixtures| {
            sink.lock()
                .unwrap()
                .push(fixtures.iter().map(|f| f.id).collect());
        });
        (deliver, seen)
    }

    fn fixtures_frame(ids: &[u64]) -> Message {
        let list: Vec<serde_json::Value> = ids
            .iter()
            .map(|id| {
                serde_json::json!({
                    "id": id,
                    "homeTeam": "Arsenal",
                    "awayTeam": "Chelsea",
                    "statusShort": "1H",
                    "elapsed": 12
                })
            })
            .collect();
        Message::Text(serde_json::Value::Array(list).to_string())
    }

    #[test]
    fn test_ws_url() {
        assert_eq!(
            ws_url("http://localhost:3000/api/fixtures/stream").unwrap(),
            "ws://localhost:3000/api/fixtures/stream"
        );
        assert_eq!(
            ws_url("https://scores.example.com/api/fixtures/stream").unwrap(),
            "wss://scores.example.com/api/fixtures/stream"
        );
        assert!(ws_url("ftp://scores.example.com/stream").is_err());
        assert!(ws_url("not a url").is_err());
    }

    #[tokio::test]
    async fn test_text_frames_deliver_until_malformed() {
        let (listener, url) = listen().await;
        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            ws.send(fixtures_frame(&[7, 8])).await.unwrap();
            ws.send(Message::Text("not-json".to_string())).await.unwrap();
            let _ = ws.send(fixtures_frame(&[9])).await;
            // Hold the socket until the client hangs up.
            while let Some(Ok(_)) = ws.next().await {}
        });

        let (deliver, seen) = recording();
        let err = run_websocket(&url, &deliver).await;

        assert!(matches!(err, Error::MalformedMessage(_)), "{err:?}");
        assert_eq!(*seen.lock().unwrap(), vec![vec![7, 8]]);
        drop(server);
    }

    #[tokio::test]
    async fn test_close_frame_is_channel_failure() {
        let (listener, url) = listen().await;
        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            ws.send(Message::Text("ping".to_string())).await.unwrap();
            let reply = ws.next().await.unwrap().unwrap();
            ws.send(fixtures_frame(&[])).await.unwrap();
            ws.send(Message::Close(None)).await.unwrap();
            reply
        });

        let (deliver, seen) = recording();
        let err = run_websocket(&url, &deliver).await;

        assert!(matches!(err, Error::Channel(_)), "{err:?}");
        assert_eq!(*seen.lock().unwrap(), vec![Vec::<u64>::new()]);
        assert_eq!(server.await.unwrap(), Message::Text("pong".to_string()));
    }

    #[tokio::test]
    async fn test_connect_failure_is_channel_error() {
        // Grab a free port, then close it so nothing is listening there.
        let (listener, url) = listen().await;
        drop(listener);

        let deliver: UpdateFn = Box::new(|_| {});
        let err = run_websocket(&url, &deliver).await;
        assert!(matches!(err, Error::Channel(_)), "{err:?}");
    }
}
