// SPDX-License-Identifier: GPL-3.0-only

//! HTTP prediction service.
//!
//! Talks to a prediction server exposing:
//!
//! - `POST /predict-char` with `{"text": "..."}`, answering
//!   `[{"character": "r", "confidence": 0.8}, ...]`
//! - `POST /predict-word` with `{"text": "...", "word_list": [...]}`, answering
//!   `[{"word": "store", "confidence": 0.6}, ...]`
//!
//! The server may double-encode its answer as a JSON string; both forms are
//! accepted.

use std::time::Duration;

use crate::app_settings;
use crate::prediction::client::PredictionService;
use crate::prediction::types::{
    decode_char_response, decode_word_response, CharPrediction, CharRequest, PredictionError,
    WordPrediction, WordRequest,
};

/// Prediction service reached over HTTP.
///
/// One instance is created per session and reused for every request so the
/// underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct HttpService {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpService {
    /// Creates a service for the server at `base_url` (e.g. `http://localhost:8000`).
    ///
    /// # Errors
    ///
    /// Returns `PredictionError::Transport` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, PredictionError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(PredictionError::Transport)?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            timeout,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn map_transport(&self, e: reqwest::Error) -> PredictionError {
        if e.is_timeout() {
            PredictionError::Timeout {
                after_ms: self.timeout.as_millis() as u64,
            }
        } else {
            PredictionError::Transport(e)
        }
    }
}

impl PredictionService for HttpService {
    async fn predict_char(&self, text: &str) -> Result<Vec<CharPrediction>, PredictionError> {
        let url = self.endpoint(app_settings::PREDICT_CHAR_PATH);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(&CharRequest { text })
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PredictionError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| self.map_transport(e))?;
        decode_char_response(&body)
    }

    async fn predict_words(
        &self,
        text: &str,
        word_list: &[String],
    ) -> Result<Vec<WordPrediction>, PredictionError> {
        let url = self.endpoint(app_settings::PREDICT_WORD_PATH);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(&WordRequest { text, word_list })
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PredictionError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| self.map_transport(e))?;
        decode_word_response(&body)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::KeyId;
    use crate::prediction::PredictionClient;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::oneshot;

    /// Reads one HTTP request (headers plus Content-Length body).
    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];

        loop {
            let n = socket.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
                let content_length = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    break;
                }
            }
        }

        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Serves a single canned response and hands back the raw request.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            let _ = tx.send(request);
        });

        (format!("http://{}", addr), rx)
    }

    /// Test 1: Successful character prediction over HTTP
    #[tokio::test]
    async fn test_predict_char_over_http() {
        let (url, request_rx) = serve_once(
            "200 OK",
            r#"[{"character": "r", "confidence": 0.8}, {"character": "p", "confidence": 0.1}]"#,
        )
        .await;

        let service = HttpService::new(url, Duration::from_secs(5)).unwrap();
        let entries = service.predict_char("I need to go to the sto").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].character, "r");

        let request = request_rx.await.unwrap();
        assert!(request.starts_with("POST /predict-char "), "got {}", request);
        assert!(request.contains(r#""text":"I need to go to the sto""#));
    }

    /// Test 2: HTTP errors are reported as status errors
    #[tokio::test]
    async fn test_http_error_status() {
        let (url, _rx) = serve_once("500 Internal Server Error", r#"{"detail": "boom"}"#).await;

        let service = HttpService::new(url, Duration::from_secs(5)).unwrap();
        match service.predict_char("hel").await {
            Err(PredictionError::Status(500)) => {}
            other => panic!("Expected Status(500), got {:?}", other),
        }
    }

    /// Test 3: A malformed body yields an empty map through the client
    #[tokio::test]
    async fn test_malformed_body_degrades_to_empty() {
        let (url, _rx) = serve_once("200 OK", r#"[("r", 0.8)]"#).await;

        let service = HttpService::new(url, Duration::from_secs(5)).unwrap();
        let client = PredictionClient::new(service);
        let prediction = client.predict("hel").await;
        assert!(prediction.confidences.is_empty());
    }

    /// Test 4: Double-encoded answers are accepted end to end
    #[tokio::test]
    async fn test_double_encoded_answer() {
        let (url, _rx) = serve_once(
            "200 OK",
            r#""[{\"character\": \"l\", \"confidence\": 0.9}]""#,
        )
        .await;

        let client = PredictionClient::new(HttpService::new(url, Duration::from_secs(5)).unwrap());
        let prediction = client.predict("hel").await;
        assert_eq!(prediction.confidences.get(&KeyId::Char('L')), Some(0.9));
    }

    /// Test 5: A server that never answers times out
    #[tokio::test]
    async fn test_unresponsive_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let service =
            HttpService::new(format!("http://{}", addr), Duration::from_millis(100)).unwrap();
        match service.predict_char("hel").await {
            Err(PredictionError::Timeout { after_ms: 100 }) => {}
            other => panic!("Expected Timeout, got {:?}", other),
        }
    }

    /// Test 6: Word prediction posts the word list
    #[tokio::test]
    async fn test_predict_words_over_http() {
        let (url, request_rx) =
            serve_once("200 OK", r#"[{"word": "strawberry", "confidence": 0.7}]"#).await;

        let service = HttpService::new(format!("{}/", url), Duration::from_secs(5)).unwrap();
        let list = vec!["bus".to_string(), "strawberry".to_string()];
        let words = service.predict_words("I am going to eat a", &list).await.unwrap();
        assert_eq!(words[0].word, "strawberry");

        let request = request_rx.await.unwrap();
        assert!(request.starts_with("POST /predict-word "));
        assert!(request.contains(r#""word_list":["bus","strawberry"]"#));
    }

    /// Test 7: Unreachable servers are transport errors
    #[tokio::test]
    async fn test_unreachable_server() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let service = HttpService::new(format!("http://{}", addr), Duration::from_secs(2)).unwrap();
        assert!(matches!(
            service.predict_char("hel").await,
            Err(PredictionError::Transport(_))
        ));
    }
}
