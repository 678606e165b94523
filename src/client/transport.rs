use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;

use crate::error::{AppError, Result};
use crate::sse::StreamFrame;

use super::sse::SseLineParser;

pub type FrameStream = BoxStream<'static, Result<StreamFrame>>;

/// How the live client reaches the gateway. The production implementation
/// speaks HTTP; tests script the stream.
#[async_trait]
pub trait StreamTransport: Send + Sync {
    async fn open(&self, token: &str) -> Result<FrameStream>;
}

pub struct HttpStreamTransport {
    client: reqwest::Client,
    stream_url: String,
}

impl HttpStreamTransport {
    /// `stream_url` is the full endpoint, e.g.
    /// `https://api.example.com/api/notifications/stream`.
    pub fn new(stream_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            stream_url: stream_url.into(),
        }
    }
}

#[async_trait]
impl StreamTransport for HttpStreamTransport {
    async fn open(&self, token: &str) -> Result<FrameStream> {
        let response = self
            .client
            .get(&self.stream_url)
            .query(&[("token", token)])
            .header("accept", "text/event-stream")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Stream(format!(
                "stream request failed with status {}",
                response.status()
            )));
        }

        let mut bytes = response.bytes_stream();
        let stream = async_stream::stream! {
            let mut parser = SseLineParser::default();
            while let Some(chunk) = bytes.next().await {
                match chunk {
                    Ok(chunk) => {
                        for payload in parser.push_chunk(&chunk) {
                            // Decoded exhaustively: an unknown frame type is
                            // surfaced, not dropped.
                            match serde_json::from_str::<StreamFrame>(&payload) {
                                Ok(frame) => yield Ok(frame),
                                Err(e) => {
                                    yield Err(AppError::Stream(format!("undecodable frame: {e}")))
                                }
                            }
                        }
                    }
                    Err(e) => {
                        yield Err(AppError::Http(e));
                        break;
                    }
                }
            }
        };

        Ok(stream.boxed())
    }
}
