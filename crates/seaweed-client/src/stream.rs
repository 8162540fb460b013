//! Streamed object content.

use bytes::Bytes;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use reqwest::Response;
use seaweed_core::{WeedError, WeedResult};
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::transport::Transport;

/// Chunks of one object's content, read lazily from an open response.
///
/// Each chunk read is bounded by the request timeout and aborted by the
/// client's cancellation token. The stream cannot be restarted; the
/// connection is released when it ends, fails or is dropped.
pub struct FileStream {
    inner: BoxStream<'static, WeedResult<Bytes>>,
    content_length: Option<u64>,
}

impl FileStream {
    pub(crate) fn new(response: Response, transport: Transport, fid: String) -> Self {
        let content_length = response.content_length();

        let inner = stream::try_unfold(response, move |mut response| {
            let transport = transport.clone();
            let fid = fid.clone();
            async move {
                let chunk = transport
                    .guard(async {
                        response.chunk().await.map_err(|e| {
                            WeedError::transfer_with(format!("Failed to read {}", fid), e)
                        })
                    })
                    .await?;

                match chunk {
                    Some(chunk) => Ok::<_, WeedError>(Some((chunk, response))),
                    None => {
                        tracing::debug!(fid = %fid, "Object stream finished");
                        Ok(None)
                    }
                }
            }
        })
        .boxed();

        Self {
            inner,
            content_length,
        }
    }

    /// Size announced by the volume server, if any.
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }
}

impl Stream for FileStream {
    type Item = WeedResult<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl std::fmt::Debug for FileStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStream")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}
