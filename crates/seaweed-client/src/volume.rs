//! Object transfers against volume servers.

use bytes::Bytes;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use seaweed_core::models::{AssignResult, DeleteResult, WriteResult};
use seaweed_core::{parse_volume_id, WeedError, WeedResult};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::stream::FileStream;
use crate::SeaweedClient;

/// Characters of a file id kept verbatim in a volume server URL.
const FID_CHARS: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b',')
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~');

/// Identifies a stored object and, optionally, where to find it.
///
/// Without a `volume_url` the volume server is resolved through the master
/// for each call. `public` picks the location's public address instead of
/// its internal one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLocator {
    pub fid: String,
    pub volume_url: Option<String>,
    pub public: bool,
}

impl FileLocator {
    pub fn new(fid: impl Into<String>) -> Self {
        Self {
            fid: fid.into(),
            volume_url: None,
            public: false,
        }
    }

    /// Use this volume server (`host:port` or a full URL) and skip the master.
    pub fn with_volume_url(mut self, volume_url: impl Into<String>) -> Self {
        self.volume_url = Some(volume_url.into());
        self
    }

    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }
}

impl From<&str> for FileLocator {
    fn from(fid: &str) -> Self {
        FileLocator::new(fid)
    }
}

impl From<String> for FileLocator {
    fn from(fid: String) -> Self {
        FileLocator::new(fid)
    }
}

impl From<&AssignResult> for FileLocator {
    fn from(assigned: &AssignResult) -> Self {
        FileLocator::new(assigned.fid.clone()).with_volume_url(assigned.url.clone())
    }
}

impl SeaweedClient {
    /// Volume server for `locator`: the explicit URL when given, otherwise
    /// the first location the master reports.
    async fn volume_url(&self, locator: &FileLocator) -> WeedResult<String> {
        let volume_id = parse_volume_id(&locator.fid)?;

        if let Some(url) = &locator.volume_url {
            debug!(fid = %locator.fid, volume_url = %url, "Using supplied volume location");
            return Ok(url.clone());
        }

        let location = self
            .resolve(volume_id)
            .await?
            .into_iter()
            .next()
            .ok_or(WeedError::NoVolumeServerFound(volume_id))?;

        Ok(if locator.public {
            location.public_url
        } else {
            location.url
        })
    }

    fn object_url(&self, volume_url: &str, fid: &str) -> String {
        let fid = utf8_percent_encode(fid, FID_CHARS).to_string();
        self.transport.server_url(volume_url, &fid)
    }

    /// Upload `data` under an assigned `fid` to the volume server at `volume_url`.
    #[tracing::instrument(skip(self, data), fields(size = tracing::field::Empty))]
    pub async fn write(
        &self,
        fid: &str,
        volume_url: &str,
        data: impl Into<Bytes>,
        filename: &str,
    ) -> WeedResult<WriteResult> {
        parse_volume_id(fid)?;
        let data = data.into();
        tracing::Span::current().record("size", data.len());
        self.upload(fid, volume_url, data, filename).await
    }

    /// Replace the content stored under `locator.fid`.
    #[tracing::instrument(skip(self, data), fields(fid = %locator.fid))]
    pub async fn update(
        &self,
        locator: &FileLocator,
        data: impl Into<Bytes>,
        filename: &str,
    ) -> WeedResult<WriteResult> {
        let volume_url = self.volume_url(locator).await?;
        self.upload(&locator.fid, &volume_url, data.into(), filename)
            .await
    }

    #[tracing::instrument(skip(self), fields(fid = %locator.fid))]
    pub async fn delete(&self, locator: &FileLocator) -> WeedResult<DeleteResult> {
        let volume_url = self.volume_url(locator).await?;
        let url = self.object_url(&volume_url, &locator.fid);

        let response = self
            .transport
            .send(self.transport.client().delete(&url))
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(WeedError::NoFileFound(locator.fid.clone()));
        }
        let response = self.transport.error_for_status(response).await?;
        let body = self.transport.bytes(response).await?;

        let result = parse_delete_body(&locator.fid, &body)?;
        info!(fid = %locator.fid, size = result.size, "Object deleted");
        Ok(result)
    }

    /// Whole object content, buffered in memory.
    #[tracing::instrument(skip(self), fields(fid = %locator.fid))]
    pub async fn get(&self, locator: &FileLocator) -> WeedResult<Bytes> {
        let response = self.open(locator).await?;
        let bytes = self.transport.bytes(response).await?;
        debug!(fid = %locator.fid, size = bytes.len(), "Object downloaded");
        Ok(bytes)
    }

    /// Object content as a stream of chunks.
    ///
    /// A missing object fails here, before the stream exists. The stream
    /// holds the connection until it ends or is dropped.
    #[tracing::instrument(skip(self), fields(fid = %locator.fid))]
    pub async fn get_stream(&self, locator: &FileLocator) -> WeedResult<FileStream> {
        let response = self.open(locator).await?;
        Ok(FileStream::new(
            response,
            self.transport.clone(),
            locator.fid.clone(),
        ))
    }

    async fn open(&self, locator: &FileLocator) -> WeedResult<Response> {
        let volume_url = self.volume_url(locator).await?;
        let url = self.object_url(&volume_url, &locator.fid);

        let response = self.transport.send(self.transport.client().get(&url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(fid = %locator.fid, url = %url, "Object not found");
            return Err(WeedError::NoFileFound(locator.fid.clone()));
        }
        self.transport.error_for_status(response).await
    }

    async fn upload(
        &self,
        fid: &str,
        volume_url: &str,
        data: Bytes,
        filename: &str,
    ) -> WeedResult<WriteResult> {
        let start = Instant::now();
        let url = self.object_url(volume_url, fid);
        let size = data.len();

        let part = Part::stream_with_length(data, size as u64).file_name(filename.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .transport
            .send(self.transport.client().post(&url).multipart(form))
            .await?;
        let response = match self.transport.error_for_status(response).await {
            Ok(response) => response,
            Err(e) => {
                error!(fid = %fid, url = %url, error = %e, "Upload to volume server failed");
                return Err(e);
            }
        };
        let result: WriteResult = self.transport.json(response).await?;

        info!(
            fid = %fid,
            size = result.size,
            duration_ms = start.elapsed().as_millis() as u64,
            "Object written"
        );
        Ok(result)
    }
}

/// A successful delete must answer with a `{size}` object. An empty or falsy
/// body means the volume server did not remove anything.
fn parse_delete_body(fid: &str, body: &[u8]) -> WeedResult<DeleteResult> {
    let value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(body).map_err(|e| {
            WeedError::transfer_with(format!("Invalid delete response for {}", fid), e)
        })?
    };

    if is_falsy(&value) {
        return Err(WeedError::DeleteFailed(fid.to_string()));
    }

    serde_json::from_value(value)
        .map_err(|e| WeedError::transfer_with(format!("Invalid delete response for {}", fid), e))
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
