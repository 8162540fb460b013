//! Filer server operations: path-addressed files, directory listings and
//! `Seaweed-` tags.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use futures::TryStreamExt;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, Response, StatusCode};
use seaweed_core::models::{
    DeleteOptions, FilerEntry, ListOptions, ListResponse, UploadOptions, UploadResult,
};
use seaweed_core::validation::{is_valid_tag_key, validate_tag_keys};
use seaweed_core::{FilerConfig, WeedError, WeedResult};
use std::collections::BTreeMap;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::listing::{self, EntryPages, ListingCursor};
use crate::transport::Transport;

/// Characters left as-is in a path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Client for a SeaweedFS filer.
#[derive(Clone, Debug)]
pub struct FilerClient {
    transport: Transport,
    filer_url: String,
}

impl FilerClient {
    pub fn new(config: FilerConfig) -> WeedResult<Self> {
        config.validate()?;
        let transport = Transport::new(config.server())?;
        Ok(Self {
            transport,
            filer_url: config.server().base_url(),
        })
    }

    /// Create a client from SEAWEED_FILER_* environment variables.
    pub fn from_env() -> WeedResult<Self> {
        Self::new(FilerConfig::from_env()?)
    }

    pub fn filer_url(&self) -> &str {
        &self.filer_url
    }

    /// A handle whose requests fail with [`WeedError::Cancelled`] once
    /// `token` is cancelled.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            transport: self.transport.with_cancellation(token),
            filer_url: self.filer_url.clone(),
        }
    }

    /// URL of a file path, each segment percent-encoded.
    fn path_url(&self, path: &str) -> String {
        format!("{}/{}", self.filer_url, encode_path(path))
    }

    /// URL of a directory path; the filer lists directories only with a
    /// trailing slash.
    fn dir_url(&self, path: &str) -> String {
        let encoded = encode_path(path);
        if encoded.is_empty() {
            format!("{}/", self.filer_url)
        } else {
            format!("{}/{}/", self.filer_url, encoded)
        }
    }

    /// Upload `data` to `path` with a multipart POST.
    #[tracing::instrument(skip(self, data, options))]
    pub async fn upload(
        &self,
        path: &str,
        data: impl Into<Bytes>,
        filename: &str,
        options: &UploadOptions,
    ) -> WeedResult<UploadResult> {
        self.send_file(Method::POST, path, data.into(), filename, options)
            .await
    }

    /// Upload `data` to `path` with a multipart PUT.
    #[tracing::instrument(skip(self, data, options))]
    pub async fn put(
        &self,
        path: &str,
        data: impl Into<Bytes>,
        filename: &str,
        options: &UploadOptions,
    ) -> WeedResult<UploadResult> {
        self.send_file(Method::PUT, path, data.into(), filename, options)
            .await
    }

    /// File content. With `attachment` the filer answers with an attachment
    /// content disposition.
    pub async fn get_file(&self, path: &str, attachment: bool) -> WeedResult<Bytes> {
        let mut request = self.transport.client().get(self.path_url(path));
        if attachment {
            request = request.query(&[("response-content-disposition", "attachment")]);
        }

        let response = self.transport.send(request).await?;
        let response = self.check_found(path, response).await?;
        self.transport.bytes(response).await
    }

    pub async fn get_metadata(&self, path: &str) -> WeedResult<FilerEntry> {
        let request = self
            .transport
            .client()
            .get(self.path_url(path))
            .header(ACCEPT, "application/json")
            .query(&[("metadata", "true")]);

        let response = self.transport.send(request).await?;
        let response = self.check_found(path, response).await?;
        self.transport.json(response).await
    }

    /// Move (rename) a file or directory.
    #[tracing::instrument(skip(self))]
    pub async fn move_entry(&self, from: &str, to: &str) -> WeedResult<()> {
        let from_path = format!("/{}", from.trim_start_matches('/'));
        let request = self
            .transport
            .client()
            .post(self.path_url(to))
            .query(&[("mv.from", from_path.as_str())]);

        let response = self.transport.send(request).await?;
        self.check_found(from, response).await?;

        info!(from = %from, to = %to, "Filer entry moved");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_entry(&self, path: &str, options: &DeleteOptions) -> WeedResult<()> {
        let request = self
            .transport
            .client()
            .delete(self.path_url(path))
            .query(options);

        let response = self.transport.send(request).await?;
        self.check_found(path, response).await?;

        info!(path = %path, "Filer entry deleted");
        Ok(())
    }

    /// Set `Seaweed-` tags on a file.
    ///
    /// Every key is checked before anything is sent; a single bad key fails
    /// the whole call with [`WeedError::InvalidTag`] listing all bad keys.
    pub async fn set_tags<I, K, V>(&self, path: &str, tags: I) -> WeedResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let tags: Vec<(K, V)> = tags.into_iter().collect();
        validate_tag_keys(tags.iter().map(|(key, _)| key.as_ref()))?;

        let mut headers = HeaderMap::with_capacity(tags.len());
        for (key, value) in &tags {
            let (key, value) = (key.as_ref(), value.as_ref());
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|_| {
                WeedError::InvalidInput(format!("tag name '{}' is not a valid header name", key))
            })?;
            let value = HeaderValue::from_str(value).map_err(|_| {
                WeedError::InvalidInput(format!("value of tag '{}' is not a valid header value", key))
            })?;
            // Header names are case-insensitive; two such keys would collapse into one.
            if headers.contains_key(&name) {
                return Err(WeedError::InvalidInput(format!(
                    "tag '{}' repeats another key differing only in case",
                    key
                )));
            }
            headers.insert(name, value);
        }

        let url = format!("{}?tagging", self.path_url(path));
        let request = self.transport.client().put(url).headers(headers);
        let response = self.transport.send(request).await?;
        self.check_found(path, response).await?;

        debug!(path = %path, count = tags.len(), "Tags set");
        Ok(())
    }

    /// Remove the named tags from a file, or every `Seaweed-` tag when
    /// `names` is empty.
    pub async fn remove_tags<S: AsRef<str>>(&self, path: &str, names: &[S]) -> WeedResult<()> {
        validate_tag_keys(names.iter().map(|name| name.as_ref()))?;

        let request = if names.is_empty() {
            let url = format!("{}?tagging", self.path_url(path));
            self.transport.client().delete(url)
        } else {
            let joined = names
                .iter()
                .map(|name| name.as_ref())
                .collect::<Vec<_>>()
                .join(",");
            self.transport
                .client()
                .delete(self.path_url(path))
                .query(&[("tagging", joined)])
        };

        let response = self.transport.send(request).await?;
        self.check_found(path, response).await?;

        debug!(path = %path, count = names.len(), "Tags removed");
        Ok(())
    }

    /// `Seaweed-` tags currently set on a file, values decoded.
    pub async fn get_tags(&self, path: &str) -> WeedResult<BTreeMap<String, String>> {
        let entry = self.get_metadata(path).await?;
        Ok(seaweed_tags(&entry))
    }

    /// Lazily page through a directory. No request is sent until the stream
    /// is polled; an invalid limit fails here.
    pub fn list_entries(&self, path: &str, options: ListOptions) -> WeedResult<EntryPages> {
        let cursor = ListingCursor::new(path, options)?;
        Ok(listing::pages(self.clone(), cursor))
    }

    /// Every entry of a directory, across all pages.
    #[tracing::instrument(skip(self, options))]
    pub async fn list_files(&self, path: &str, options: ListOptions) -> WeedResult<Vec<FilerEntry>> {
        let start = Instant::now();
        let pages: Vec<Vec<FilerEntry>> = self.list_entries(path, options)?.try_collect().await?;
        let page_count = pages.len();
        let entries: Vec<FilerEntry> = pages.into_iter().flatten().collect();

        debug!(
            path = %path,
            pages = page_count,
            entries = entries.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Directory listed"
        );
        Ok(entries)
    }

    pub(crate) async fn list_page(&self, cursor: &ListingCursor) -> WeedResult<ListResponse> {
        let request = self
            .transport
            .client()
            .get(self.dir_url(&cursor.path))
            .header(ACCEPT, "application/json")
            .query(&cursor.query());

        let response = self.transport.send(request).await?;
        let response = self.check_found(&cursor.path, response).await?;
        self.transport.json(response).await
    }

    async fn send_file(
        &self,
        method: Method,
        path: &str,
        data: Bytes,
        filename: &str,
        options: &UploadOptions,
    ) -> WeedResult<UploadResult> {
        let start = Instant::now();
        let size = data.len();
        let part = Part::stream_with_length(data, size as u64).file_name(filename.to_string());
        let form = Form::new().part("file", part);

        let request = self
            .transport
            .client()
            .request(method, self.path_url(path))
            .query(options)
            .multipart(form);

        let response = self.transport.send(request).await?;
        let response = self.transport.error_for_status(response).await?;
        let result: UploadResult = self.transport.json(response).await?;

        info!(
            path = %path,
            size = result.size,
            duration_ms = start.elapsed().as_millis() as u64,
            "File uploaded to filer"
        );
        Ok(result)
    }

    /// Map 404 to `NoFileFound(path)`, other failures to `TransferFailed`.
    async fn check_found(&self, path: &str, response: Response) -> WeedResult<Response> {
        if response.status() == StatusCode::NOT_FOUND {
            return Err(WeedError::NoFileFound(path.to_string()));
        }
        self.transport.error_for_status(response).await
    }
}

/// `Seaweed-` entries of the extended attributes. The filer stores values
/// base64 encoded; values that do not decode are kept as stored.
fn seaweed_tags(entry: &FilerEntry) -> BTreeMap<String, String> {
    entry
        .attributes()
        .extended
        .iter()
        .flatten()
        .filter(|(key, _)| is_valid_tag_key(key))
        .map(|(key, value)| {
            let decoded = STANDARD
                .decode(value)
                .map(|raw| String::from_utf8_lossy(&raw).into_owned())
                .unwrap_or_else(|_| value.clone());
            (key.clone(), decoded)
        })
        .collect()
}

fn encode_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}
