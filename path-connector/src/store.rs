use std::future::Future;
use std::time::Duration;

use path_protocol::{
    IndexEntry, IndexResponse, PATH_CONTENT_TYPE, PathRecord, SignedUploadRequest,
    SignedUrlResponse,
};
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::ConnectorConfig;
use crate::error::ConnectorError;

/// Bounded retries with a delay growing linearly per attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

impl RetryPolicy {
    pub const fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// Pause after the `attempt`-th failure (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.delay * attempt
    }

    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, ConnectorError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ConnectorError>>,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < attempts && err.is_retryable() => {
                    let delay = self.delay_for(attempt);
                    warn!(what, attempt, ?delay, error = %err, "retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Client for the remote path store: an index endpoint, a signed-upload
/// endpoint and a public blob bucket.
#[derive(Debug, Clone)]
pub struct PathStore {
    http: reqwest::Client,
    index_url: String,
    upload_url: String,
    blob_base_url: String,
    retry: RetryPolicy,
}

impl PathStore {
    pub fn new(config: &ConnectorConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(http: reqwest::Client, config: &ConnectorConfig) -> Self {
        Self {
            http,
            index_url: config.index_url.clone(),
            upload_url: config.upload_url.clone(),
            blob_base_url: config.blob_base_url.trim_end_matches('/').to_string(),
            retry: config.retry_policy(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Public URL of a blob. Absolute keys are used as they are.
    pub fn blob_url(&self, key: &str) -> String {
        if key.starts_with("http://") || key.starts_with("https://") {
            return key.to_string();
        }
        let path = key
            .trim_start_matches('/')
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{path}", self.blob_base_url)
    }

    pub async fn fetch_index(&self) -> Result<Vec<IndexEntry>, ConnectorError> {
        let (http, url) = (&self.http, self.index_url.as_str());
        self.retry
            .run("fetch index", move || async move {
                let response: IndexResponse = get_json(http, url).await?;
                response.into_entries().map_err(ConnectorError::from)
            })
            .await
    }

    /// Every stored path, in index order.
    pub async fn fetch_others(&self) -> Result<Vec<PathRecord>, ConnectorError> {
        let entries = self.fetch_index().await?;
        debug!(count = entries.len(), "fetched path index");

        let mut records: Vec<Option<PathRecord>> = vec![None; entries.len()];
        let mut tasks = JoinSet::new();
        for (index, entry) in entries.into_iter().enumerate() {
            match entry {
                IndexEntry::Record(record) => records[index] = Some(record),
                IndexEntry::Key(key) => {
                    let http = self.http.clone();
                    let url = self.blob_url(&key);
                    let retry = self.retry;
                    tasks.spawn(async move {
                        let (http, url) = (&http, url.as_str());
                        let record = retry
                            .run("fetch path", move || get_json::<PathRecord>(http, url))
                            .await;
                        (index, record)
                    });
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            let (index, record) = joined?;
            records[index] = Some(record?);
        }

        Ok(records.into_iter().flatten().collect())
    }

    pub async fn request_upload_url(&self, record: &PathRecord) -> Result<String, ConnectorError> {
        let request = &SignedUploadRequest::for_record(record);
        let (http, url) = (&self.http, self.upload_url.as_str());
        self.retry
            .run("request upload url", move || async move {
                let response = http.post(url).json(request).send().await?;
                let response: SignedUrlResponse = read_json(url, response).await?;
                response.into_url().map_err(ConnectorError::from)
            })
            .await
    }

    pub async fn put_record(&self, url: &str, record: &PathRecord) -> Result<(), ConnectorError> {
        let body = &serde_json::to_vec(record)?;
        let http = &self.http;
        self.retry
            .run("put path", move || async move {
                let response = http
                    .put(url)
                    .header(CONTENT_TYPE, PATH_CONTENT_TYPE)
                    .body(body.clone())
                    .send()
                    .await?;
                check_status(url, response).await.map(drop)
            })
            .await
    }

    /// Ask for a signed URL, then write the record there.
    pub async fn upload(&self, record: &PathRecord) -> Result<(), ConnectorError> {
        let url = self.request_upload_url(record).await?;
        debug!(id = %record.id, "got signed upload url");
        self.put_record(&url, record).await?;
        info!(id = %record.id, points = record.coords.len(), "path uploaded");
        Ok(())
    }
}

async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: &str,
) -> Result<T, ConnectorError> {
    let response = http.get(url).send().await?;
    read_json(url, response).await
}

async fn read_json<T: DeserializeOwned>(
    url: &str,
    response: reqwest::Response,
) -> Result<T, ConnectorError> {
    let response = check_status(url, response).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn check_status(
    url: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ConnectorError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ConnectorError::Status {
        url: url.to_string(),
        status: status.as_u16(),
        body,
    })
}
