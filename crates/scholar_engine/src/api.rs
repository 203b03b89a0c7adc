use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use scholar_core::{JobRequest, JobStatistics, SubmissionOutcome};
use scholar_logging::{scholar_debug, scholar_info, scholar_warn};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::decode::decode_body;
use crate::extract::extract_summary;
use crate::filename::safe_filename;
use crate::persist::AtomicFileWriter;
use crate::types::map_reqwest_error;
use crate::{ClientSettings, FailureKind, RequestError};

/// Typed response of the job endpoint when it answers with JSON.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JsonSubmitResponse {
    summary: Option<String>,
    statistics: Option<JobStatistics>,
}

/// Request/response side of the server: job submission and result download.
#[async_trait::async_trait]
pub trait ScholarApi: Send + Sync {
    /// Posts the job and waits for its summary. Resolves to
    /// `FailureKind::Cancelled` once `cancel` fires.
    async fn submit(
        &self,
        request: &JobRequest,
        cancel: CancellationToken,
    ) -> Result<SubmissionOutcome, RequestError>;

    /// Fetches the result file and saves it locally, returning its path.
    async fn download(&self) -> Result<PathBuf, RequestError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    client: reqwest::Client,
    submit_url: Url,
    download_url: Url,
    max_download_bytes: u64,
    output_dir: PathBuf,
    download_filename: String,
}

impl ReqwestApi {
    pub fn new(settings: &ClientSettings) -> Result<Self, RequestError> {
        Ok(Self {
            client: settings.build_request_client()?,
            submit_url: settings.submit_url(),
            download_url: settings.download_url()?,
            max_download_bytes: settings.max_download_bytes,
            output_dir: settings.output_dir.clone(),
            download_filename: safe_filename(&settings.download_filename),
        })
    }

    async fn post_job(&self, request: &JobRequest) -> Result<SubmissionOutcome, RequestError> {
        let response = self
            .client
            .post(self.submit_url.clone())
            .form(&request.form_fields())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let content_type = content_type_of(&response);
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        scholar_debug!(
            "Submission response: {} bytes, content type {:?}",
            body.len(),
            content_type
        );

        if content_type.as_deref().is_some_and(is_json) {
            let parsed: JsonSubmitResponse = serde_json::from_slice(&body)
                .map_err(|err| RequestError::new(FailureKind::Decode, err.to_string()))?;
            return Ok(SubmissionOutcome {
                summary: parsed.summary,
                statistics: parsed.statistics,
            });
        }

        let decoded = decode_body(&body, content_type.as_deref());
        if decoded.had_errors {
            scholar_warn!(
                "Submission response is not valid {}; malformed bytes replaced",
                decoded.encoding_label
            );
        }
        Ok(SubmissionOutcome {
            summary: extract_summary(&decoded.text),
            statistics: None,
        })
    }

    async fn fetch_result(&self) -> Result<Vec<u8>, RequestError> {
        let response = self
            .client
            .get(self.download_url.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        // The server answers with its HTML page when the file is missing.
        if let Some(ct) = content_type_of(&response) {
            if media_type(&ct).eq_ignore_ascii_case("text/html") {
                return Err(RequestError::new(
                    FailureKind::UnsupportedContentType { content_type: ct },
                    "expected a result file",
                ));
            }
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.max_download_bytes {
                return Err(too_large(self.max_download_bytes, content_len));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.max_download_bytes {
                return Err(too_large(self.max_download_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl ScholarApi for ReqwestApi {
    async fn submit(
        &self,
        request: &JobRequest,
        cancel: CancellationToken,
    ) -> Result<SubmissionOutcome, RequestError> {
        tokio::select! {
            _ = cancel.cancelled() => {
                Err(RequestError::new(FailureKind::Cancelled, "submission superseded"))
            }
            result = self.post_job(request) => result,
        }
    }

    async fn download(&self) -> Result<PathBuf, RequestError> {
        let bytes = self.fetch_result().await?;
        let path = save(&self.output_dir, &self.download_filename, &bytes)?;
        scholar_info!("Saved {} bytes to {:?}", bytes.len(), path);
        Ok(path)
    }
}

fn save(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, RequestError> {
    AtomicFileWriter::new(dir.to_path_buf())
        .write(filename, bytes)
        .map_err(|err| RequestError::new(FailureKind::Persist, err.to_string()))
}

fn content_type_of(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

fn media_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
}

fn is_json(content_type: &str) -> bool {
    let media = media_type(content_type).to_ascii_lowercase();
    media == "application/json" || media.ends_with("+json")
}

fn too_large(max_bytes: u64, actual: u64) -> RequestError {
    RequestError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "result file too large",
    )
}
