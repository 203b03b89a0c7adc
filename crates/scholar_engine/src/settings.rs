use std::path::PathBuf;
use std::time::Duration;

use scholar_core::DEFAULT_RESULT_FILENAME;
use url::Url;

use crate::{FailureKind, RequestError};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/";

const PROGRESS_PATH: &str = "progress";
const DOWNLOAD_PATH: &str = "download";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Server root; the job is posted here and the other endpoints are resolved against it.
    pub base_url: Url,
    pub connect_timeout: Duration,
    /// Whole-request timeout for submission and download. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
    pub max_download_bytes: u64,
    pub output_dir: PathBuf,
    pub download_filename: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            max_download_bytes: 256 * 1024 * 1024,
            output_dir: PathBuf::from("."),
            download_filename: DEFAULT_RESULT_FILENAME.to_string(),
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base url parses")
}

impl ClientSettings {
    pub fn submit_url(&self) -> Url {
        self.base_url.clone()
    }

    pub fn progress_url(&self) -> Result<Url, RequestError> {
        self.endpoint(PROGRESS_PATH)
    }

    pub fn download_url(&self) -> Result<Url, RequestError> {
        self.endpoint(DOWNLOAD_PATH)
    }

    fn endpoint(&self, path: &str) -> Result<Url, RequestError> {
        self.base_url
            .join(path)
            .map_err(|err| RequestError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    /// Client for bounded request/response exchanges.
    pub(crate) fn build_request_client(&self) -> Result<reqwest::Client, RequestError> {
        let mut builder = reqwest::Client::builder().connect_timeout(self.connect_timeout);
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|err| RequestError::new(FailureKind::Network, err.to_string()))
    }

    /// Client for the long-lived progress stream; never applies a whole-request timeout.
    pub(crate) fn build_stream_client(&self) -> Result<reqwest::Client, RequestError> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .build()
            .map_err(|err| RequestError::new(FailureKind::Network, err.to_string()))
    }
}
