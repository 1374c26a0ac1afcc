//! Page metadata extraction: validate a URL, fetch it once, and resolve
//! title/description/image through ordered fallbacks.
//!
//! Fetch and parse failures never escape [`MetadataExtractor::extract`]; the
//! caller gets a degraded but fully populated record instead. Only a URL that
//! fails the syntax check is reported as an error.

pub mod parse;
pub mod validate;

use std::time::Duration;

use encoding_rs::{Encoding, UTF_8};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client as ReqwestClient;

use crate::config::{
    DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MAX_DESCRIPTION_LEN, DEFAULT_PLACEHOLDER_IMAGE_URL,
};
use crate::error::{ExtractFailure, FetchError, ValidationError};
use crate::models::{ExtractionStatus, LinkMetadata};

pub use self::parse::{degraded_metadata, parse_metadata};
pub use self::validate::{is_valid_url, ValidatedUrl};

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
pub const MAX_DOCUMENT_BYTES: usize = 512 * 1024;

#[derive(Clone, Debug)]
pub struct ExtractorSettings {
    pub timeout: Duration,
    pub user_agent: String,
    pub max_description_len: usize,
    pub placeholder_image_url: String,
    pub max_document_bytes: usize,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        ExtractorSettings {
            timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            user_agent: USER_AGENT.to_string(),
            max_description_len: DEFAULT_MAX_DESCRIPTION_LEN,
            placeholder_image_url: DEFAULT_PLACEHOLDER_IMAGE_URL.to_string(),
            max_document_bytes: MAX_DOCUMENT_BYTES,
        }
    }
}

/// Outcome of a single extraction. `failure` is set when `metadata` is the
/// degraded placeholder rather than data read from the page.
#[derive(Debug)]
pub struct Extraction {
    pub url: ValidatedUrl,
    pub metadata: LinkMetadata,
    pub failure: Option<ExtractFailure>,
}

impl Extraction {
    pub fn is_degraded(&self) -> bool {
        self.failure.is_some()
    }

    pub fn status(&self) -> ExtractionStatus {
        match self.failure {
            None => ExtractionStatus::Complete,
            Some(ExtractFailure::Fetch(_)) => ExtractionStatus::FetchFailed,
            Some(ExtractFailure::Parse(_)) => ExtractionStatus::ParseFailed,
        }
    }
}

pub struct MetadataExtractor {
    client: ReqwestClient,
    settings: ExtractorSettings,
}

impl MetadataExtractor {
    pub fn new(settings: ExtractorSettings) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.5"),
        );

        let client = ReqwestClient::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(MetadataExtractor { client, settings })
    }

    /// Validate `raw` and extract its metadata. A malformed URL is rejected
    /// before any request is made.
    pub async fn extract(&self, raw: &str) -> Result<Extraction, ValidationError> {
        let url = ValidatedUrl::parse(raw)?;
        Ok(self.extract_validated(url).await)
    }

    pub async fn extract_validated(&self, url: ValidatedUrl) -> Extraction {
        match self.fetch_document(&url).await {
            Ok(html) => {
                let metadata = parse_metadata(&html, url.as_str(), &self.settings);
                tracing::debug!(url = %url, title = %metadata.title, "Extracted link metadata");
                Extraction {
                    url,
                    metadata,
                    failure: None,
                }
            }
            Err(failure) => {
                tracing::warn!(url = %url, error = %failure, "Link metadata extraction degraded");
                Extraction {
                    metadata: degraded_metadata(url.as_str(), &self.settings),
                    url,
                    failure: Some(failure),
                }
            }
        }
    }

    async fn fetch_document(&self, url: &ValidatedUrl) -> Result<String, ExtractFailure> {
        let mut response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(FetchError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()).into());
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        if let Some(content_type) = content_type.as_deref() {
            if !is_document_type(content_type) {
                return Err(ExtractFailure::Parse(format!(
                    "unsupported content type {content_type}"
                )));
            }
        }

        let limit = self.settings.max_document_bytes;
        let too_large = || ExtractFailure::Parse(format!("document larger than {limit} bytes"));
        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(too_large());
        }

        // Content-Length may be absent or wrong; enforce the cap while reading.
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(body_error)? {
            if body.len() + chunk.len() > limit {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }

        Ok(decode_body(&body, content_type.as_deref()))
    }
}

fn body_error(e: reqwest::Error) -> ExtractFailure {
    if e.is_timeout() {
        ExtractFailure::Fetch(FetchError::Timeout)
    } else {
        ExtractFailure::Parse(format!("unreadable body: {e}"))
    }
}

/// Decode with the `charset` declared in `Content-Type`, falling back to
/// UTF-8. A byte-order mark overrides the declared charset.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_label)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(body);
    text.into_owned()
}

fn charset_label(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

/// HTML and XHTML, plus the generic text and XML types some servers send
/// for pages.
fn is_document_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime.is_empty()
        || mime.starts_with("text/")
        || mime == "application/xhtml+xml"
        || mime == "application/xml"
}
