//! Link target fetching
//!
//! A single GET per link. Whatever happens is written onto the link's
//! annotation: transport failures and error statuses become `ERROR` /
//! `HTTP_ERROR` with a message, a received response always leaves its status,
//! headers and charset behind, and only a 200 body is classified.

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::model::{Annotation, WebLink};
use crate::sniff;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use regex::bytes::Regex;
use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// How many leading bytes are scanned for an in-document charset declaration
const CHARSET_SNIFF_BYTES: usize = 1024;

/// A received response, with the body already decoded
#[derive(Debug, Clone)]
pub struct LinkResponse {
    /// HTTP status code
    pub status: u16,
    /// Final URL after redirects
    pub url: Url,
    /// Response headers, multi-valued headers joined with `", "`
    pub headers: BTreeMap<String, String>,
    /// Declared or detected charset
    pub encoding: String,
    /// Decoded body
    pub text: String,
}

/// HTTP client for checking link targets
#[derive(Debug, Clone)]
pub struct LinkFetcher {
    http: Client,
    config: FetchConfig,
}

impl LinkFetcher {
    /// Build a fetcher from explicit settings
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(Policy::limited(config.max_redirects))
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Settings this fetcher was built with
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch the link target and annotate the link with the outcome.
    ///
    /// Any previous annotation is replaced. The response is returned only
    /// when the request succeeded with a non-error status.
    #[instrument(skip(self, link), fields(uri = %link.uri))]
    pub async fn get_weblink_response(
        &self,
        mut link: WebLink,
    ) -> (WebLink, Option<LinkResponse>) {
        let mut annotation = Annotation::now();

        let outcome = self.fetch(&link.uri).await;
        let response = match outcome {
            Ok(response) => response,
            Err((err, received)) => {
                warn!(error = %err, "link check failed");
                annotation.content_type = err.content_kind();
                annotation.error_message = Some(err.to_string());
                if let Some(received) = received {
                    record_response(&mut annotation, &received);
                }
                link.annotation = Some(annotation);
                return (link, None);
            }
        };

        record_response(&mut annotation, &response);

        if response.status == StatusCode::OK.as_u16() {
            annotation.content_type = sniff::classify(&response.text);
            info!(status = response.status, kind = %annotation.content_type, "link checked");
        } else {
            info!(status = response.status, "link checked, not classified");
        }

        link.annotation = Some(annotation);
        (link, Some(response))
    }

    // Error statuses still carry the decoded response so the caller can
    // record what was received.
    async fn fetch(
        &self,
        uri: &str,
    ) -> Result<LinkResponse, (FetchError, Option<LinkResponse>)> {
        let request = self
            .http
            .get(uri)
            .header(ACCEPT, self.config.accept.as_str());
        let response = request
            .send()
            .await
            .map_err(|e| (FetchError::Transport(describe(&e)), None))?;

        let status = response.status();
        let final_url = response.url().clone();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| (FetchError::Transport(describe(&e)), None))?;

        let (encoding, text) = decode_body(&headers, &body);
        debug!(status = status.as_u16(), bytes = body.len(), %encoding, "response received");

        let received = LinkResponse {
            status: status.as_u16(),
            url: final_url,
            headers: header_map(&headers),
            encoding,
            text,
        };

        if status.is_client_error() || status.is_server_error() {
            let err = FetchError::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                url: received.url.to_string(),
            };
            return Err((err, Some(received)));
        }

        Ok(received)
    }
}

fn record_response(annotation: &mut Annotation, response: &LinkResponse) {
    annotation.status_code = Some(response.status);
    annotation.headers = Some(response.headers.clone());
    annotation.encoding = Some(response.encoding.clone());
}

// reqwest's Display stops at the outermost layer; the source chain carries
// the useful part (connection refused, dns error, ...).
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers.iter() {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        map.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    map
}

/// Decode a body, returning the charset label used and the text
pub fn decode_body(headers: &HeaderMap, body: &[u8]) -> (String, String) {
    if let Some(label) = declared_charset(headers) {
        if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
            let (text, _, _) = encoding.decode(body);
            return (label, text.into_owned());
        }
    }
    let encoding = detect_charset(body);
    let (text, _, _) = encoding.decode(body);
    (encoding.name().to_string(), text.into_owned())
}

/// `charset` parameter of the `Content-Type` header
pub fn declared_charset(headers: &HeaderMap) -> Option<String> {
    let content_type = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    })
}

/// Charset from BOM, in-document declaration, or UTF-8 validity
pub fn detect_charset(body: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(body) {
        return encoding;
    }
    let head = &body[..body.len().min(CHARSET_SNIFF_BYTES)];
    if let Some(encoding) = charset_decl_re()
        .captures(head)
        .and_then(|caps| caps.get(1))
        .and_then(|m| Encoding::for_label(m.as_bytes()))
    {
        return encoding;
    }
    if std::str::from_utf8(body).is_ok() {
        UTF_8
    } else {
        WINDOWS_1252
    }
}

fn charset_decl_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)(?:<meta[^>]+charset\s*=\s*["']?|<\?xml[^>]+encoding\s*=\s*["'])([A-Za-z0-9._:-]+)"#)
            .expect("static pattern compiles")
    })
}
