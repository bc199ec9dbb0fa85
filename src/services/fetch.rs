use std::collections::HashMap;
use std::{thread, time::Duration};

use rand::{thread_rng, Rng};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::MappingError;
use crate::model::row::MappingElement;
use crate::parsers::mapping_response;
use crate::services::encoding;

const MAX_RETRIES: usize = 3;
const BASE_DELAY_MS: u64 = 200;
const MAPPING_FOR: &str = "mappingFor";
const AJAX_PATH: &str = "ajax.html";

/// Supplies the VCS path mappings of a build configuration.
pub trait MappingSource {
    fn fetch_mappings(&self, build_type_id: &str) -> Result<Vec<MappingElement>, MappingError>;
}

/// Mappings known up front, keyed by build configuration id.
#[derive(Debug, Default, Clone)]
pub struct StaticMappingSource {
    mappings: HashMap<String, Vec<MappingElement>>,
}

impl StaticMappingSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, build_type_id: impl Into<String>, mappings: Vec<MappingElement>) -> Self {
        self.mappings.insert(build_type_id.into(), mappings);
        self
    }
}

impl MappingSource for StaticMappingSource {
    fn fetch_mappings(&self, build_type_id: &str) -> Result<Vec<MappingElement>, MappingError> {
        Ok(self.mappings.get(build_type_id).cloned().unwrap_or_default())
    }
}

/// Asks the build server's ajax controller for the mapping of a build type.
pub struct HttpMappingSource {
    client: Client,
    endpoint: Url,
}

impl HttpMappingSource {
    pub fn new(cfg: &AppConfig) -> Result<Self, MappingError> {
        let client = Client::builder().timeout(cfg.timeout()).build()?;
        let endpoint = endpoint_for(&cfg.server_url)?;
        Ok(HttpMappingSource { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request_once(&self, build_type_id: &str) -> Result<Vec<MappingElement>, Attempt> {
        let resp = self
            .client
            .get(self.endpoint.clone())
            .query(&[(MAPPING_FOR, build_type_id)])
            .send()
            .map_err(|e| Attempt::retry(e.into()))?;

        let status = resp.status();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = resp.bytes().map_err(|e| Attempt::retry(e.into()))?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes);
            let err = MappingError::Status {
                status: status.as_u16(),
                snippet: snippet(&body),
            };
            return Err(if should_retry_http(status) {
                Attempt::retry(err)
            } else {
                Attempt::fatal(err)
            });
        }

        let decoded = encoding::decode_body(&bytes, content_type.as_deref());
        mapping_response::parse(&decoded.text).map_err(Attempt::fatal)
    }
}

impl MappingSource for HttpMappingSource {
    fn fetch_mappings(&self, build_type_id: &str) -> Result<Vec<MappingElement>, MappingError> {
        let mut attempt = 0;

        loop {
            match self.request_once(build_type_id) {
                Ok(mappings) => {
                    info!(build_type_id, count = mappings.len(), "fetched vcs mapping");
                    return Ok(mappings);
                }
                Err(Attempt { error, retry }) => {
                    if !retry || attempt + 1 >= MAX_RETRIES {
                        return Err(error);
                    }
                    warn!(build_type_id, attempt, %error, "mapping request failed, retrying");
                    thread::sleep(backoff(attempt));
                    attempt += 1;
                }
            }
        }
    }
}

struct Attempt {
    error: MappingError,
    retry: bool,
}

impl Attempt {
    fn retry(error: MappingError) -> Self {
        Attempt { error, retry: true }
    }

    fn fatal(error: MappingError) -> Self {
        Attempt { error, retry: false }
    }
}

pub fn endpoint_for(server_url: &str) -> Result<Url, MappingError> {
    let invalid = |reason: String| MappingError::InvalidUrl {
        url: server_url.to_string(),
        reason,
    };

    // Keep a context path (".../teamcity") when joining the controller name.
    let base = format!("{}/", server_url.trim_end_matches('/'));
    let base = Url::parse(&base).map_err(|e| invalid(e.to_string()))?;
    if base.cannot_be_a_base() {
        return Err(invalid("not a base url".to_string()));
    }

    let endpoint = base.join(AJAX_PATH).map_err(|e| invalid(e.to_string()))?;
    debug!(%endpoint, "mapping endpoint");
    Ok(endpoint)
}

fn backoff(attempt: usize) -> Duration {
    let jitter: u64 = thread_rng().gen_range(0..100);
    let ms = BASE_DELAY_MS * (2_u64.pow(attempt as u32)) + jitter;
    Duration::from_millis(ms)
}

fn should_retry_http(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(200) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
