use crate::api::integrity::{CONTENT_SHA256_HEADER, content_sha256};
use crate::api::models::{GraphQlRequest, GraphQlResponse, SearchResult, SearchVariables};
use crate::api::query::{QueryVariant, ROOT_FIELD};
use crate::core::payload::QueryPayload;
use crate::core::services::traits::SearchGateway;
use crate::error::ApiError;
use crate::utils::error_helpers::*;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder};
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("worksearch/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    pub timeout_secs: u64,
    /// Attach the body digest header.
    pub integrity_header: bool,
    pub variant: QueryVariant,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            integrity_header: true,
            variant: QueryVariant::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkSearchClient {
    client: Client,
    pub endpoint: String,
    options: ClientOptions,
}

impl WorkSearchClient {
    pub fn new(endpoint: String, options: ClientOptions) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| convert_request_error(e, "client_init", options.timeout_secs))?;

        Ok(WorkSearchClient {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            options,
        })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Serialized request body for `payload`, exactly as it will be sent.
    pub fn request_body(&self, payload: &QueryPayload) -> Result<Vec<u8>, ApiError> {
        encode_request_body(self.options.variant, payload)
            .map_err(|e| convert_json_error(e, &self.endpoint))
    }

    pub fn build_request(&self, body: Vec<u8>) -> RequestBuilder {
        let mut request = self
            .client
            .request(Method::POST, &self.endpoint)
            .header(CONTENT_TYPE, "application/json");

        if self.options.integrity_header {
            request = request.header(CONTENT_SHA256_HEADER, content_sha256(&body));
        }

        request.body(body)
    }

    /// Runs one search. No retries.
    pub async fn search(&self, payload: &QueryPayload) -> Result<SearchResult, ApiError> {
        let body = self.request_body(payload)?;
        log::debug!(
            "POST {} ({} bytes, variant {})",
            self.endpoint,
            body.len(),
            self.options.variant
        );

        let response = self
            .build_request(body)
            .send()
            .await
            .map_err(|e| convert_request_error(e, &self.endpoint, self.options.timeout_secs))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| convert_request_error(e, &self.endpoint, self.options.timeout_secs))?;

        log::debug!("{} responded with status {}", self.endpoint, status);
        parse_search_response(status, &text, &self.endpoint, self.options.timeout_secs)
    }
}

/// GraphQL request body for `payload` under the given field selection.
pub fn encode_request_body(
    variant: QueryVariant,
    payload: &QueryPayload,
) -> Result<Vec<u8>, serde_json::Error> {
    let document = variant.document();
    let request = GraphQlRequest {
        query: &document,
        variables: SearchVariables {
            work_search_input: payload,
        },
    };
    serde_json::to_vec(&request)
}

/// Interprets a gateway response body.
///
/// A non-empty `errors` list wins over everything else, including the HTTP
/// status; only its first message is kept.
pub fn parse_search_response(
    status: u16,
    body: &str,
    endpoint: &str,
    timeout_secs: u64,
) -> Result<SearchResult, ApiError> {
    let success = (200..300).contains(&status);

    let envelope: GraphQlResponse = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) if success => return Err(convert_json_error(e, endpoint)),
        Err(_) => return Err(http_error(status, body, endpoint, timeout_secs)),
    };

    if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
        let dropped = errors.len() - 1;
        if dropped > 0 {
            log::warn!(
                "gateway returned {} errors, surfacing only the first",
                errors.len()
            );
        }
        let message = errors.into_iter().next().and_then(|e| e.message);
        return Err(ApiError::Gateway { message, dropped });
    }

    if !success {
        return Err(http_error(status, body, endpoint, timeout_secs));
    }

    let root = envelope
        .data
        .and_then(|mut data| data.get_mut(ROOT_FIELD).map(serde_json::Value::take))
        .filter(|root| !root.is_null())
        .ok_or_else(|| ApiError::Parse {
            endpoint: endpoint.to_string(),
            message: format!("response has no data.{}", ROOT_FIELD),
        })?;

    serde_json::from_value(root).map_err(|e| convert_json_error(e, endpoint))
}

fn http_error(status: u16, body: &str, endpoint: &str, timeout_secs: u64) -> ApiError {
    match status {
        408 | 504 => convert_timeout_error(endpoint, timeout_secs),
        _ => ApiError::Http {
            status,
            endpoint: endpoint.to_string(),
            message: body.to_string(),
        },
    }
}

#[async_trait]
impl SearchGateway for WorkSearchClient {
    async fn search(&self, payload: &QueryPayload) -> Result<SearchResult, ApiError> {
        WorkSearchClient::search(self, payload).await
    }
}
