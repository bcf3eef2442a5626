//! Signed HTTP invocation of GaaP tools.
//!
//! [`GaapClient::invoke`] performs exactly one POST per call and folds every
//! expected failure into a [`ToolResponse`]:
//!
//! | Outcome | `error.code` | `recoverable` |
//! |---------|--------------|---------------|
//! | connect/DNS/timeout/body read failure | `NETWORK_ERROR` | `true` |
//! | non-2xx status | `HTTP_<status>` | `status >= 500` |
//! | 2xx | passed through from the body | as sent |
//!
//! Only hard faults (serialization, an unparsable 2xx body) come back as
//! `Err`. A 2xx body that parses but breaks the result/error shape is still
//! returned as sent.

use std::time::Instant;

use hyper::ext::ReasonPhrase;
use reqwest::{Client, Response, StatusCode};
use tracing::{info, instrument, warn};
use url::Url;

use crate::{
    auth::RequestSigner,
    config::{BridgeConfig, HttpConfig},
    error::{BridgeError, Result},
    models::{ToolRequest, ToolResponse},
};

/// Creates the HTTP client used for invocations.
///
/// # Errors
///
/// Returns [`BridgeError::HttpClient`] if client configuration fails.
pub fn create_http_client(config: &HttpConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .user_agent(concat!("gaap-mcp-bridge/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(BridgeError::HttpClient)
}

/// Invoker for the GaaP endpoint.
///
/// Holds only immutable state, so one client can serve concurrent calls.
///
/// # Examples
///
/// ```rust,no_run
/// use gaap_mcp_bridge::{
///     client::GaapClient,
///     config::BridgeConfig,
///     models::{TenantContext, ToolRequest},
/// };
/// use serde_json::json;
///
/// # async fn example() -> gaap_mcp_bridge::error::Result<()> {
/// let config = BridgeConfig::from_env()?;
/// let client = GaapClient::new(&config)?;
///
/// let request = ToolRequest::new(
///     "gaap_policy_evaluate",
///     TenantContext { tenant_id: config.credentials.tenant_id().to_owned(), correlation_id: None },
///     json!({"amount": 120, "identity_level": "basic"}).as_object().cloned().unwrap_or_default(),
/// );
///
/// let response = client.invoke(&request).await?;
/// match response.error_summary() {
///     Some(summary) => eprintln!("{summary}"),
///     None => println!("{:?}", response.result),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GaapClient {
    http: Client,
    signer: RequestSigner,
    endpoint: Url,
}

impl GaapClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client or the signer cannot be built.
    pub fn new(config: &BridgeConfig) -> Result<Self> {
        config.http.validate()?;
        Ok(Self {
            http: create_http_client(&config.http)?,
            signer: RequestSigner::new(config.credentials.clone())?,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Endpoint every call is POSTed to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Tenant identifier of the configured credentials.
    #[must_use]
    pub fn tenant_id(&self) -> &str {
        self.signer.credentials().tenant_id()
    }

    /// Invokes one remote tool.
    ///
    /// The request is serialized exactly once; the same bytes are hashed,
    /// signed and transmitted.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::Serialization`] if the request cannot be serialized
    /// - [`BridgeError::MalformedResponse`] if a 2xx body does not parse as a
    ///   [`ToolResponse`]
    #[instrument(skip(self, request), fields(tool = %request.tool, endpoint = %self.endpoint))]
    pub async fn invoke(&self, request: &ToolRequest) -> Result<ToolResponse> {
        let body = serde_json::to_vec(request)
            .map_err(|e| BridgeError::Serialization(e.to_string()))?;

        let started = Instant::now();
        let signed = self.signer.sign(&body);

        let mut builder = self.http.post(self.endpoint.clone());
        for (name, value) in signed.headers() {
            builder = builder.header(name, value);
        }

        let response = match builder.body(body).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "GaaP request failed before a response arrived");
                return Ok(ToolResponse::network_error(describe_transport_error(&e)));
            }
        };

        let status = response.status();
        let elapsed_ms = started.elapsed().as_millis();

        if !status.is_success() {
            warn!(status = status.as_u16(), elapsed_ms, "GaaP returned an HTTP error");
            return Ok(http_error(status, reason_phrase(&response)));
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "reading GaaP response body failed");
                return Ok(ToolResponse::network_error(describe_transport_error(&e)));
            }
        };

        let parsed = parse_response(&bytes)?;
        info!(
            status = status.as_u16(),
            elapsed_ms,
            success = parsed.success,
            request_id = %parsed.meta.request_id,
            "GaaP tool invoked"
        );
        Ok(parsed)
    }
}

/// Maps a non-2xx status to a synthesized failure response.
///
/// The reason phrase the server sent wins over the canonical one.
fn http_error(status: StatusCode, reason: Option<&str>) -> ToolResponse {
    let reason = reason.or_else(|| status.canonical_reason()).unwrap_or("");
    ToolResponse::http_error(status.as_u16(), reason)
}

/// Non-canonical reason phrase of an HTTP/1 response, if the server sent one.
fn reason_phrase(response: &Response) -> Option<&str> {
    response
        .extensions()
        .get::<ReasonPhrase>()
        .and_then(|phrase| std::str::from_utf8(phrase.as_bytes()).ok())
        .filter(|phrase| !phrase.is_empty())
}

/// Renders a transport error including its source chain.
fn describe_transport_error(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }
    message
}

/// Parses a 2xx body as a tool response.
fn parse_response(bytes: &[u8]) -> Result<ToolResponse> {
    let response: ToolResponse = serde_json::from_slice(bytes)
        .map_err(|e| BridgeError::MalformedResponse(e.to_string()))?;

    if !response.is_well_formed() {
        warn!(
            success = response.success,
            has_result = response.result.is_some(),
            has_error = response.error.is_some(),
            "GaaP response does not carry exactly one of result or error"
        );
    }

    Ok(response)
}
