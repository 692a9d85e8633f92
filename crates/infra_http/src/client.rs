//! Invoice Service Adapter
//!
//! Implements [`InvoicePort`] over the invoice service's REST API.
//!
//! | operation | request |
//! |-----------|---------|
//! | create | `POST /invoice-service/1.0.0/invoices`, header `Operation-Mode: SYNC` |
//! | list | `GET /invoice-service/1.0.0/invoices?pageNum=..&pageSize=..` |
//!
//! Both carry `Authorization: Bearer <token>` and `org-token` when the token
//! provider holds them.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use core_kernel::{DomainPort, OperationMetadata, PortError};
use domain_invoice::{CreateInvoiceRequest, InvoicePage, InvoicePort, InvoiceQuery, TokenProvider};

use crate::config::ClientConfig;
use crate::error::HttpError;

pub const INVOICES_PATH: &str = "/invoice-service/1.0.0/invoices";
pub const OPERATION_MODE_HEADER: &str = "Operation-Mode";
pub const ORG_TOKEN_HEADER: &str = "org-token";

/// Builds the shared `reqwest` client with the configured timeout
pub fn build_client(config: &ClientConfig) -> Result<Client, HttpError> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(HttpError::Client)
}

/// Adds the bearer and organisation tokens, when present
pub(crate) fn authorize(request: RequestBuilder, tokens: &dyn TokenProvider) -> RequestBuilder {
    let request = match tokens.access_token() {
        Some(token) => request.bearer_auth(token),
        None => request,
    };
    match tokens.org_token() {
        Some(token) => request.header(ORG_TOKEN_HEADER, token),
        None => request,
    }
}

/// Sends `request` and turns a non-success status into [`HttpError::Status`]
pub(crate) async fn send(
    operation: &'static str,
    timeout_ms: u64,
    request: RequestBuilder,
) -> Result<Response, HttpError> {
    let response = request
        .send()
        .await
        .map_err(|e| HttpError::from_reqwest(operation, timeout_ms, e))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after_secs = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok());
    let body = response.text().await.unwrap_or_default();
    warn!(operation, status = %status, "Backend rejected request");
    Err(HttpError::Status {
        operation,
        status,
        body,
        retry_after_secs,
    })
}

/// Reads a JSON body, treating an empty body as `null`
pub(crate) async fn read_json<T: DeserializeOwned>(
    operation: &'static str,
    timeout_ms: u64,
    response: Response,
) -> Result<T, HttpError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| HttpError::from_reqwest(operation, timeout_ms, e))?;
    let body: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        &bytes
    };
    serde_json::from_slice(body).map_err(|e| HttpError::decode(operation, e.to_string()))
}

/// `reqwest`-backed implementation of the InvoicePort trait
pub struct HttpInvoiceAdapter {
    client: Client,
    invoices_url: String,
    timeout_ms: u64,
    tokens: Arc<dyn TokenProvider>,
}

impl std::fmt::Debug for HttpInvoiceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpInvoiceAdapter")
            .field("invoices_url", &self.invoices_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}

impl HttpInvoiceAdapter {
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self, HttpError> {
        Ok(Self::with_client(build_client(config)?, config, tokens))
    }

    /// Uses an existing client, sharing its connection pool
    pub fn with_client(client: Client, config: &ClientConfig, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            client,
            invoices_url: config.api_url(INVOICES_PATH),
            timeout_ms: config.timeout_ms(),
            tokens,
        }
    }

    pub fn invoices_url(&self) -> &str {
        &self.invoices_url
    }
}

impl DomainPort for HttpInvoiceAdapter {}

#[async_trait]
impl InvoicePort for HttpInvoiceAdapter {
    #[instrument(
        skip(self, request, metadata),
        fields(
            invoices = request.invoices.len(),
            request_id = ?metadata.as_ref().and_then(|m| m.request_id)
        )
    )]
    async fn create_invoices(
        &self,
        request: &CreateInvoiceRequest,
        metadata: Option<OperationMetadata>,
    ) -> Result<serde_json::Value, PortError> {
        let builder = self
            .client
            .post(&self.invoices_url)
            .header(OPERATION_MODE_HEADER, "SYNC")
            .json(request);
        let builder = authorize(builder, self.tokens.as_ref());

        let response = send("create_invoices", self.timeout_ms, builder).await?;
        let body = read_json("create_invoices", self.timeout_ms, response).await?;
        debug!("Create invoices accepted");
        Ok(body)
    }

    #[instrument(
        skip(self, query, metadata),
        fields(
            page = query.page_num,
            page_size = query.page_size,
            request_id = ?metadata.as_ref().and_then(|m| m.request_id)
        )
    )]
    async fn list_invoices(
        &self,
        query: &InvoiceQuery,
        metadata: Option<OperationMetadata>,
    ) -> Result<InvoicePage, PortError> {
        let builder = self.client.get(&self.invoices_url).query(query);
        let builder = authorize(builder, self.tokens.as_ref());

        let response = send("list_invoices", self.timeout_ms, builder).await?;
        let page: InvoicePage = read_json("list_invoices", self.timeout_ms, response).await?;
        debug!(count = page.data.len(), total = page.paging.total_records, "Invoice page fetched");
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionTokens;

    fn adapter(tokens: Arc<SessionTokens>) -> HttpInvoiceAdapter {
        HttpInvoiceAdapter::new(&ClientConfig::default(), tokens).unwrap()
    }

    #[test]
    fn test_invoices_url() {
        let adapter = adapter(Arc::new(SessionTokens::new()));
        assert_eq!(
            adapter.invoices_url(),
            "http://localhost:8080/api/invoice-service/1.0.0/invoices"
        );
    }

    #[test]
    fn test_authorize_adds_both_tokens() {
        let tokens = SessionTokens::new();
        tokens.set_access_token("access-1");
        tokens.set_org_token("org-1");
        let client = Client::new();

        let request = authorize(client.get("http://localhost/x"), &tokens).build().unwrap();

        assert_eq!(request.headers()["authorization"], "Bearer access-1");
        assert_eq!(request.headers()[ORG_TOKEN_HEADER], "org-1");
    }

    #[test]
    fn test_authorize_without_tokens_adds_nothing() {
        let client = Client::new();
        let request = authorize(client.get("http://localhost/x"), &SessionTokens::new())
            .build()
            .unwrap();
        assert!(request.headers().get("authorization").is_none());
        assert!(request.headers().get(ORG_TOKEN_HEADER).is_none());
    }

    #[test]
    fn test_list_query_parameters() {
        let client = Client::new();
        let query = InvoiceQuery::default().with_keyword("acme");
        let request = client.get("http://localhost/invoices").query(&query).build().unwrap();

        assert_eq!(
            request.url().query(),
            Some("pageNum=1&pageSize=10&sortBy=CREATED_DATE&ordering=DESCENDING&keyword=acme")
        );
    }

    #[test]
    fn test_blank_keyword_is_not_sent() {
        let client = Client::new();
        let request = client
            .get("http://localhost/invoices")
            .query(&InvoiceQuery::default())
            .build()
            .unwrap();
        assert!(!request.url().query().unwrap_or_default().contains("keyword"));
    }
}
