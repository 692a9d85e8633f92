//! Invoice list view state
//!
//! Query parameters, the server's page shape, and the state the list view
//! keeps between fetches. A successful create bumps a [`RefreshTrigger`];
//! the list state compares generations to know it must re-fetch.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

use core_kernel::PortError;

use crate::draft::CustomField;
use crate::ports::{InvoicePort, ListRefresh};

/// Message shown when a page cannot be fetched
pub const FETCH_FAILED: &str = "Failed to fetch invoices";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortBy {
    #[default]
    CreatedDate,
    DueDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

/// Query parameters of the list call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceQuery {
    pub page_num: u32,
    pub page_size: u32,
    pub sort_by: SortBy,
    pub ordering: SortDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}

impl Default for InvoiceQuery {
    fn default() -> Self {
        Self {
            page_num: 1,
            page_size: 10,
            sort_by: SortBy::default(),
            ordering: SortDirection::default(),
            keyword: None,
        }
    }
}

impl InvoiceQuery {
    /// Sets the search keyword; blank clears it
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        self.keyword = (!keyword.trim().is_empty()).then_some(keyword);
        self
    }
}

/// One entry of an invoice's status list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusFlag {
    pub key: String,
    pub value: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SummaryCustomer {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub addresses: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Merchant {
    pub id: String,
    pub name: String,
    pub addresses: Vec<serde_json::Value>,
}

/// An invoice as returned by the list call
///
/// Only the fields the list and detail views read are typed; nested arrays
/// the views pass through untouched stay as raw JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceSummary {
    pub invoice_id: String,
    pub invoice_number: String,
    pub invoice_reference: String,
    pub reference_no: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub version: String,
    pub currency: String,
    pub currency_symbol: String,
    pub customer: SummaryCustomer,
    pub merchant: Option<Merchant>,
    pub description: String,
    pub invoice_date: String,
    pub due_date: String,
    pub created_at: String,
    pub created_by: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub invoice_sub_total: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_discount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_tax: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_paid: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub invoice_gross_total: Decimal,
    pub number_of_documents: u32,
    pub status: Vec<StatusFlag>,
    pub sub_status: Vec<serde_json::Value>,
    pub custom_fields: Vec<CustomField>,
    pub items: Vec<serde_json::Value>,
    pub extensions: Vec<serde_json::Value>,
    pub documents: Vec<serde_json::Value>,
    pub payments: Vec<serde_json::Value>,
}

impl InvoiceSummary {
    /// True when the status list carries a set `PAID` flag
    pub fn is_paid(&self) -> bool {
        self.status.iter().any(|s| s.key == "PAID" && s.value)
    }

    pub fn customer_name(&self) -> String {
        format!("{} {}", self.customer.first_name, self.customer.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Paging {
    pub total_records: u64,
    pub page_num: u32,
    pub page_size: u32,
}

/// One page of the list call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoicePage {
    pub data: Vec<InvoiceSummary>,
    #[serde(default)]
    pub paging: Paging,
}

/// List-refresh collaborator backed by a generation counter
#[derive(Debug, Default)]
pub struct RefreshTrigger {
    generation: AtomicU64,
}

impl RefreshTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

impl ListRefresh for RefreshTrigger {
    fn refresh(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, "Invoice list refresh requested");
    }
}

/// What the invoice list view shows
#[derive(Debug, Clone)]
pub struct InvoiceListState {
    query: InvoiceQuery,
    invoices: Vec<InvoiceSummary>,
    total_records: u64,
    total_pages: u64,
    loading: bool,
    error: Option<String>,
    loaded_generation: Option<u64>,
    stale: bool,
}

impl Default for InvoiceListState {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceListState {
    pub fn new() -> Self {
        Self {
            query: InvoiceQuery::default(),
            invoices: Vec::new(),
            total_records: 0,
            total_pages: 1,
            loading: false,
            error: None,
            loaded_generation: None,
            stale: true,
        }
    }

    pub fn query(&self) -> &InvoiceQuery {
        &self.query
    }

    pub fn invoices(&self) -> &[InvoiceSummary] {
        &self.invoices
    }

    pub fn total_records(&self) -> u64 {
        self.total_records
    }

    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_page(&mut self, page_num: u32) {
        self.update(|q| q.page_num = page_num.max(1));
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.update(|q| q.page_size = page_size.max(1));
    }

    pub fn set_keyword(&mut self, keyword: &str) {
        self.update(|q| *q = std::mem::take(q).with_keyword(keyword));
    }

    pub fn set_sort_by(&mut self, sort_by: SortBy) {
        self.update(|q| q.sort_by = sort_by);
    }

    pub fn set_ordering(&mut self, ordering: SortDirection) {
        self.update(|q| q.ordering = ordering);
    }

    /// True if the query changed or a refresh was requested since the last load
    pub fn needs_reload(&self, trigger: &RefreshTrigger) -> bool {
        self.stale || self.loaded_generation != Some(trigger.generation())
    }

    /// Loads only when [`needs_reload`](Self::needs_reload) says so
    pub async fn reload_if_needed(
        &mut self,
        port: &dyn InvoicePort,
        trigger: &RefreshTrigger,
    ) -> Result<bool, PortError> {
        if !self.needs_reload(trigger) {
            return Ok(false);
        }
        let generation = trigger.generation();
        self.load(port).await?;
        self.loaded_generation = Some(generation);
        Ok(true)
    }

    /// Fetches the page described by the current query
    ///
    /// On failure the previous page stays visible and [`error`](Self::error)
    /// holds a generic message.
    pub async fn load(&mut self, port: &dyn InvoicePort) -> Result<(), PortError> {
        self.loading = true;
        self.error = None;
        let result = port.list_invoices(&self.query, None).await;
        self.loading = false;

        match result {
            Ok(page) => {
                self.total_records = page.paging.total_records;
                self.total_pages = self.total_records.div_ceil(u64::from(self.query.page_size.max(1)));
                self.invoices = page.data;
                self.stale = false;
                debug!(
                    count = self.invoices.len(),
                    total = self.total_records,
                    "Invoice page loaded"
                );
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch invoices");
                self.error = Some(FETCH_FAILED.to_string());
                Err(e)
            }
        }
    }

    fn update(&mut self, change: impl FnOnce(&mut InvoiceQuery)) {
        let before = self.query.clone();
        change(&mut self.query);
        if self.query != before {
            self.stale = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::MockInvoicePort;

    fn page(total: u64, invoices: usize) -> InvoicePage {
        InvoicePage {
            data: (0..invoices)
                .map(|i| InvoiceSummary {
                    invoice_number: format!("INV-{}", i),
                    ..InvoiceSummary::default()
                })
                .collect(),
            paging: Paging {
                total_records: total,
                page_num: 1,
                page_size: 10,
            },
        }
    }

    #[test]
    fn test_default_query() {
        let json = serde_json::to_value(InvoiceQuery::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "pageNum": 1,
                "pageSize": 10,
                "sortBy": "CREATED_DATE",
                "ordering": "DESCENDING"
            })
        );
    }

    #[test]
    fn test_blank_keyword_is_dropped() {
        assert_eq!(InvoiceQuery::default().with_keyword("  ").keyword, None);
        assert_eq!(InvoiceQuery::default().with_keyword("acme").keyword.as_deref(), Some("acme"));
    }

    #[test]
    fn test_summary_helpers() {
        let summary: InvoiceSummary = serde_json::from_value(serde_json::json!({
            "invoiceNumber": "INV-7",
            "customer": {"firstName": "Jane", "lastName": "Doe"},
            "status": [{"key": "PAID", "value": true}],
            "totalAmount": 120.5
        }))
        .unwrap();

        assert!(summary.is_paid());
        assert_eq!(summary.customer_name(), "Jane Doe");
        assert_eq!(summary.total_amount, Decimal::new(1205, 1));
    }

    #[test]
    fn test_unpaid_when_flag_false() {
        let summary = InvoiceSummary {
            status: vec![StatusFlag { key: "PAID".into(), value: false }],
            ..InvoiceSummary::default()
        };
        assert!(!summary.is_paid());
    }

    #[tokio::test]
    async fn test_load_computes_total_pages() {
        let port = MockInvoicePort::new().with_page(page(25, 10)).await;
        let mut state = InvoiceListState::new();

        state.load(&port).await.unwrap();

        assert_eq!(state.invoices().len(), 10);
        assert_eq!(state.total_records(), 25);
        assert_eq!(state.total_pages(), 3);
        assert!(state.error().is_none());
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_page() {
        let port = MockInvoicePort::new().with_page(page(3, 3)).await;
        let mut state = InvoiceListState::new();
        state.load(&port).await.unwrap();

        port.set_failure(Some("invoice-service")).await;
        assert!(state.load(&port).await.is_err());

        assert_eq!(state.invoices().len(), 3);
        assert_eq!(state.error(), Some(FETCH_FAILED));
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn test_refresh_trigger_forces_reload() {
        let port = MockInvoicePort::new();
        let trigger = RefreshTrigger::new();
        let mut state = InvoiceListState::new();

        assert!(state.reload_if_needed(&port, &trigger).await.unwrap());
        assert!(!state.reload_if_needed(&port, &trigger).await.unwrap());

        trigger.refresh();
        assert!(state.needs_reload(&trigger));
        assert!(state.reload_if_needed(&port, &trigger).await.unwrap());
        assert_eq!(port.queries().await.len(), 2);
    }

    #[test]
    fn test_query_change_marks_stale() {
        let trigger = RefreshTrigger::new();
        let mut state = InvoiceListState::new();
        state.stale = false;
        state.loaded_generation = Some(trigger.generation());
        assert!(!state.needs_reload(&trigger));

        state.set_sort_by(SortBy::CreatedDate);
        assert!(!state.needs_reload(&trigger));

        state.set_sort_by(SortBy::DueDate);
        assert!(state.needs_reload(&trigger));
    }
}
