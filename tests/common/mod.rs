//! Shared fixtures for receipt-splitter integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use receipt_splitter::api::{self, AppState};
use receipt_splitter::db::MemoryReceiptStore;
use receipt_splitter::extraction::{ExtractedReceipt, ExtractionError, ReceiptExtractor};
use receipt_splitter::models::RawExtractedItem;
use receipt_splitter::ReceiptService;
use std::str::FromStr;
use std::sync::Arc;

pub fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

/// What the stub extractor should answer with.
pub enum StubOutcome {
    Receipt(ExtractedReceipt),
    Timeout,
    NoDocument,
}

pub struct StubExtractor {
    outcome: StubOutcome,
}

impl StubExtractor {
    pub fn new(outcome: StubOutcome) -> Self {
        Self { outcome }
    }
}

#[async_trait]
impl ReceiptExtractor for StubExtractor {
    async fn analyze(&self, _image: &[u8]) -> Result<ExtractedReceipt, ExtractionError> {
        match &self.outcome {
            StubOutcome::Receipt(receipt) => Ok(receipt.clone()),
            StubOutcome::Timeout => Err(ExtractionError::Timeout),
            StubOutcome::NoDocument => Err(ExtractionError::NoDocument),
        }
    }
}

/// Milk + Tax grocery receipt with a misprinted total.
pub fn grocery_receipt() -> ExtractedReceipt {
    ExtractedReceipt {
        merchant_name: Some("Corner Market".to_string()),
        transaction_date: chrono::NaiveDate::from_ymd_opt(2024, 3, 9),
        total: Some(dec("9.99")),
        tax: Some(dec("0.28")),
        discount: None,
        items: vec![
            RawExtractedItem::new(0)
                .with_description("Milk")
                .with_total(dec("3.50")),
            RawExtractedItem::new(1).with_description("Tax"),
        ],
    }
}

pub struct TestApp {
    pub store: Arc<MemoryReceiptStore>,
    pub service: Arc<ReceiptService>,
}

impl TestApp {
    pub fn new(outcome: StubOutcome) -> Self {
        let store = Arc::new(MemoryReceiptStore::new());
        let service = Arc::new(ReceiptService::new(
            Arc::new(StubExtractor::new(outcome)),
            store.clone(),
        ));
        Self { store, service }
    }

    pub fn router(&self) -> axum::Router {
        api::router(AppState::new(self.service.clone()))
    }
}
