//! Azure Document Intelligence `prebuilt-receipt` REST 客户端

use super::{ExtractedReceipt, ExtractionError, ReceiptExtractor};
use crate::config::ExtractionConfig;
use crate::models::RawExtractedItem;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

const KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const MODEL_ID: &str = "prebuilt-receipt";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest {
    base64_source: String,
}

/// 异步分析任务状态
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOperation {
    pub status: String,
    pub analyze_result: Option<AnalyzeResult>,
    pub error: Option<ServiceError>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceError {
    pub code: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeResult {
    #[serde(default)]
    pub documents: Vec<AnalyzedDocument>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzedDocument {
    #[serde(default)]
    pub fields: HashMap<String, DocumentField>,
}

#[derive(Debug, Deserialize)]
pub struct CurrencyValue {
    pub amount: Option<BigDecimal>,
}

/// 识别出的字段 (按类型只有一个 value* 有值)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentField {
    pub value_string: Option<String>,
    pub value_number: Option<BigDecimal>,
    pub value_date: Option<NaiveDate>,
    pub value_currency: Option<CurrencyValue>,
    #[serde(default)]
    pub value_array: Vec<DocumentField>,
    #[serde(default)]
    pub value_object: HashMap<String, DocumentField>,
    pub content: Option<String>,
}

impl DocumentField {
    fn amount(&self) -> Option<BigDecimal> {
        self.value_currency
            .as_ref()
            .and_then(|c| c.amount.clone())
            .or_else(|| self.value_number.clone())
    }

    fn text(&self) -> Option<String> {
        self.value_string.clone().or_else(|| self.content.clone())
    }
}

pub struct AzureReceiptExtractor {
    client: Client,
    endpoint: String,
    api_key: String,
    api_version: String,
    timeout: Duration,
    poll_interval: Duration,
}

impl AzureReceiptExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        }
    }

    fn analyze_url(&self) -> String {
        format!(
            "{}/formrecognizer/documentModels/{}:analyze?api-version={}",
            self.endpoint, MODEL_ID, self.api_version
        )
    }

    /// 提交分析任务, 返回轮询地址
    async fn submit(&self, image: &[u8]) -> Result<String, ExtractionError> {
        let request = AnalyzeRequest {
            base64_source: STANDARD.encode(image),
        };

        let response = self
            .client
            .post(self.analyze_url())
            .header(KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Failed(format!("Analyze request rejected {status}: {body}")));
        }

        response
            .headers()
            .get("Operation-Location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| ExtractionError::Failed("Missing Operation-Location header".to_string()))
    }

    /// 轮询直到任务结束
    async fn poll(&self, location: &str) -> Result<AnalyzeOperation, ExtractionError> {
        let mut attempts = 0u32;
        loop {
            tokio::time::sleep(self.poll_interval).await;
            attempts += 1;

            let operation: AnalyzeOperation = self
                .client
                .get(location)
                .header(KEY_HEADER, &self.api_key)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            debug!("Analyze poll #{}: status {}", attempts, operation.status);
            match operation.status.as_str() {
                "succeeded" | "failed" => return Ok(operation),
                _ => continue,
            }
        }
    }

    async fn run(&self, image: &[u8]) -> Result<ExtractedReceipt, ExtractionError> {
        let location = self.submit(image).await?;
        let operation = self.poll(&location).await?;
        receipt_from_operation(operation)
    }
}

#[async_trait]
impl ReceiptExtractor for AzureReceiptExtractor {
    async fn analyze(&self, image: &[u8]) -> Result<ExtractedReceipt, ExtractionError> {
        info!("Analyzing receipt image ({} bytes)", image.len());
        let start = std::time::Instant::now();

        match tokio::time::timeout(self.timeout, self.run(image)).await {
            Ok(result) => {
                info!("Receipt analysis finished in {:?}", start.elapsed());
                result
            }
            Err(_) => {
                warn!("Receipt analysis timed out (>{:?})", self.timeout);
                Err(ExtractionError::Timeout)
            }
        }
    }
}

/// 已结束任务 -> 识别结果
pub fn receipt_from_operation(operation: AnalyzeOperation) -> Result<ExtractedReceipt, ExtractionError> {
    if operation.status == "failed" {
        let message = operation
            .error
            .and_then(|e| e.message.or(e.code))
            .unwrap_or_else(|| "Receipt analysis failed".to_string());
        return Err(ExtractionError::Failed(message));
    }

    let document = operation
        .analyze_result
        .and_then(|r| r.documents.into_iter().next())
        .ok_or(ExtractionError::NoDocument)?;

    Ok(receipt_from_fields(&document.fields))
}

/// 字段映射: MerchantName / TransactionDate / Total / Tax / Discount / Items
pub fn receipt_from_fields(fields: &HashMap<String, DocumentField>) -> ExtractedReceipt {
    let items = fields
        .get("Items")
        .map(|f| f.value_array.as_slice())
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(index, entry)| raw_item(index, &entry.value_object))
        .collect();

    ExtractedReceipt {
        merchant_name: fields.get("MerchantName").and_then(DocumentField::text),
        transaction_date: fields.get("TransactionDate").and_then(|f| f.value_date),
        total: fields.get("Total").and_then(DocumentField::amount),
        tax: fields
            .get("Tax")
            .or_else(|| fields.get("TotalTax"))
            .and_then(DocumentField::amount),
        discount: fields.get("Discount").and_then(DocumentField::amount),
        items,
    }
}

fn raw_item(index: usize, properties: &HashMap<String, DocumentField>) -> RawExtractedItem {
    RawExtractedItem {
        index,
        quantity_hint: properties.get("Quantity").and_then(DocumentField::amount),
        price_hint: properties.get("Price").and_then(DocumentField::amount),
        total_hint: properties.get("TotalPrice").and_then(DocumentField::amount),
        description_hint: properties.get("Description").and_then(DocumentField::text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn operation(value: serde_json::Value) -> AnalyzeOperation {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn maps_receipt_fields() {
        let op = operation(json!({
            "status": "succeeded",
            "analyzeResult": {
                "documents": [{
                    "docType": "receipt.retailMeal",
                    "fields": {
                        "MerchantName": { "type": "string", "valueString": "Corner Market" },
                        "TransactionDate": { "type": "date", "valueDate": "2024-03-09" },
                        "Total": { "type": "currency", "valueCurrency": { "amount": 7.25, "currencySymbol": "$" } },
                        "TotalTax": { "type": "currency", "valueCurrency": { "amount": 0.25 } },
                        "Items": {
                            "type": "array",
                            "valueArray": [
                                {
                                    "type": "object",
                                    "valueObject": {
                                        "Description": { "type": "string", "valueString": "Bananas 2.5 lb" },
                                        "TotalPrice": { "type": "currency", "valueCurrency": { "amount": 3.75 } }
                                    }
                                },
                                {
                                    "type": "object",
                                    "valueObject": {
                                        "Description": { "type": "string", "content": "Bread" },
                                        "Quantity": { "type": "number", "valueNumber": 2 },
                                        "Price": { "type": "number", "valueNumber": 1.5 }
                                    }
                                }
                            ]
                        }
                    }
                }]
            }
        }));

        let receipt = receipt_from_operation(op).unwrap();
        assert_eq!(receipt.merchant_name.as_deref(), Some("Corner Market"));
        assert_eq!(receipt.transaction_date, NaiveDate::from_ymd_opt(2024, 3, 9));
        assert_eq!(receipt.total, Some(dec("7.25")));
        assert_eq!(receipt.tax, Some(dec("0.25")));
        assert_eq!(receipt.discount, None);
        assert_eq!(receipt.items.len(), 2);

        let bananas = &receipt.items[0];
        assert_eq!(bananas.index, 0);
        assert_eq!(bananas.description_hint.as_deref(), Some("Bananas 2.5 lb"));
        assert_eq!(bananas.total_hint, Some(dec("3.75")));
        assert_eq!(bananas.quantity_hint, None);

        let bread = &receipt.items[1];
        assert_eq!(bread.index, 1);
        assert_eq!(bread.description_hint.as_deref(), Some("Bread"));
        assert_eq!(bread.quantity_hint, Some(dec("2")));
        assert_eq!(bread.price_hint, Some(dec("1.5")));
    }

    #[test]
    fn missing_fields_stay_empty() {
        let op = operation(json!({
            "status": "succeeded",
            "analyzeResult": { "documents": [{ "fields": {} }] }
        }));
        let receipt = receipt_from_operation(op).unwrap();
        assert_eq!(receipt, ExtractedReceipt::default());
    }

    #[test]
    fn no_document_is_an_error() {
        let op = operation(json!({
            "status": "succeeded",
            "analyzeResult": { "documents": [] }
        }));
        assert!(matches!(receipt_from_operation(op), Err(ExtractionError::NoDocument)));
    }

    #[test]
    fn failed_operation_carries_message() {
        let op = operation(json!({
            "status": "failed",
            "error": { "code": "InvalidImage", "message": "The file is corrupted." }
        }));
        match receipt_from_operation(op) {
            Err(ExtractionError::Failed(message)) => assert_eq!(message, "The file is corrupted."),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
