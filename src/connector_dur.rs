//! data.go.kr DUR API connector.
//!
//! Talks to two Ministry of Food and Drug Safety endpoints over blocking
//! HTTP:
//!
//! | Endpoint | Parameters | Used for |
//! |----------|------------|----------|
//! | `getDurPrdlstInfoList` | `serviceKey`, `pageNo`, `numOfRows`, `type` | paginated DUR records |
//! | `getDrugPrdtPrmsnInfoList` | `serviceKey`, `itemName`, `type` | name lookup during enrichment |
//!
//! # Response shape
//!
//! ```json
//! { "header": { "resultCode": "00" },
//!   "body": { "pageNo": 1, "totalCount": 1234, "items": [ { "ITEM_NAME": "..." } ] } }
//! ```
//!
//! Some services wrap the list as `"items": { "item": [...] }` (or a single
//! object when there is one result); both are accepted. An empty string or
//! empty list for `items` is an empty page.

use reqwest::blocking::Client;
use serde_json::Value;

use crate::config::{ApiConfig, ApiCredentials};
use crate::models::Record;
use crate::source::{RecordSource, SourceError};

/// HTTP-backed [`RecordSource`].
pub struct DurApiSource {
    client: Client,
    dur_url: String,
    drug_info_url: String,
    api_key: String,
}

impl DurApiSource {
    /// Build the blocking client with the configured timeout and user agent.
    pub fn new(api: &ApiConfig, creds: &ApiCredentials) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(api.timeout())
            .user_agent(api.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            dur_url: api.dur_url.clone(),
            drug_info_url: api.drug_info_url.clone(),
            api_key: creds.api_key.clone(),
        })
    }

    fn get_json(&self, url: &str, params: &[(&str, &str)]) -> Result<Value, SourceError> {
        let resp = self
            .client
            .get(url)
            .query(params)
            .send()
            .map_err(|e| SourceError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let text = resp.text().map_err(|e| SourceError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        serde_json::from_str(&text).map_err(|e| SourceError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

impl RecordSource for DurApiSource {
    fn name(&self) -> &str {
        "dur-api"
    }

    fn fetch_page(&self, page: u32, page_size: u32) -> Result<Vec<Record>, SourceError> {
        let page = page.to_string();
        let rows = page_size.to_string();
        let json = self.get_json(
            &self.dur_url,
            &[
                ("serviceKey", self.api_key.as_str()),
                ("pageNo", page.as_str()),
                ("numOfRows", rows.as_str()),
                ("type", "json"),
            ],
        )?;
        extract_items(&json)
    }

    fn lookup(&self, item_name: &str) -> Result<Option<Record>, SourceError> {
        let json = self.get_json(
            &self.drug_info_url,
            &[
                ("serviceKey", self.api_key.as_str()),
                ("itemName", item_name),
                ("type", "json"),
            ],
        )?;
        extract_first(&json)
    }
}

/// Pull the record list out of a DUR response.
pub fn extract_items(json: &Value) -> Result<Vec<Record>, SourceError> {
    let body = json.get("body").ok_or_else(|| SourceError::Shape {
        expected: "body".to_string(),
    })?;
    let items = body.get("items").ok_or_else(|| SourceError::Shape {
        expected: "body.items".to_string(),
    })?;
    items_to_records(items)
}

/// First record of a lookup response, if any.
///
/// A body without `items` is how the service reports "no match", so only a
/// missing `body` is a shape error here.
pub fn extract_first(json: &Value) -> Result<Option<Record>, SourceError> {
    let body = json.get("body").ok_or_else(|| SourceError::Shape {
        expected: "body".to_string(),
    })?;
    match body.get("items") {
        None => Ok(None),
        Some(items) => Ok(items_to_records(items)?.into_iter().next()),
    }
}

fn items_to_records(items: &Value) -> Result<Vec<Record>, SourceError> {
    match items {
        Value::Null => Ok(Vec::new()),
        Value::String(s) if s.trim().is_empty() => Ok(Vec::new()),
        Value::Array(list) => Ok(list.iter().filter_map(Record::from_json).collect()),
        Value::Object(obj) => match obj.get("item") {
            Some(Value::Array(list)) => Ok(list.iter().filter_map(Record::from_json).collect()),
            Some(single @ Value::Object(_)) => Ok(Record::from_json(single).into_iter().collect()),
            _ => Err(SourceError::Shape {
                expected: "body.items list".to_string(),
            }),
        },
        _ => Err(SourceError::Shape {
            expected: "body.items list".to_string(),
        }),
    }
}
