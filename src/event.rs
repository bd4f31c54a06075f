//! Event records accepted from callers

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ConversionsError;

pub const DEFAULT_CURRENCY: &str = "BDT";

/// One user or business event to be reported to the Conversions API.
///
/// Field names follow the input mapping callers already produce, so a JSON
/// object like `{"event_name": "Purchase", "userID": 7, ...}` deserializes
/// directly. Identifiers may arrive as strings or numbers.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EventInput {
    pub event_name: String,
    /// Unix epoch seconds
    pub event_time: i64,
    /// Deduplication key on the remote side
    #[serde(deserialize_with = "string_or_number")]
    pub event_id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub phone: String,
    #[serde(rename = "userID", alias = "user_id", deserialize_with = "string_or_number")]
    pub user_id: String,
    /// Browser pixel cookie (`_fbp`)
    pub fbp: String,
    pub value: serde_json::Number,
    #[serde(deserialize_with = "list_of_string_or_number")]
    pub content_ids: Vec<String>,
    pub content_type: String,
    #[serde(deserialize_with = "string_or_number")]
    pub order_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_source_url: Option<String>,
}

impl EventInput {
    /// Parse a loosely-typed mapping, reporting the first missing or mistyped field
    pub fn from_value(value: &Value) -> Result<Self, ConversionsError> {
        if !value.is_object() {
            return Err(ConversionsError::invalid_input("event data must be a mapping"));
        }
        Self::deserialize(value).map_err(|e| ConversionsError::invalid_input(e.to_string()))
    }

    /// Currency to report, falling back to the default code
    pub fn currency_or_default(&self) -> &str {
        self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.event_source_url = Some(url.into());
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(v: StringOrNumber) -> Self {
        match v {
            StringOrNumber::Text(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn list_of_string_or_number<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Vec::<StringOrNumber>::deserialize(deserializer)?;
    Ok(items.into_iter().map(String::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn purchase() -> Value {
        json!({
            "event_name": "Purchase",
            "event_time": 1700000000,
            "event_id": "evt-1",
            "phone": "8801700000000",
            "userID": 42,
            "fbp": "fb.1.1596403881668.1116446470",
            "value": 1250.5,
            "content_ids": ["sku-1", 77],
            "content_type": "product",
            "order_id": 9001
        })
    }

    #[test]
    fn test_from_value_full_event() {
        let event = EventInput::from_value(&purchase()).unwrap();
        assert_eq!(event.event_name, "Purchase");
        assert_eq!(event.user_id, "42");
        assert_eq!(event.order_id, "9001");
        assert_eq!(event.content_ids, vec!["sku-1".to_string(), "77".to_string()]);
        assert!(event.currency.is_none());
        assert!(event.client_ip_address.is_none());
    }

    #[test]
    fn test_numeric_event_id() {
        let mut data = purchase();
        data["event_id"] = json!(123);

        let event = EventInput::from_value(&data).unwrap();
        assert_eq!(event.event_id, "123");
    }

    #[test]
    fn test_user_id_alias() {
        let mut data = purchase();
        let obj = data.as_object_mut().unwrap();
        obj.remove("userID");
        obj.insert("user_id".to_string(), json!("u-9"));

        let event = EventInput::from_value(&data).unwrap();
        assert_eq!(event.user_id, "u-9");
    }

    #[test]
    fn test_missing_required_field() {
        let mut data = purchase();
        data.as_object_mut().unwrap().remove("phone");

        let err = EventInput::from_value(&data).unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
        assert!(err.to_string().contains("phone"));
    }

    #[test]
    fn test_non_mapping_rejected() {
        let err = EventInput::from_value(&json!(["Purchase"])).unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }

    #[test]
    fn test_currency_default() {
        let event = EventInput::from_value(&purchase()).unwrap();
        assert_eq!(event.currency_or_default(), "BDT");

        let mut data = purchase();
        data["currency"] = json!("USD");
        let event = EventInput::from_value(&data).unwrap();
        assert_eq!(event.currency_or_default(), "USD");
    }

    #[test]
    fn test_with_source_url() {
        let event = EventInput::from_value(&purchase())
            .unwrap()
            .with_source_url("https://shop.example.com/checkout");
        assert_eq!(event.event_source_url.as_deref(), Some("https://shop.example.com/checkout"));
    }
}
