//! Wire format of a Conversions API request

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::credentials::Credentials;
use crate::event::EventInput;

/// Every event sent through this crate originates server-side on a website.
pub const ACTION_SOURCE: &str = "website";

/// SHA-256 of `value` as 64 lowercase hex characters
pub fn hash_identifier(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}

/// Top-level body POSTed to `/{pixel_id}/events`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBody {
    pub access_token: String,
    pub data: Vec<ServerEvent>,
    pub test_event_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerEvent {
    pub event_name: String,
    pub event_time: i64,
    pub event_id: String,
    pub user_data: UserData,
    pub custom_data: CustomData,
    pub event_source_url: Option<String>,
    pub action_source: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserData {
    pub ph: String,
    pub external_id: String,
    pub fbp: String,
    pub client_ip_address: Option<String>,
    pub client_user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomData {
    pub currency: String,
    pub value: serde_json::Number,
    pub content_ids: Vec<String>,
    pub content_type: String,
    pub order_number: String,
}

impl ServerEvent {
    pub fn from_input(event: &EventInput) -> Self {
        Self {
            event_name: event.event_name.clone(),
            event_time: event.event_time,
            event_id: event.event_id.clone(),
            user_data: UserData {
                ph: hash_identifier(&event.phone),
                external_id: hash_identifier(&event.user_id),
                fbp: event.fbp.clone(),
                client_ip_address: event.client_ip_address.clone(),
                client_user_agent: event.client_user_agent.clone(),
            },
            custom_data: CustomData {
                currency: event.currency_or_default().to_string(),
                value: event.value.clone(),
                content_ids: event.content_ids.clone(),
                content_type: event.content_type.clone(),
                order_number: event.order_id.clone(),
            },
            event_source_url: event.event_source_url.clone(),
            action_source: ACTION_SOURCE,
        }
    }
}

/// Assemble the full request body for a single event
pub fn build_request(credentials: &Credentials, event: &EventInput, test_event_code: Option<&str>) -> RequestBody {
    RequestBody {
        access_token: credentials.access_token().to_string(),
        data: vec![ServerEvent::from_input(event)],
        test_event_code: test_event_code.map(str::to_string),
    }
}
