use std::time::Duration;

use log::{debug, error};
use serde_json::Value;
use ureq::Agent;

use crate::config::{Config, PRODUCTION};
use crate::credentials::Credentials;
use crate::error::ConversionsError;
use crate::event::EventInput;
use crate::payload::{RequestBody, build_request};

pub const DEFAULT_GRAPH_API_BASE: &str = "https://graph.facebook.com";
pub const DEFAULT_API_VERSION: &str = "v17.0";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Everything about an [`EventSubmitter`] other than its credentials
#[derive(Debug, Clone)]
pub struct SubmitterSettings {
    /// Name of the running environment; production never attaches a test event code
    pub environment: String,
    pub test_event_code: Option<String>,
    pub graph_api_base: String,
    pub api_version: String,
    pub timeout: Duration,
}

impl SubmitterSettings {
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case(PRODUCTION)
    }

    /// Reject settings that would make every request fail
    pub fn validate(&self) -> Result<(), ConversionsError> {
        if self.timeout.is_zero() {
            return Err(ConversionsError::configuration("timeout must be greater than zero"));
        }
        if self.api_version.trim_matches('/').trim().is_empty() {
            return Err(ConversionsError::configuration("api_version is not configured"));
        }
        if self.graph_api_base.trim().is_empty() {
            return Err(ConversionsError::configuration("graph_api_base is not configured"));
        }
        Ok(())
    }
}

impl Default for SubmitterSettings {
    fn default() -> Self {
        Self {
            environment: PRODUCTION.to_string(),
            test_event_code: None,
            graph_api_base: DEFAULT_GRAPH_API_BASE.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Sends one event per call to the Conversions API.
///
/// Holds only immutable state, so a single instance can be shared between threads
/// (wrap it in an `Arc`); every call builds and owns its own payload.
pub struct EventSubmitter {
    credentials: Credentials,
    settings: SubmitterSettings,
    endpoint: String,
    agent: Agent,
}

impl EventSubmitter {
    pub fn new(credentials: Credentials, settings: SubmitterSettings) -> Self {
        let endpoint = format!(
            "{}/{}/{}/events",
            settings.graph_api_base.trim_end_matches('/'),
            settings.api_version.trim_matches('/'),
            credentials.pixel_id()
        );

        // Non-2xx responses are read like any other so the API error body can be reported.
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(settings.timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            credentials,
            settings,
            endpoint,
            agent,
        }
    }

    /// Build a submitter from loaded configuration, failing if a secret is missing or a setting is unusable
    pub fn from_config(config: &Config) -> Result<Self, ConversionsError> {
        let credentials = Credentials::new(
            config.access_token.clone().unwrap_or_default(),
            config.pixel_id.clone().unwrap_or_default(),
        )?;
        let settings = config.submitter_settings();
        settings.validate()?;
        Ok(Self::new(credentials, settings))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Test event code to attach, never in production
    pub fn effective_test_event_code(&self) -> Option<&str> {
        if self.settings.is_production() {
            None
        } else {
            self.settings.test_event_code.as_deref()
        }
    }

    /// The body `submit` would send for this event
    pub fn preview(&self, event: &EventInput) -> RequestBody {
        build_request(&self.credentials, event, self.effective_test_event_code())
    }

    /// Submit one event and return the decoded response of the Graph API
    pub fn submit(&self, event: &EventInput) -> Result<Value, ConversionsError> {
        log_failure(self.send(event))
    }

    /// Parse a loosely-typed event mapping and submit it
    pub fn submit_value(&self, data: &Value) -> Result<Value, ConversionsError> {
        log_failure(EventInput::from_value(data).and_then(|event| self.send(&event)))
    }

    /// Like [`submit`](Self::submit), but any failure collapses to `None`
    pub fn submit_or_none(&self, event: &EventInput) -> Option<Value> {
        self.submit(event).ok()
    }

    fn send(&self, event: &EventInput) -> Result<Value, ConversionsError> {
        let body = self.preview(event);
        debug!("POST {} event_name={} event_id={}", self.endpoint, event.event_name, event.event_id);

        let mut response = self
            .agent
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .send_json(&body)
            .map_err(|e| ConversionsError::Transport { message: e.to_string() })?;

        let status = response.status();
        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ConversionsError::Transport { message: e.to_string() })?;

        if !status.is_success() {
            return Err(ConversionsError::Rejected {
                status: status.as_u16(),
                body: text,
            });
        }

        let decoded: Value =
            serde_json::from_str(&text).map_err(|e| ConversionsError::Decode { message: e.to_string() })?;
        debug!("Event {} accepted: {}", event.event_id, decoded);
        Ok(decoded)
    }
}

fn log_failure(result: Result<Value, ConversionsError>) -> Result<Value, ConversionsError> {
    if let Err(e) = &result {
        error!("Facebook Conversions API error: {}", e);
    }
    result
}
