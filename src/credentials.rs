use std::fmt;

use crate::error::ConversionsError;

/// Secrets needed to talk to the Conversions API for one pixel
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_token: String,
    pixel_id: String,
}

impl Credentials {
    /// Build credentials, rejecting empty values up front
    pub fn new(access_token: impl Into<String>, pixel_id: impl Into<String>) -> Result<Self, ConversionsError> {
        let access_token = access_token.into();
        let pixel_id = pixel_id.into();

        if access_token.trim().is_empty() {
            return Err(ConversionsError::configuration("access_token is not configured"));
        }
        if pixel_id.trim().is_empty() {
            return Err(ConversionsError::configuration("pixel_id is not configured"));
        }

        Ok(Self { access_token, pixel_id })
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn pixel_id(&self) -> &str {
        &self.pixel_id
    }
}

// The token must never end up in logs through a stray `{:?}`.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &mask_secret(&self.access_token))
            .field("pixel_id", &self.pixel_id)
            .finish()
    }
}

/// Mask a secret for display, keeping the last four characters
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}
