//! Server-side event reporting to the Facebook Conversions API.
//!
//! Build an [`EventSubmitter`] once from [`Credentials`] and [`SubmitterSettings`]
//! (or straight from a loaded [`Config`]) and call [`EventSubmitter::submit`] once per event.
//! Phone numbers and user ids are SHA-256 hashed before they leave the process.

pub mod config;
pub mod credentials;
pub mod error;
pub mod event;
pub mod payload;
pub mod submitter;

pub use config::Config;
pub use credentials::Credentials;
pub use error::ConversionsError;
pub use event::EventInput;
pub use payload::{RequestBody, hash_identifier};
pub use submitter::{EventSubmitter, SubmitterSettings};
