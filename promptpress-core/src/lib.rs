//! PromptPress Core Library
//!
//! This crate provides the core functionality for editor-driven AI text
//! generation: a settings store for the single API credential, an HTTP
//! client that reduces every content response to a canonical sequence of
//! texts, a prompt request builder, and the two presentation-layer
//! controllers (generation coordinator, settings form) that sit between a
//! host editor and the remote API.

pub mod client;
pub mod config;
pub mod coordinator;
pub mod form;
pub mod request;

pub use client::{ApiClient, ApiConfig, ApiError, ApiResult, ApiVersion};
pub use config::{SecretString, SettingsError, SettingsSnapshot, SettingsStore};
pub use coordinator::{
    DocumentSnapshot, GenerationCoordinator, HostDocument, Outcome, RunPhase, TextGenerator,
};
pub use form::{FormStatus, SettingsEndpoint, SettingsForm, StoreEndpoint};
pub use request::{BuildError, PromptRequest, PromptRequestBuilder};

/// Returns the version of the PromptPress Core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
