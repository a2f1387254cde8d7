//! # herald-remote
//!
//! Google Cloud adapters for the herald collaborator traits:
//!
//! - [`RemoteConfigStore`]: Remote Config REST v1 as a
//!   [`herald_core::TemplateStore`]
//! - [`MessagingTransport`]: FCM HTTP v1 as a [`herald_core::PushTransport`]
//! - [`StorageClient`]: Firebase Storage downloads
//!
//! All three share one [`CloudClient`].

pub mod client;
pub mod error;
pub mod messaging;
pub mod remote_config;
pub mod storage;

pub use client::{access_token_from_env, CloudClient, Endpoints, PROJECT_ENV_VAR};
pub use error::RemoteError;
pub use messaging::MessagingTransport;
pub use remote_config::RemoteConfigStore;
pub use storage::StorageClient;
