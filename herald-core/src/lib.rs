//! Herald core library: domain types, template model, errors, config, and
//! the collaborator traits the reconciler talks through.
//!
//! - [`types`]: announcement items, namespace prefix, modes, push messages
//! - [`template`]: Remote Config template model with round-tripping extras
//! - [`input`]: announcement list loading (file or single-item flags)
//! - [`config`]: `~/.herald/config.yaml`
//! - [`store`]: [`TemplateStore`] / [`PushTransport`] plus local stores
//! - [`error`]: input, store, notify and config errors

pub mod config;
pub mod error;
pub mod input;
pub mod store;
pub mod template;
pub mod types;

pub use config::HeraldConfig;
pub use error::{ConfigError, InputError, NotifyError, StoreError};
pub use store::{FileTemplateStore, MemoryTemplateStore, PushTransport, TemplateStore};
pub use template::{DefaultValue, Parameter, Template};
pub use types::{
    AnnouncementItem, ClearVariant, Mode, NamespacePrefix, PublishReceipt, PushMessage,
};
