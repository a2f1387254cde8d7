//! Global flags and the per-invocation context built from them.
//!
//! Precedence for every setting: flag > environment > config file > default.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::{ArgAction, Args};

use herald_core::{
    config, FileTemplateStore, HeraldConfig, InputError, NamespacePrefix, PushTransport,
    TemplateStore,
};
use herald_reconcile::{StampSource, Stamper};
use herald_remote::{
    access_token_from_env, CloudClient, Endpoints, MessagingTransport, RemoteConfigStore,
    StorageClient,
};

/// Flags accepted by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file (default: ~/.herald/config.yaml).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Firebase / GCP project id.
    #[arg(long, global = true, env = "GOOGLE_CLOUD_PROJECT", value_name = "ID")]
    pub project: Option<String>,

    /// Use a local template JSON file instead of Remote Config.
    #[arg(long, global = true, value_name = "PATH")]
    pub store_file: Option<PathBuf>,

    /// Redirect every Google API call to this base URL (emulators, tests).
    #[arg(long, global = true, env = "HERALD_API_BASE", hide = true)]
    pub api_base: Option<String>,

    /// More logging (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,
}

/// Resolved configuration plus collaborator factories.
pub struct Context {
    pub global: GlobalArgs,
    pub config: HeraldConfig,
    pub home: Option<PathBuf>,
}

impl Context {
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let home = dirs::home_dir();
        let config = match (&global.config, &home) {
            (Some(path), _) => config::load_from(path),
            (None, Some(home)) => config::load_at(home),
            (None, None) => Ok(HeraldConfig::default()),
        }
        .context("failed to load herald config")?;

        Ok(Self {
            global: global.clone(),
            config,
            home,
        })
    }

    fn project_id(&self) -> Option<String> {
        self.global
            .project
            .clone()
            .or_else(|| self.config.project_id.clone())
            .filter(|p| !p.trim().is_empty())
    }

    fn store_file(&self) -> Option<PathBuf> {
        self.global
            .store_file
            .clone()
            .or_else(|| self.config.store_file.clone())
    }

    /// Client for the configured project. Requires a project id and a token.
    pub fn cloud(&self) -> Result<CloudClient, InputError> {
        let project = self.project_id().ok_or(InputError::Missing {
            what: "project id",
            hint: "pass --project, set GOOGLE_CLOUD_PROJECT, or add project_id to ~/.herald/config.yaml",
        })?;
        let token = access_token_from_env().ok_or(InputError::Missing {
            what: "access token",
            hint: "set HERALD_ACCESS_TOKEN (for example from `gcloud auth print-access-token`)",
        })?;
        Ok(self.client(project, Some(token)))
    }

    fn client(&self, project: String, token: Option<String>) -> CloudClient {
        let client = CloudClient::new(
            project,
            token,
            Duration::from_secs(self.config.timeout_secs),
        );
        match &self.global.api_base {
            Some(base) => client.with_endpoints(Endpoints::all_at(base)),
            None => client,
        }
    }

    /// File store when one is configured, Remote Config otherwise.
    pub fn store(&self) -> Result<Arc<dyn TemplateStore>> {
        if let Some(path) = self.store_file() {
            tracing::debug!(path = %path.display(), "using file template store");
            return Ok(Arc::new(FileTemplateStore::new(path)));
        }
        Ok(Arc::new(RemoteConfigStore::new(self.cloud()?)))
    }

    pub fn push(&self) -> Result<Arc<dyn PushTransport>> {
        Ok(Arc::new(MessagingTransport::new(self.cloud()?)))
    }

    /// Storage downloads work without a token for public objects.
    pub fn storage(&self) -> StorageClient {
        let project = self.project_id().unwrap_or_default();
        StorageClient::new(self.client(project, access_token_from_env()))
    }

    pub fn topic(&self, flag: Option<&str>) -> String {
        flag.map(str::to_string)
            .unwrap_or_else(|| self.config.topic.clone())
    }

    pub fn stamper(&self, tz: Option<&str>, via_shell: bool) -> Stamper {
        let zone = tz.unwrap_or(&self.config.timezone);
        let source = if via_shell || self.config.stamp_via_shell {
            StampSource::Shell
        } else {
            StampSource::Builtin
        };
        Stamper::new(zone, source)
    }

    /// Prefix for clear: `--no-prefix` wins, then `--prefix`, then the config value.
    pub fn prefix(
        &self,
        flag: Option<&str>,
        disabled: bool,
    ) -> Result<Option<NamespacePrefix>, InputError> {
        if disabled {
            return Ok(None);
        }
        match flag.or(self.config.prefix.as_deref()) {
            Some(raw) if !raw.is_empty() => NamespacePrefix::parse(raw).map(Some),
            _ => Ok(None),
        }
    }

    pub fn watch_state_path(&self) -> Result<PathBuf> {
        let home = self
            .home
            .as_ref()
            .context("cannot determine home directory for watch state")?;
        Ok(herald_watch::state_path_at(home))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(global: GlobalArgs, config: HeraldConfig) -> Context {
        Context {
            global,
            config,
            home: None,
        }
    }

    #[test]
    fn prefix_flag_overrides_config_and_no_prefix_wins() {
        let c = ctx(GlobalArgs::default(), HeraldConfig::default());
        assert_eq!(c.prefix(None, false).unwrap().unwrap().as_str(), "ABC_");
        assert_eq!(c.prefix(Some("XYZ_"), false).unwrap().unwrap().as_str(), "XYZ_");
        assert!(c.prefix(Some("XYZ_"), true).unwrap().is_none());
        assert!(c.prefix(Some("bad-prefix"), false).is_err());
    }

    #[test]
    fn null_prefix_in_config_disables_it() {
        let config = HeraldConfig {
            prefix: None,
            ..HeraldConfig::default()
        };
        assert!(ctx(GlobalArgs::default(), config).prefix(None, false).unwrap().is_none());
    }

    #[test]
    fn store_file_flag_selects_file_store() {
        let global = GlobalArgs {
            store_file: Some(PathBuf::from("/tmp/template.json")),
            ..GlobalArgs::default()
        };
        let store = ctx(global, HeraldConfig::default()).store().unwrap();
        assert_eq!(store.describe(), "file:/tmp/template.json");
    }

    #[test]
    fn topic_and_timezone_fall_back_to_config() {
        let c = ctx(GlobalArgs::default(), HeraldConfig::default());
        assert_eq!(c.topic(None), "allUsers");
        assert_eq!(c.topic(Some("beta")), "beta");
        assert_eq!(c.stamper(None, false).timezone(), "America/Chicago");
        assert_eq!(c.stamper(Some("Asia/Kolkata"), false).timezone(), "Asia/Kolkata");
    }
}
