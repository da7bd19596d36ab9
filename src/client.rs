use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use exn::{OptionExt, ResultExt};
use toucan_cache::DEFAULT_CACHE_PATH;
use toucan_config::{AuthConfig, Config};
use toucan_dispatch::{Auth, DispatcherHandle, HttpDispatcher, RequestOptions};
use tracing::info;

use crate::error::{ErrorKind, Result};
use crate::requester::SmallAppRequester;

/// Registry of the small apps of one project.
///
/// Each instance gets its own [`SmallAppRequester`] rooted at
/// `<base_url>/<instance>`, and its own cache directory
/// `<cache_path>/<instance>`. All of them share one dispatcher.
#[derive(Debug)]
pub struct ToucanClient {
    base_url: String,
    instances: BTreeMap<String, SmallAppRequester>,
}

impl ToucanClient {
    pub fn builder(base_url: impl Into<String>) -> ToucanClientBuilder {
        ToucanClientBuilder::new(base_url)
    }

    /// Builds a client from a loaded configuration, talking HTTP.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::builder_from_config(config).map(ToucanClientBuilder::build)
    }

    /// Same as [`from_config`](Self::from_config), but lets the caller adjust
    /// the builder (typically to swap the dispatcher).
    pub fn builder_from_config(config: &Config) -> Result<ToucanClientBuilder> {
        config.validate().or_raise(|| ErrorKind::Config)?;
        let mut builder = ToucanClientBuilder::new(&config.base_url)
            .instances(config.instances.iter().cloned())
            .cache_path(&config.cache_path);
        if let Some(stage) = &config.stage {
            builder = builder.stage(stage);
        }
        builder = match &config.auth {
            Some(AuthConfig::Basic { username, password }) => {
                builder.auth(Auth::Basic { username: username.clone(), password: password.clone() })
            },
            Some(AuthConfig::Token { token }) => builder.token(token),
            None => builder,
        };
        Ok(builder)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn instance_names(&self) -> impl Iterator<Item = &str> {
        self.instances.keys().map(String::as_str)
    }

    pub fn instance(&mut self, name: &str) -> Result<&mut SmallAppRequester> {
        self.instances.get_mut(name).ok_or_raise(|| ErrorKind::UnknownInstance(name.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct ToucanClientBuilder {
    base_url: String,
    instances: Vec<String>,
    auth: Option<Auth>,
    token: Option<String>,
    stage: Option<String>,
    cache_path: Option<PathBuf>,
    dispatcher: Option<DispatcherHandleDebug>,
}

// `dyn Dispatcher` has no `Debug`; only its name is shown.
struct DispatcherHandleDebug(DispatcherHandle);

impl std::fmt::Debug for DispatcherHandleDebug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.name())
    }
}

impl ToucanClientBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Self::default() }
    }

    pub fn instance(mut self, name: impl Into<String>) -> Self {
        self.instances.push(name.into());
        self
    }

    pub fn instances<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instances.extend(names.into_iter().map(Into::into));
        self
    }

    /// Credentials sent with every request. Takes precedence over
    /// [`token`](Self::token).
    pub fn auth(mut self, auth: Auth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Bearer token, sent as `Authorization: Bearer <token>`.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    /// Parent of the per-instance cache directories.
    pub fn cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Defaults to an [`HttpDispatcher`].
    pub fn dispatcher(mut self, dispatcher: DispatcherHandle) -> Self {
        self.dispatcher = Some(DispatcherHandleDebug(dispatcher));
        self
    }

    pub fn build(self) -> ToucanClient {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        let auth = self.auth.or(self.token.map(Auth::Bearer));
        let options = RequestOptions::new().with_auth(auth);
        let cache_path = self.cache_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH));
        let dispatcher = match self.dispatcher {
            Some(DispatcherHandleDebug(dispatcher)) => dispatcher,
            None => Arc::new(HttpDispatcher::new()),
        };

        let instances: BTreeMap<_, _> = self
            .instances
            .into_iter()
            .map(|name| {
                let mut requester = SmallAppRequester::new(format!("{base_url}/{name}"), dispatcher.clone())
                    .with_options(options.clone())
                    .with_cache_path(cache_path.join(&name));
                if let Some(stage) = &self.stage {
                    requester.set_stage(stage);
                }
                (name, requester)
            })
            .collect();

        info!(
            project = %base_url,
            instances = ?instances.keys().collect::<Vec<_>>(),
            dispatcher = dispatcher.name(),
            "Created Toucan client"
        );
        ToucanClient { base_url, instances }
    }
}
