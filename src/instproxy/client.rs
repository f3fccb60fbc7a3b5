use super::errors::InstallProxyErrorKind;
use super::native::NativeInstallationProxy;
use crate::bridge::{PageUpdate, ProgressSink, RequestProgress, perform};
use crate::codec::{self, Node};
use crate::config::BridgeConfig;
use crate::errors::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Lockdown service identifier of the installation proxy.
pub const SERVICE_NAME: &str = "com.apple.mobile.installation_proxy";

/// Async client over a native installation proxy connection.
///
/// Progress closures run on the native callback thread, in the order the
/// native layer reports. A completed verb sees no further progress; a verb
/// that timed out or was dropped keeps receiving it until the native side
/// delivers its terminal status.
pub struct InstallationProxyClient<N> {
    native: N,
    timeout: Option<Duration>,
}

impl<N: NativeInstallationProxy> InstallationProxyClient<N> {
    pub fn new(native: N) -> Self {
        Self {
            native,
            timeout: None,
        }
    }

    /// Create a client using the operation timeout from `config`.
    pub fn with_config(native: N, config: &BridgeConfig) -> Self {
        Self::new(native).with_timeout(config.operation_timeout())
    }

    /// Bound every long-running request. `None` waits indefinitely.
    ///
    /// A timed-out request keeps running natively; only the wait is abandoned.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn native(&self) -> &N {
        &self.native
    }

    /// Install (or upgrade) the package at `package`.
    pub async fn install<O>(
        &self,
        package: &Path,
        upgrade: bool,
        options: &O,
        progress: impl Fn(RequestProgress) + Send + Sync + 'static,
    ) -> Result<()>
    where
        O: Serialize + ?Sized,
    {
        let options = codec::encode(options)?;
        debug!(package = %package.display(), upgrade, "installing package");

        perform(ProgressSink::progress(progress), self.timeout, |callback, context| {
            let code = if upgrade {
                self.native.upgrade(package, &options, callback, context)
            } else {
                self.native.install(package, &options, callback, context)
            };
            InstallProxyErrorKind::check(code)
        })
        .await
    }

    pub async fn uninstall<O>(
        &self,
        bundle_id: &str,
        options: &O,
        progress: impl Fn(RequestProgress) + Send + Sync + 'static,
    ) -> Result<()>
    where
        O: Serialize + ?Sized,
    {
        let options = codec::encode(options)?;
        debug!(bundle_id, "uninstalling application");

        perform(ProgressSink::progress(progress), self.timeout, |callback, context| {
            InstallProxyErrorKind::check(
                self.native.uninstall(bundle_id, &options, callback, context),
            )
        })
        .await
    }

    pub async fn archive<O>(
        &self,
        app: &str,
        options: &O,
        progress: impl Fn(RequestProgress) + Send + Sync + 'static,
    ) -> Result<()>
    where
        O: Serialize + ?Sized,
    {
        let options = codec::encode(options)?;
        debug!(app, "archiving application");

        perform(ProgressSink::progress(progress), self.timeout, |callback, context| {
            InstallProxyErrorKind::check(self.native.archive(app, &options, callback, context))
        })
        .await
    }

    pub async fn restore<O>(
        &self,
        app: &str,
        options: &O,
        progress: impl Fn(RequestProgress) + Send + Sync + 'static,
    ) -> Result<()>
    where
        O: Serialize + ?Sized,
    {
        let options = codec::encode(options)?;
        debug!(app, "restoring application archive");

        perform(ProgressSink::progress(progress), self.timeout, |callback, context| {
            InstallProxyErrorKind::check(self.native.restore(app, &options, callback, context))
        })
        .await
    }

    pub async fn remove_archive(
        &self,
        app: &str,
        progress: impl Fn(RequestProgress) + Send + Sync + 'static,
    ) -> Result<()> {
        debug!(app, "removing application archive");

        perform(ProgressSink::progress(progress), self.timeout, |callback, context| {
            InstallProxyErrorKind::check(self.native.remove_archive(app, None, callback, context))
        })
        .await
    }

    /// Enumerate installed applications page by page.
    ///
    /// A page whose items fail to decode as `T` is reported to `progress` as
    /// an `Err` for that page only; the browse carries on.
    pub async fn browse<T, O>(
        &self,
        options: &O,
        progress: impl Fn(PageUpdate<Result<Vec<T>>>) + Send + Sync + 'static,
    ) -> Result<()>
    where
        T: DeserializeOwned + 'static,
        O: Serialize + ?Sized,
    {
        let options = codec::encode(options)?;
        debug!("browsing applications");

        let sink = ProgressSink::browse(move |page: PageUpdate<Option<Node>>| {
            let items = match page.items {
                Some(node) => codec::decode::<Vec<T>>(node),
                None => Ok(Vec::new()),
            };
            progress(PageUpdate {
                current_index: page.current_index,
                total: page.total,
                items,
            });
        });

        perform(sink, self.timeout, |callback, context| {
            InstallProxyErrorKind::check(self.native.browse(&options, callback, context))
        })
        .await
    }

    /// Look up installed applications, keyed by bundle identifier.
    pub fn lookup<T, O>(&self, apps: &[String], options: &O) -> Result<HashMap<String, T>>
    where
        T: DeserializeOwned,
        O: Serialize + ?Sized,
    {
        let options = codec::encode(options)?;
        let result = self
            .native
            .lookup(apps, &options)
            .map_err(InstallProxyErrorKind::rejected)?
            .ok_or_else(|| Error::internal("lookup returned no result"))?;
        codec::decode(result)
    }

    /// Archived applications, keyed by bundle identifier.
    pub fn lookup_archives<T: DeserializeOwned>(&self) -> Result<HashMap<String, T>> {
        let result = self
            .native
            .lookup_archives(None)
            .map_err(InstallProxyErrorKind::rejected)?
            .ok_or_else(|| Error::internal("archive lookup returned no result"))?;
        codec::decode(result)
    }

    /// Path of the main executable of an installed application.
    pub fn executable_path(&self, bundle_id: &str) -> Result<PathBuf> {
        self.native
            .path_for_bundle_identifier(bundle_id)
            .map_err(InstallProxyErrorKind::rejected)?
            .map(PathBuf::from)
            .ok_or_else(|| Error::internal(format!("no executable path for {bundle_id}")))
    }
}
