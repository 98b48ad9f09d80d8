//! # Application
//!
//! [`App`] owns the router, the spec and everything shared between
//! procedures: app-level locals, root interceptors and the injector.
//!
//! Mounting a procedure:
//!
//! 1. snapshots the current locals and root interceptors into the procedure,
//! 2. binds it at its canonical path (`/post/list/`) and at the same path
//!    without the trailing slash,
//! 3. appends a spec entry whose path is exactly the bound canonical path.
//!
//! Locals and root interceptors added after a mount do not affect
//! procedures mounted earlier.

use std::collections::{BTreeMap, BTreeSet};
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use serde_json::Value;
use tower_http::trace::TraceLayer;
use xrpc_core::{join_paths, Spec, SpecError, SpecProcedure};

use crate::config::AppConfig;
use crate::context::RequestScope;
use crate::error::{RegistrationError, ServeError};
use crate::flow::{FlowFuture, RootInterceptor};
use crate::inject::Injector;
use crate::procedure::{Endpoint, Mount};

/// A set of procedures served together.
pub struct App {
    config: AppConfig,
    router: Router,
    spec: Spec,
    paths: BTreeSet<String>,
    locals: BTreeMap<String, Value>,
    interceptors: Vec<RootInterceptor>,
    injector: Arc<Injector>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("config", &self.config)
            .field("paths", &self.paths)
            .field("interceptors", &self.interceptors.len())
            .finish_non_exhaustive()
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let spec = Spec::new(config.name.clone(), config.server_url.clone());
        Self {
            config,
            router: Router::new(),
            spec,
            paths: BTreeSet::new(),
            locals: BTreeMap::new(),
            interceptors: Vec::new(),
            injector: Arc::new(Injector::new()),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Append a root interceptor for procedures mounted from now on.
    pub fn intercept<F>(&mut self, interceptor: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut RequestScope) -> FlowFuture<'a> + Send + Sync + 'static,
    {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Set an app-level local seen by procedures mounted from now on.
    pub fn set_local(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.locals.insert(key.into(), value.into());
        self
    }

    pub fn locals(&self) -> &BTreeMap<String, Value> {
        &self.locals
    }

    /// The service container shared by every procedure.
    pub fn injector(&self) -> &Arc<Injector> {
        &self.injector
    }

    /// Mount one endpoint at its own name.
    pub fn mount(&mut self, endpoint: Endpoint) -> Result<String, RegistrationError> {
        self.mount_at("", endpoint)
    }

    /// Mount endpoints under `prefix`. Returns the canonical paths in order.
    ///
    /// All paths are checked before any endpoint is mounted, so a failing
    /// batch leaves the router and spec unchanged.
    pub fn router(
        &mut self,
        prefix: &str,
        endpoints: impl IntoIterator<Item = Endpoint>,
    ) -> Result<Vec<String>, RegistrationError> {
        let endpoints: Vec<Endpoint> = endpoints.into_iter().collect();
        let mut batch = BTreeSet::new();
        for endpoint in &endpoints {
            let path = join_paths([prefix, endpoint.name()]);
            self.check_available(&path)?;
            if !batch.insert(path.clone()) {
                return Err(RegistrationError::DuplicatePath { path });
            }
        }
        endpoints
            .into_iter()
            .map(|endpoint| self.mount_at(prefix, endpoint))
            .collect()
    }

    fn check_available(&self, path: &str) -> Result<(), RegistrationError> {
        check_path(path)?;
        if self.paths.contains(path) {
            return Err(RegistrationError::DuplicatePath {
                path: path.to_string(),
            });
        }
        Ok(())
    }

    fn mount_at(&mut self, prefix: &str, endpoint: Endpoint) -> Result<String, RegistrationError> {
        let path = join_paths([prefix, endpoint.name()]);
        self.check_available(&path)?;

        let (kind, input, output, install) = endpoint.into_parts();
        let route = install(Mount {
            path: path.clone(),
            locals: Arc::new(self.locals.clone()),
            injector: Arc::clone(&self.injector),
            root: self.interceptors.iter().cloned().collect(),
        });

        let mut router = std::mem::take(&mut self.router).route(&path, route.clone());
        let alias = path.trim_end_matches('/');
        if !alias.is_empty() {
            router = router.route(alias, route);
        }
        self.router = router;

        self.paths.insert(path.clone());
        self.spec.push(SpecProcedure {
            path: path.clone(),
            kind,
            input,
            output,
        });
        tracing::info!(path = %path, kind = %kind, "mapped procedure");
        Ok(path)
    }

    /// The spec accumulated so far.
    pub fn spec(&self) -> &Spec {
        &self.spec
    }

    /// Write the spec to the configured path.
    pub fn write_spec(&self) -> Result<(), SpecError> {
        self.spec.write(&self.config.spec_path)?;
        tracing::info!(
            path = %self.config.spec_path.display(),
            procedures = self.spec.procedures.len(),
            "wrote spec"
        );
        Ok(())
    }

    /// The finished router with request tracing and the body limit applied.
    pub fn into_router(self) -> Router {
        self.router
            .layer(DefaultBodyLimit::max(self.config.body_limit))
            .layer(TraceLayer::new_for_http())
    }

    /// Write the spec if enabled, then serve on the configured port.
    pub async fn serve(self) -> Result<(), ServeError> {
        if self.config.auto_gen_spec {
            self.write_spec()?;
        }
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|source| ServeError::Bind { addr, source })?;
        tracing::info!(%addr, name = %self.config.name, "xrpc listening");
        axum::serve(listener, self.into_router()).await?;
        Ok(())
    }
}

/// Reject segments the router would read as captures or wildcards.
fn check_path(path: &str) -> Result<(), RegistrationError> {
    let invalid = |reason| RegistrationError::InvalidPath {
        path: path.to_string(),
        reason,
    };
    if path.contains(['{', '}']) {
        return Err(invalid("braces are reserved for path captures"));
    }
    if path
        .split('/')
        .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
    {
        return Err(invalid("segments may not start with ':' or '*'"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_path_rejects_captures() {
        assert!(check_path("/post/list/").is_ok());
        assert!(check_path("/post/{id}/").is_err());
        assert!(check_path("/post/:id/").is_err());
        assert!(check_path("/files/*rest/").is_err());
    }
}
