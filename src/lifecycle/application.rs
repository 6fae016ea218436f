//! Application Bootstrap
//!
//! Registration surface, lifecycle state machine and HTTP server wiring.

use super::{LifecycleError, LifecycleEvent, LifecycleManager, LifecycleState, shutdown_signal};
use crate::component::{ComponentDescriptor, Registered};
use crate::config::{self, ConfigService};
use crate::di::{Container, Injector, Instance, ServiceTable};
use crate::error::{Result, TesseraError};
use crate::kvstore::KvStore;
use crate::meta::{MetadataRegistry, Role};
use crate::mount::RouteTable;
use axum::Router;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

struct Server {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

/// A Tessera application
///
/// Components are registered first, then the application moves through
/// `init` → `listen` → `close`.
///
/// # Example
///
/// ```rust,ignore
/// use tessera::prelude::*;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let mut app = Application::new();
///     app.set("port", "9080");
///     app.module(users_descriptor())?;
///     app.resource(users_resource_descriptor())?;
///
///     app.init().await?;
///     app.listen().await?;
///
///     shutdown_signal().await;
///     app.close().await?;
///     Ok(())
/// }
/// ```
pub struct Application {
    config: ConfigService,
    metadata: MetadataRegistry,
    services: ServiceTable,
    components: Vec<Registered>,
    container: Container,
    lifecycle: LifecycleManager,
    phase_timeout: Option<Duration>,
    state: LifecycleState,
    router: Option<Router>,
    server: Option<Server>,
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

impl Application {
    pub fn new() -> Self {
        ApplicationBuilder::new().build()
    }

    /// Create a new application builder
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::new()
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn config(&self) -> &ConfigService {
        &self.config
    }

    pub fn metadata(&self) -> &MetadataRegistry {
        &self.metadata
    }

    /// Set a configuration value
    pub fn set(&self, key: &str, value: &str) {
        self.config.set(key, value);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key)
    }

    /// Make `value` injectable as `name`.
    pub fn provide<T: 'static + Send + Sync>(&self, name: impl Into<String>, value: T) {
        self.services.provide(name, value);
    }

    /// Register a module
    pub fn module(&mut self, descriptor: impl Into<ComponentDescriptor>) -> Result<()> {
        self.register(Role::Module, descriptor.into())
    }

    /// Register a REST resource
    pub fn resource(&mut self, descriptor: impl Into<ComponentDescriptor>) -> Result<()> {
        self.register(Role::Resource, descriptor.into())
    }

    /// Register a routes class
    pub fn routes(&mut self, descriptor: impl Into<ComponentDescriptor>) -> Result<()> {
        self.register(Role::Routes, descriptor.into())
    }

    fn register(&mut self, role: Role, descriptor: ComponentDescriptor) -> Result<()> {
        self.expect_state(&[LifecycleState::Uninitialized])?;

        if descriptor.role() != role {
            return Err(TesseraError::illegal_value(format!(
                "{:?} is described as a {} and cannot be registered as a {}",
                descriptor.class(),
                descriptor.role(),
                role
            )));
        }

        let name = descriptor.name();
        if name.is_empty() {
            return Err(TesseraError::illegal_value(format!(
                "{:?} has an empty name",
                descriptor.class()
            )));
        }
        if self.components.iter().any(|c| c.name() == name) {
            return Err(TesseraError::DuplicateRegistration { name });
        }
        if let Some(existing) = self
            .components
            .iter()
            .find(|c| c.class() == descriptor.class())
        {
            return Err(TesseraError::illegal_value(format!(
                "{:?} is already registered as '{}'",
                descriptor.class(),
                existing.name()
            )));
        }
        if role == Role::Module && self.services.contains(&name) {
            tracing::warn!("Module '{}' shadows the service of the same name", name);
        }

        tracing::debug!("Registered {} '{}'", role, name);
        self.components.push(descriptor.register(&self.metadata));
        Ok(())
    }

    /// Build every component and run `postinit` handlers.
    ///
    /// On failure no instance is kept; the application stays in the state
    /// it reached.
    pub async fn init(&mut self) -> Result<()> {
        self.expect_state(&[LifecycleState::Uninitialized])?;
        tracing::info!("Starting application initialization...");

        let built = Injector::new(&self.components, &self.metadata, &self.services).build()?;
        let order: Vec<&Registered> = built.order.iter().map(|&i| &self.components[i]).collect();
        let lifecycle = LifecycleManager::collect(
            order.iter().map(|c| (c.name(), c.class())),
            &built.container,
            &self.metadata,
        )
        .with_timeout(self.phase_timeout);
        let router = self.assemble_router(&order, &built.container)?;

        self.container = built.container;
        self.lifecycle = lifecycle;
        self.state = LifecycleState::ModulesBuilt;
        tracing::info!("{} components built", self.container.len());

        self.lifecycle.dispatch(LifecycleEvent::PostInit).await?;

        self.router = Some(router);
        self.state = LifecycleState::Initialized;
        tracing::info!("Application initialization complete");
        Ok(())
    }

    fn assemble_router(&self, order: &[&Registered], container: &Container) -> Result<Router> {
        let mut router = Router::new();
        let mut table = RouteTable::new();
        for component in order {
            let Some(instance) = container.get(component.name()) else {
                continue;
            };
            if let Some(mounted) = component.mount(instance) {
                let mounted = mounted?;
                for route in &mounted.routes {
                    table.claim(component.name(), route)?;
                }
                router = router.merge(mounted.router);
            }
        }
        tracing::debug!("{} routes mounted", table.len());

        if let Some(directory) = self.config.get(config::PUBLIC_DIRECTORY) {
            tracing::debug!("Serving static files from {}", directory);
            router = router.fallback_service(ServeDir::new(PathBuf::from(directory)));
        }

        Ok(router.layer(TraceLayer::new_for_http()))
    }

    /// The assembled HTTP router, available once initialized.
    pub fn router(&self) -> Result<Router> {
        self.router.clone().ok_or_else(|| TesseraError::InvalidState {
            expected: LifecycleState::Initialized.to_string(),
            actual: self.state.to_string(),
        })
    }

    /// Look up a constructed component instance.
    pub fn instance<T: 'static + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        self.container.resolve(name)
    }

    pub fn instance_any(&self, name: &str) -> Option<Instance> {
        self.container.get(name)
    }

    /// Run `prelisten` handlers, bind the listener and start serving, then
    /// run `postlisten` handlers. Returns the bound address.
    pub async fn listen(&mut self) -> Result<SocketAddr> {
        self.expect_state(&[LifecycleState::Initialized])?;
        let router = self.router()?;
        let addr = format!("{}:{}", self.config.host(), self.config.port()?);

        self.lifecycle.dispatch(LifecycleEvent::PreListen).await?;

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| LifecycleError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr()?;

        let (shutdown, signal) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = signal.await;
                })
                .await
        });
        self.server = Some(Server {
            local_addr,
            shutdown,
            task,
        });
        self.state = LifecycleState::Listening;
        tracing::info!("Listening on http://{}", local_addr);

        self.lifecycle.dispatch(LifecycleEvent::PostListen).await?;
        Ok(local_addr)
    }

    /// Address of the running listener
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.as_ref().map(|server| server.local_addr)
    }

    /// Run `preclose` handlers in reverse dependency order, then release
    /// the listener.
    ///
    /// The listener is released even when a handler fails; the first
    /// handler error is still returned.
    pub async fn close(&mut self) -> Result<()> {
        self.expect_state(&[LifecycleState::Initialized, LifecycleState::Listening])?;
        tracing::info!("Shutting down application...");
        self.state = LifecycleState::Closing;

        let handlers = self.lifecycle.dispatch(LifecycleEvent::PreClose).await;

        let released = match self.server.take() {
            Some(server) => {
                let _ = server.shutdown.send(());
                match server.task.await {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => Err(LifecycleError::Server(e.to_string())),
                    Err(e) => Err(LifecycleError::Server(e.to_string())),
                }
            }
            None => Ok(()),
        };

        self.state = LifecycleState::Closed;
        handlers?;
        released?;
        tracing::info!("Application shutdown complete");
        Ok(())
    }

    /// `init`, `listen`, wait for SIGINT/SIGTERM, then `close`.
    pub async fn run(&mut self) -> Result<()> {
        self.init().await?;
        self.listen().await?;
        shutdown_signal().await;
        self.close().await
    }

    fn expect_state(&self, allowed: &[LifecycleState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(TesseraError::InvalidState {
                expected: allowed
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" or "),
                actual: self.state.to_string(),
            })
        }
    }
}

/// Builder for Application
pub struct ApplicationBuilder {
    config: ConfigService,
    kvstore: KvStore,
    phase_timeout: Option<Duration>,
}

impl Default for ApplicationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationBuilder {
    /// Create a new application builder
    pub fn new() -> Self {
        Self {
            config: ConfigService::new(),
            kvstore: KvStore::new(),
            phase_timeout: None,
        }
    }

    /// Use `config` as the settings store
    pub fn config(mut self, config: ConfigService) -> Self {
        self.config = config;
        self
    }

    /// Use `kvstore` as the `$kvstore` service
    pub fn kvstore(mut self, kvstore: KvStore) -> Self {
        self.kvstore = kvstore;
        self
    }

    /// Bound each lifecycle phase; phases wait indefinitely by default
    pub fn phase_timeout(mut self, timeout: Duration) -> Self {
        self.phase_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Application {
        let services = ServiceTable::with_core(self.config.clone(), self.kvstore);
        Application {
            config: self.config,
            metadata: MetadataRegistry::new(),
            services,
            components: Vec::new(),
            container: Container::new(),
            lifecycle: LifecycleManager::new(),
            phase_timeout: self.phase_timeout,
            state: LifecycleState::Uninitialized,
            router: None,
            server: None,
        }
    }
}
