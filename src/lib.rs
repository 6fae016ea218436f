//! # Tessera
//!
//! Dependency injection and lifecycle orchestration for axum services.
//!
//! An application is a set of named components:
//!
//! - **Modules**: singletons holding application logic. Modules are
//!   injectable into every other component.
//! - **Resources**: REST handlers served under a base path.
//! - **Routes**: free-form path mappings.
//!
//! Each component is described by a [`ComponentDescriptor`] that lists the
//! names it depends on and the lifecycle events it handles. `init` builds
//! every component after its dependencies, then the `postinit`, `prelisten`,
//! `postlisten` and `preclose` events run the registered handlers in
//! dependency order (reverse order for `preclose`).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tessera::prelude::*;
//!
//! struct Users {
//!     names: Vec<String>,
//! }
//!
//! struct UsersResource {
//!     users: Arc<Users>,
//! }
//!
//! #[async_trait]
//! impl Resource for UsersResource {
//!     fn base_path(&self) -> &str {
//!         "/api/user"
//!     }
//!
//!     async fn get_all(&self, _request: RequestContext) -> HandlerResult {
//!         Ok(Json(self.users.names.clone()).into_response())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut app = Application::new();
//!
//!     app.module(
//!         ComponentDescriptor::module(|_: &mut Injected| {
//!             Ok(Users { names: vec!["Joe".into(), "Jane".into()] })
//!         })
//!         .named("users"),
//!     )?;
//!     app.resource(
//!         ComponentDescriptor::resource(|deps: &mut Injected| {
//!             Ok(UsersResource { users: deps.next()? })
//!         })
//!         .inject(["users"]),
//!     )?;
//!
//!     app.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Injectable services
//!
//! Besides modules, every component can inject:
//!
//! | Name        | Type                                  |
//! |-------------|---------------------------------------|
//! | `$E`        | [`ErrorKinds`](exception::ErrorKinds) |
//! | `$log`      | [`Logger`] scoped to the component    |
//! | `$params`   | [`ConfigService`]                     |
//! | `$kvstore`  | [`KvStore`]                           |
//!
//! and anything added with [`Application::provide`].

pub mod component;
pub mod config;
pub mod di;
pub mod error;
pub mod exception;
pub mod kvstore;
pub mod lifecycle;
pub mod logger;
pub mod meta;
pub mod mount;
pub mod resource;
pub mod routes;
pub mod scan;

// Re-export core types
pub use component::{ComponentDescriptor, DescriptorBuilder};
pub use config::ConfigService;
pub use di::{Container, Injected, Instance};
pub use error::{Result, TesseraError};
pub use exception::{ApplicationError, ErrorKinds};
pub use kvstore::KvStore;
pub use lifecycle::{Application, ApplicationBuilder, LifecycleEvent, LifecycleState};
pub use logger::Logger;
pub use meta::{ClassId, MetadataRegistry, Role};
pub use mount::{Mounted, RouteKey};
pub use resource::{HandlerResult, RequestContext, Resource};
pub use routes::{RouteMapper, Routes};
pub use scan::{Loader, Scanner};

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use tessera::prelude::*;
/// ```
pub mod prelude {
    pub use crate::component::{ComponentDescriptor, DescriptorBuilder};
    pub use crate::config::ConfigService;
    pub use crate::di::{Injected, Instance};
    pub use crate::error::{Result, TesseraError};
    pub use crate::exception::{ApplicationError, ErrorKinds};
    pub use crate::kvstore::KvStore;
    pub use crate::lifecycle::{
        Application, ApplicationBuilder, LifecycleError, LifecycleEvent, LifecycleState,
        shutdown_signal,
    };
    pub use crate::logger::Logger;
    pub use crate::resource::{HandlerResult, RequestContext, Resource};
    pub use crate::routes::{RouteMapper, Routes};
    pub use crate::scan::{Loader, Scanner};
    pub use async_trait::async_trait;
    pub use axum::{
        Json, Router,
        http::StatusCode,
        response::{Html, IntoResponse, Response},
    };
    pub use std::sync::Arc;
}
