//! Dependency injection
//!
//! Components name what they need; the [`Injector`] orders construction with
//! a [`DependencyGraph`] and resolves each name against the already built
//! modules or the [`ServiceTable`].

mod container;
mod graph;
mod injector;
mod services;

pub use container::{Container, Instance};
pub use graph::{DependencyGraph, Resolution};
pub use injector::{Built, Injected, Injector};
pub use services::{ERRORS, KVSTORE, LOG, PARAMS, ServiceTable};
