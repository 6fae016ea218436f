//! External service table
//!
//! Injection names that do not name a module are looked up here: the core
//! services every application gets, plus whatever the application provides
//! by name.

use super::Instance;
use crate::config::ConfigService;
use crate::exception::ErrorKinds;
use crate::kvstore::KvStore;
use crate::logger::Logger;
use dashmap::DashMap;
use std::sync::Arc;

/// Application error kinds, see [`ErrorKinds`]
pub const ERRORS: &str = "$E";
/// A [`Logger`] scoped to the requesting component
pub const LOG: &str = "$log";
/// The application [`ConfigService`]
pub const PARAMS: &str = "$params";
/// The shared [`KvStore`]
pub const KVSTORE: &str = "$kvstore";

type ScopedFactory = Arc<dyn Fn(&str) -> Instance + Send + Sync>;

#[derive(Clone)]
enum ServiceEntry {
    Shared(Instance),
    Scoped(ScopedFactory),
}

#[derive(Clone, Default)]
pub struct ServiceTable {
    entries: DashMap<String, ServiceEntry>,
}

impl ServiceTable {
    /// An empty table without core services.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table holding the core services.
    pub fn with_core(config: ConfigService, kvstore: KvStore) -> Self {
        let table = Self::new();
        table.provide(ERRORS, ErrorKinds);
        table.provide(PARAMS, config);
        table.provide(KVSTORE, kvstore);
        table.provide_scoped(LOG, |component| Logger::new(component));
        table
    }

    /// Make `value` injectable as `name`.
    pub fn provide<T: 'static + Send + Sync>(&self, name: impl Into<String>, value: T) {
        self.provide_instance(name, Arc::new(value));
    }

    pub fn provide_instance(&self, name: impl Into<String>, instance: Instance) {
        let name = name.into();
        if self
            .entries
            .insert(name.clone(), ServiceEntry::Shared(instance))
            .is_some()
        {
            tracing::warn!("Service '{}' was provided twice; keeping the latest", name);
        }
    }

    /// Make `name` injectable through a factory called once per requesting component.
    pub fn provide_scoped<T, F>(&self, name: impl Into<String>, factory: F)
    where
        T: 'static + Send + Sync,
        F: Fn(&str) -> T + Send + Sync + 'static,
    {
        let factory: ScopedFactory =
            Arc::new(move |component: &str| -> Instance { Arc::new(factory(component)) });
        self.entries.insert(name.into(), ServiceEntry::Scoped(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Resolve `name` on behalf of `component`.
    pub fn resolve(&self, name: &str, component: &str) -> Option<Instance> {
        let entry = self.entries.get(name)?.value().clone();
        Some(match entry {
            ServiceEntry::Shared(instance) => instance,
            ServiceEntry::Scoped(factory) => factory(component),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_services() {
        let table = ServiceTable::with_core(ConfigService::default(), KvStore::new());
        for name in [ERRORS, LOG, PARAMS, KVSTORE] {
            assert!(table.contains(name), "missing {name}");
        }
        assert!(table.resolve(ERRORS, "users").unwrap().is::<ErrorKinds>());
        assert!(table.resolve(PARAMS, "users").unwrap().is::<ConfigService>());
    }

    #[test]
    fn test_logger_is_scoped_to_component() {
        let table = ServiceTable::with_core(ConfigService::default(), KvStore::new());
        let logger = table
            .resolve(LOG, "users")
            .unwrap()
            .downcast::<Logger>()
            .unwrap();
        assert_eq!(logger.component(), "users");
    }

    #[test]
    fn test_provided_values() {
        let table = ServiceTable::new();
        table.provide("greeting", String::from("hello"));

        let greeting = table
            .resolve("greeting", "anyone")
            .unwrap()
            .downcast::<String>()
            .unwrap();
        assert_eq!(greeting.as_str(), "hello");
        assert!(table.resolve("missing", "anyone").is_none());
    }
}
