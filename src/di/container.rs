use crate::error::{Result, TesseraError};
use dashmap::DashMap;
use std::any::Any;
use std::sync::Arc;

/// A constructed singleton, type-erased.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Instance registry: component name to its constructed singleton.
///
/// Insertion order is kept, so [`names`](Self::names) reflects the order
/// the injector constructed components in.
#[derive(Clone, Default)]
pub struct Container {
    instances: DashMap<String, Instance>,
    order: Vec<String>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `instance` under `name`, returning any instance it replaced.
    pub fn insert(&mut self, name: impl Into<String>, instance: Instance) -> Option<Instance> {
        let name = name.into();
        let previous = self.instances.insert(name.clone(), instance);
        if previous.is_none() {
            self.order.push(name);
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<Instance> {
        self.instances.get(name).map(|entry| entry.value().clone())
    }

    pub fn resolve<T: 'static + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        let instance = self
            .get(name)
            .ok_or_else(|| TesseraError::UnresolvedDependency {
                component: "<container>".to_string(),
                dependency: name.to_string(),
            })?;
        instance
            .downcast::<T>()
            .map_err(|_| TesseraError::DowncastFailed {
                name: name.to_string(),
                type_name: std::any::type_name::<T>().to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.instances.contains_key(name)
    }

    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
