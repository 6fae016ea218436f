//! Constructs components in dependency order

use super::graph::{DependencyGraph, Resolution};
use super::services::ServiceTable;
use super::{Container, Instance};
use crate::component::Registered;
use crate::error::{Result, TesseraError};
use crate::meta::{MetadataRegistry, Role};
use std::collections::HashMap;
use std::sync::Arc;

/// Resolved constructor arguments, in declared order.
///
/// # Example
/// ```rust,ignore
/// ComponentDescriptor::module(|deps: &mut Injected| {
///     let users = deps.next::<Users>()?;
///     let errors = deps.next::<ErrorKinds>()?;
///     Ok(Orders::new(users, errors))
/// })
/// .inject(["users", "$E"])
/// ```
pub struct Injected {
    component: String,
    arguments: Vec<(String, Instance)>,
    cursor: usize,
}

impl Injected {
    pub fn new(component: impl Into<String>, arguments: Vec<(String, Instance)>) -> Self {
        Self {
            component: component.into(),
            arguments,
            cursor: 0,
        }
    }

    /// Name of the component being constructed
    pub fn component(&self) -> &str {
        &self.component
    }

    /// Take the next argument, downcast to `T`.
    pub fn next<T: 'static + Send + Sync>(&mut self) -> Result<Arc<T>> {
        let value = self.get(self.cursor);
        self.cursor += 1;
        value
    }

    /// Argument at `index`, downcast to `T`.
    pub fn get<T: 'static + Send + Sync>(&self, index: usize) -> Result<Arc<T>> {
        let (name, instance) =
            self.arguments
                .get(index)
                .ok_or_else(|| TesseraError::IllegalValue {
                    message: format!(
                        "'{}' asked for argument {} but only {} were injected",
                        self.component,
                        index,
                        self.arguments.len()
                    ),
                })?;
        instance
            .clone()
            .downcast::<T>()
            .map_err(|_| TesseraError::DowncastFailed {
                name: name.clone(),
                type_name: std::any::type_name::<T>().to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }
}

/// Output of a successful build
pub struct Built {
    pub container: Container,
    /// Indices into the component list, in topological order
    pub order: Vec<usize>,
}

/// Builds every registered component.
///
/// Nothing is constructed unless the whole graph is acyclic and every
/// injection name resolves, and the returned [`Container`] is only handed
/// out when every constructor succeeded.
pub struct Injector<'a> {
    components: &'a [Registered],
    metadata: &'a MetadataRegistry,
    services: &'a ServiceTable,
}

impl<'a> Injector<'a> {
    pub fn new(
        components: &'a [Registered],
        metadata: &'a MetadataRegistry,
        services: &'a ServiceTable,
    ) -> Self {
        Self {
            components,
            metadata,
            services,
        }
    }

    pub fn build(&self) -> Result<Built> {
        let modules: HashMap<&str, usize> = self
            .components
            .iter()
            .enumerate()
            .filter(|(_, c)| self.metadata.role_of(c.class()) == Some(Role::Module))
            .map(|(index, c)| (c.name(), index))
            .collect();

        let injections: Vec<Vec<String>> = self
            .components
            .iter()
            .map(|c| self.metadata.injections_of(c.class()))
            .collect();

        let graph = DependencyGraph::build(
            self.components
                .iter()
                .zip(&injections)
                .map(|(c, names)| (c.name(), names.iter().map(String::as_str))),
            |name| match modules.get(name) {
                Some(&index) => Resolution::Module(index),
                None => Resolution::External,
            },
        );
        let order = graph.topological_order()?;

        for (component, names) in self.components.iter().zip(&injections) {
            if let Some(missing) = names
                .iter()
                .find(|name| !modules.contains_key(name.as_str()) && !self.services.contains(name))
            {
                return Err(TesseraError::UnresolvedDependency {
                    component: component.name().to_string(),
                    dependency: missing.clone(),
                });
            }
        }

        let mut container = Container::new();
        for &index in &order {
            let component = &self.components[index];
            let arguments = injections[index]
                .iter()
                .map(|name| {
                    self.resolve(name, component.name(), &modules, &container)
                        .map(|instance| (name.clone(), instance))
                })
                .collect::<Result<Vec<_>>>()?;

            tracing::debug!(
                "Constructing {} '{}' ({} dependencies)",
                component.role(),
                component.name(),
                arguments.len()
            );
            let mut injected = Injected::new(component.name(), arguments);
            let instance = component.construct(&mut injected).map_err(|source| {
                TesseraError::ConstructionFailed {
                    component: component.name().to_string(),
                    source,
                }
            })?;
            container.insert(component.name(), instance);
        }

        Ok(Built { container, order })
    }

    fn resolve(
        &self,
        name: &str,
        component: &str,
        modules: &HashMap<&str, usize>,
        container: &Container,
    ) -> Result<Instance> {
        let found = if modules.contains_key(name) {
            container.get(name)
        } else {
            self.services.resolve(name, component)
        };
        found.ok_or_else(|| TesseraError::UnresolvedDependency {
            component: component.to_string(),
            dependency: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentDescriptor;
    use crate::config::ConfigService;
    use crate::exception::ErrorKinds;
    use crate::kvstore::KvStore;
    use std::sync::Mutex;

    struct Fixture {
        metadata: MetadataRegistry,
        services: ServiceTable,
        components: Vec<Registered>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                metadata: MetadataRegistry::new(),
                services: ServiceTable::with_core(ConfigService::default(), KvStore::new()),
                components: Vec::new(),
            }
        }

        fn add(&mut self, descriptor: ComponentDescriptor) {
            let registered = descriptor.register(&self.metadata);
            self.components.push(registered);
        }

        fn build(&self) -> Result<Built> {
            Injector::new(&self.components, &self.metadata, &self.services).build()
        }
    }

    // one class per component
    struct Named<const ID: char>(&'static str);

    fn tracked<const ID: char>(
        name: &'static str,
        deps: &[&'static str],
        log: &Arc<Mutex<Vec<&'static str>>>,
    ) -> ComponentDescriptor {
        let log = Arc::clone(log);
        ComponentDescriptor::module(move |_: &mut Injected| {
            log.lock().unwrap().push(name);
            Ok(Named::<ID>(name))
        })
        .named(name)
        .inject(deps.iter().copied())
        .build()
    }

    #[test]
    fn test_each_module_built_once_after_its_dependencies() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut fixture = Fixture::new();
        fixture.add(tracked::<'c'>("c", &["a", "b"], &log));
        fixture.add(tracked::<'b'>("b", &["a", "$E"], &log));
        fixture.add(tracked::<'a'>("a", &[], &log));

        let built = fixture.build().unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
        assert_eq!(built.container.names(), ["a", "b", "c"]);
        assert_eq!(built.container.resolve::<Named<'b'>>("b").unwrap().0, "b");
    }

    #[test]
    fn test_cycle_constructs_nothing() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut fixture = Fixture::new();
        fixture.add(tracked::<'f'>("free", &[], &log));
        fixture.add(tracked::<'a'>("a", &["b"], &log));
        fixture.add(tracked::<'b'>("b", &["a"], &log));

        let err = fixture.build().err().unwrap();

        assert!(matches!(err, TesseraError::CyclicDependency { .. }));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unresolved_constructs_nothing() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut fixture = Fixture::new();
        fixture.add(tracked::<'a'>("a", &[], &log));
        fixture.add(tracked::<'b'>("b", &["a", "nonexistent"], &log));

        match fixture.build().err().unwrap() {
            TesseraError::UnresolvedDependency { component, dependency } => {
                assert_eq!(component, "b");
                assert_eq!(dependency, "nonexistent");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_arguments_positional_with_duplicates() {
        let mut fixture = Fixture::new();
        fixture.services.provide("greeting", String::from("hi"));
        fixture.add(
            ComponentDescriptor::module(|injected: &mut Injected| {
                let first = injected.next::<String>()?;
                let _errors = injected.next::<ErrorKinds>()?;
                let second = injected.next::<String>()?;
                Ok(format!("{first}-{second}-{}", injected.len()))
            })
            .named("echo")
            .inject(["greeting", "$E", "greeting"])
            .build(),
        );

        let built = fixture.build().unwrap();
        assert_eq!(
            built.container.resolve::<String>("echo").unwrap().as_str(),
            "hi-hi-3"
        );
    }

    #[test]
    fn test_wrong_argument_type_fails_construction() {
        let mut fixture = Fixture::new();
        fixture.add(
            ComponentDescriptor::module(|injected: &mut Injected| {
                let _ = injected.next::<String>()?;
                Ok(())
            })
            .named("broken")
            .inject(["$E"])
            .build(),
        );

        let err = fixture.build().err().unwrap();
        assert!(matches!(err, TesseraError::ConstructionFailed { .. }));
    }

    #[test]
    fn test_constructor_error_discards_partial_registry() {
        let mut fixture = Fixture::new();
        fixture.add(
            ComponentDescriptor::module(|_: &mut Injected| Ok(1_u32))
                .named("ok")
                .build(),
        );
        fixture.add(
            ComponentDescriptor::module(|_: &mut Injected| -> anyhow::Result<u64> {
                anyhow::bail!("database unreachable")
            })
            .named("fails")
            .inject(["ok"])
            .build(),
        );

        match fixture.build().err().unwrap() {
            TesseraError::ConstructionFailed { component, source } => {
                assert_eq!(component, "fails");
                assert_eq!(source.to_string(), "database unreachable");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_logger_scoped_per_component() {
        let mut fixture = Fixture::new();
        fixture.add(
            ComponentDescriptor::module(|injected: &mut Injected| {
                let log = injected.next::<crate::logger::Logger>()?;
                Ok(log.component().to_string())
            })
            .named("audit")
            .inject(["$log"])
            .build(),
        );

        let built = fixture.build().unwrap();
        assert_eq!(
            built.container.resolve::<String>("audit").unwrap().as_str(),
            "audit"
        );
    }
}
