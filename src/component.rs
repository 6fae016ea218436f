//! Component descriptors
//!
//! A descriptor says everything the container needs to know about one class:
//! its role, the names it injects, its lifecycle handlers and how to build
//! it. Descriptors are declared with [`ComponentDescriptor::module`],
//! [`ComponentDescriptor::resource`] or [`ComponentDescriptor::routes`] and
//! become immutable once registered with an
//! [`Application`](crate::lifecycle::Application).
//!
//! ```rust,ignore
//! let users = ComponentDescriptor::module(|deps: &mut Injected| {
//!     Ok(Users::new(deps.next::<ErrorKinds>()?))
//! })
//! .named("users")
//! .inject(["$E"])
//! .postinit(|users: Arc<Users>| async move { users.warm_up().await });
//! ```

use crate::di::{Injected, Instance};
use crate::error::{Result, TesseraError};
use crate::lifecycle::{Hook, LifecycleEvent, hook};
use crate::meta::{ClassId, INJECT, LIFECYCLE, MetaValue, MetadataRegistry, ROLE, Role};
use crate::mount::Mounted;
use crate::resource::{self, Resource};
use crate::routes::{self, Routes};
use std::future::Future;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

type Constructor = Arc<dyn Fn(&mut Injected) -> anyhow::Result<Instance> + Send + Sync>;
type Mount = Arc<dyn Fn(Instance) -> Result<Mounted> + Send + Sync>;

/// Type-erased description of an application class.
pub struct ComponentDescriptor {
    class: ClassId,
    role: Role,
    name: Option<String>,
    path: Option<PathBuf>,
    inject: Vec<String>,
    hooks: Vec<(LifecycleEvent, Hook)>,
    constructor: Constructor,
    mount: Option<Mount>,
}

impl ComponentDescriptor {
    /// Describe a module built by `constructor`.
    pub fn module<T, F>(constructor: F) -> DescriptorBuilder<T>
    where
        T: Send + Sync + 'static,
        F: Fn(&mut Injected) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        DescriptorBuilder::new(Role::Module, constructor, None)
    }

    /// Describe a REST resource built by `constructor`.
    pub fn resource<T, F>(constructor: F) -> DescriptorBuilder<T>
    where
        T: Resource,
        F: Fn(&mut Injected) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let mount: Mount = Arc::new(|instance: Instance| -> Result<Mounted> {
            resource::mount(downcast::<T>(instance)?)
        });
        DescriptorBuilder::new(Role::Resource, constructor, Some(mount))
    }

    /// Describe a routes class built by `constructor`.
    pub fn routes<T, F>(constructor: F) -> DescriptorBuilder<T>
    where
        T: Routes,
        F: Fn(&mut Injected) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let mount: Mount = Arc::new(|instance: Instance| -> Result<Mounted> {
            routes::mount(downcast::<T>(instance)?)
        });
        DescriptorBuilder::new(Role::Routes, constructor, Some(mount))
    }

    pub fn class(&self) -> ClassId {
        self.class
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn injections(&self) -> &[String] {
        &self.inject
    }

    /// The name this component registers under.
    ///
    /// An explicit [`named`](DescriptorBuilder::named) wins, then the file
    /// stem of the registration path, then the type name in lower camel case.
    pub fn name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        self.path
            .as_deref()
            .and_then(Path::file_stem)
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| name_from_type(self.class.type_name()))
    }

    /// Record where a scanner found this component. Explicit settings win.
    pub(crate) fn discovered(&mut self, path: &Path, name: String) {
        if self.path.is_none() {
            self.path = Some(path.to_path_buf());
        }
        if self.name.is_none() {
            self.name = Some(name);
        }
    }

    /// Record this descriptor's metadata and hand back the registration.
    pub(crate) fn register(self, metadata: &MetadataRegistry) -> Registered {
        let name = self.name();
        metadata.put_class_meta(self.class, ROLE, "type", MetaValue::Role(self.role));
        metadata.put_class_meta(self.class, ROLE, "name", MetaValue::Name(name.clone()));
        metadata.put_class_meta(self.class, INJECT, "names", MetaValue::Names(self.inject));
        for (event, handler) in self.hooks {
            let slot = MetaValue::Hook(handler);
            metadata.put_class_meta(self.class, LIFECYCLE, event.as_ref(), slot);
        }

        Registered {
            name,
            class: self.class,
            role: self.role,
            constructor: self.constructor,
            mount: self.mount,
        }
    }
}

/// Fluent builder for a [`ComponentDescriptor`] of class `T`.
pub struct DescriptorBuilder<T> {
    descriptor: ComponentDescriptor,
    _class: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> DescriptorBuilder<T> {
    fn new<F>(role: Role, constructor: F, mount: Option<Mount>) -> Self
    where
        F: Fn(&mut Injected) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let constructor: Constructor =
            Arc::new(move |injected: &mut Injected| -> anyhow::Result<Instance> {
                Ok(Arc::new(constructor(injected)?) as Instance)
            });
        Self {
            descriptor: ComponentDescriptor {
                class: ClassId::of::<T>(),
                role,
                name: None,
                path: None,
                inject: Vec::new(),
                hooks: Vec::new(),
                constructor,
                mount,
            },
            _class: PhantomData,
        }
    }

    /// Override the registration name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.descriptor.name = Some(name.into());
        self
    }

    /// Source path the component was loaded from.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.descriptor.path = Some(path.into());
        self
    }

    /// Append injection names, in constructor argument order.
    pub fn inject<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.descriptor
            .inject
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Bind `handler` to `event`. Only the last handler bound per event is kept.
    pub fn on<F, Fut>(mut self, event: LifecycleEvent, handler: F) -> Self
    where
        F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let handler = hook(move |instance: Instance| {
            let call = downcast::<T>(instance).map(|typed| handler(typed));
            async move { call?.await }
        });
        self.descriptor.hooks.push((event, handler));
        self
    }

    pub fn postinit<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.on(LifecycleEvent::PostInit, handler)
    }

    pub fn prelisten<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.on(LifecycleEvent::PreListen, handler)
    }

    pub fn postlisten<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.on(LifecycleEvent::PostListen, handler)
    }

    pub fn preclose<F, Fut>(self, handler: F) -> Self
    where
        F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.on(LifecycleEvent::PreClose, handler)
    }

    pub fn build(self) -> ComponentDescriptor {
        self.descriptor
    }
}

impl<T: Send + Sync + 'static> From<DescriptorBuilder<T>> for ComponentDescriptor {
    fn from(builder: DescriptorBuilder<T>) -> Self {
        builder.build()
    }
}

/// A component accepted by the application, waiting to be built.
pub struct Registered {
    name: String,
    class: ClassId,
    role: Role,
    constructor: Constructor,
    mount: Option<Mount>,
}

impl Registered {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> ClassId {
        self.class
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub(crate) fn construct(&self, injected: &mut Injected) -> anyhow::Result<Instance> {
        (self.constructor)(injected)
    }

    /// The router contributed by this component, if it serves HTTP.
    pub(crate) fn mount(&self, instance: Instance) -> Option<Result<Mounted>> {
        self.mount.as_ref().map(|mount| mount(instance))
    }
}

fn downcast<T: Send + Sync + 'static>(instance: Instance) -> Result<Arc<T>> {
    instance
        .downcast::<T>()
        .map_err(|_| TesseraError::DowncastFailed {
            name: "<instance>".to_string(),
            type_name: std::any::type_name::<T>().to_string(),
        })
}

/// `my_app::users::UsersResource<X>` → `usersResource`
fn name_from_type(type_name: &str) -> String {
    let base = type_name.split('<').next().unwrap_or(type_name);
    let short = base.rsplit("::").next().unwrap_or(base);
    let mut chars = short.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
