//! Class metadata registry
//!
//! Annotations are attached to a class identity under a namespace + key pair.
//! Registration writes role, injection names and lifecycle handlers here; the
//! graph builder, injector and lifecycle dispatcher read them back.
//!
//! Every key holds a single value. Putting a second value under the same key
//! replaces the first, which is how "one handler per lifecycle event per
//! class" is enforced.

use crate::lifecycle::Hook;
use dashmap::DashMap;
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Namespace holding the component role (`type`) and registered `name`.
pub const ROLE: &str = "@role";
/// Namespace holding the ordered injection names under key `names`.
pub const INJECT: &str = "@inject";
/// Namespace holding lifecycle handlers, keyed by event name.
pub const LIFECYCLE: &str = "@lifecycle";

/// Identity of an application class.
#[derive(Clone, Copy)]
pub struct ClassId {
    type_id: TypeId,
    type_name: &'static str,
}

impl ClassId {
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for ClassId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ClassId {}

impl Hash for ClassId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

/// Role a class plays in the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display, strum_macros::EnumString)]
pub enum Role {
    Module,
    Resource,
    Routes,
}

#[derive(Clone)]
pub enum MetaValue {
    Role(Role),
    Name(String),
    Names(Vec<String>),
    Hook(Hook),
}

impl MetaValue {
    pub fn as_role(&self) -> Option<Role> {
        match self {
            MetaValue::Role(role) => Some(*role),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            MetaValue::Name(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_names(&self) -> Option<&[String]> {
        match self {
            MetaValue::Names(names) => Some(names),
            _ => None,
        }
    }

    pub fn as_hook(&self) -> Option<&Hook> {
        match self {
            MetaValue::Hook(hook) => Some(hook),
            _ => None,
        }
    }
}

impl fmt::Debug for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Role(role) => f.debug_tuple("Role").field(role).finish(),
            MetaValue::Name(name) => f.debug_tuple("Name").field(name).finish(),
            MetaValue::Names(names) => f.debug_tuple("Names").field(names).finish(),
            MetaValue::Hook(_) => f.write_str("Hook(..)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MetaKey {
    class: ClassId,
    namespace: String,
    key: String,
}

/// Registry of class metadata.
///
/// One registry lives for the whole application; [`reset`](Self::reset)
/// returns it to the freshly created state.
#[derive(Default)]
pub struct MetadataRegistry {
    entries: DashMap<MetaKey, MetaValue>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `value` to `target` under `namespace` / `key`.
    ///
    /// Returns the value previously stored in that slot, if any.
    pub fn put_class_meta(
        &self,
        target: ClassId,
        namespace: &str,
        key: &str,
        value: MetaValue,
    ) -> Option<MetaValue> {
        let previous = self.entries.insert(
            MetaKey {
                class: target,
                namespace: namespace.to_string(),
                key: key.to_string(),
            },
            value,
        );
        if previous.is_some() && namespace == LIFECYCLE {
            tracing::warn!(
                "Replacing '{}' handler on {:?}; only one handler per event is kept",
                key,
                target
            );
        }
        previous
    }

    /// Look up the value attached to `target` under `namespace` / `key`.
    pub fn get_class_meta(&self, target: ClassId, namespace: &str, key: &str) -> Option<MetaValue> {
        self.entries
            .get(&MetaKey {
                class: target,
                namespace: namespace.to_string(),
                key: key.to_string(),
            })
            .map(|entry| entry.value().clone())
    }

    pub fn role_of(&self, target: ClassId) -> Option<Role> {
        self.get_class_meta(target, ROLE, "type")
            .and_then(|value| value.as_role())
    }

    /// Injection names declared by `target`, empty when none were declared.
    pub fn injections_of(&self, target: ClassId) -> Vec<String> {
        self.get_class_meta(target, INJECT, "names")
            .and_then(|value| value.as_names().map(<[String]>::to_vec))
            .unwrap_or_default()
    }

    pub fn reset(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
