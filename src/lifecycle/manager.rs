//! Lifecycle Manager
//!
//! Collects lifecycle handlers in dependency order and dispatches them.

use super::{Hook, LifecycleError, LifecycleEvent, Result};
use crate::di::{Container, Instance};
use crate::meta::{ClassId, LIFECYCLE, MetadataRegistry};
use std::collections::HashMap;
use std::time::Duration;

/// A handler bound to the instance it runs against
struct LifecycleHook {
    component: String,
    instance: Instance,
    handler: Hook,
}

/// Dispatches lifecycle events to component handlers
///
/// Handlers are kept in topological order. `postinit`, `prelisten` and
/// `postlisten` run front to back, `preclose` back to front. Each handler is
/// awaited before the next one starts, and the first failure aborts the
/// rest of the phase.
///
/// # Example
///
/// ```rust,ignore
/// use tessera::lifecycle::{LifecycleEvent, LifecycleManager};
///
/// let manager = LifecycleManager::collect(&order, &container, &metadata);
///
/// manager.dispatch(LifecycleEvent::PostInit).await?;
/// // ... application runs ...
/// manager.dispatch(LifecycleEvent::PreClose).await?;
/// ```
#[derive(Default)]
pub struct LifecycleManager {
    hooks: HashMap<LifecycleEvent, Vec<LifecycleHook>>,
    timeout: Option<Duration>,
}

impl LifecycleManager {
    /// Create an empty LifecycleManager
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the handlers declared in `metadata` for every component.
    ///
    /// `order` must already be topological; components without a
    /// constructed instance are skipped.
    pub fn collect<'a, I>(order: I, container: &Container, metadata: &MetadataRegistry) -> Self
    where
        I: IntoIterator<Item = (&'a str, ClassId)>,
    {
        let mut manager = Self::new();
        for (name, class) in order {
            let Some(instance) = container.get(name) else {
                continue;
            };
            for event in LifecycleEvent::ALL {
                if let Some(hook) = metadata
                    .get_class_meta(class, LIFECYCLE, event.as_ref())
                    .and_then(|value| value.as_hook().cloned())
                {
                    manager.register(event, name, instance.clone(), hook);
                }
            }
        }
        manager
    }

    /// Bound every phase by `timeout`; `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Append a handler for `event`
    pub fn register(
        &mut self,
        event: LifecycleEvent,
        component: impl Into<String>,
        instance: Instance,
        handler: Hook,
    ) {
        self.hooks.entry(event).or_default().push(LifecycleHook {
            component: component.into(),
            instance,
            handler,
        });
    }

    /// Run every handler registered for `event`
    pub async fn dispatch(&self, event: LifecycleEvent) -> Result<()> {
        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.run_phase(event))
                .await
                .map_err(|_| {
                    LifecycleError::timeout(
                        event.to_string(),
                        format!("Timeout after {:?}", timeout),
                    )
                })?,
            None => self.run_phase(event).await,
        }
    }

    async fn run_phase(&self, event: LifecycleEvent) -> Result<()> {
        let Some(hooks) = self.hooks.get(&event) else {
            tracing::debug!("No {} handlers registered", event);
            return Ok(());
        };

        tracing::info!("Dispatching {} handlers...", event);

        let ordered: Box<dyn Iterator<Item = &LifecycleHook> + Send> = if event.runs_in_reverse() {
            Box::new(hooks.iter().rev())
        } else {
            Box::new(hooks.iter())
        };

        for hook in ordered {
            tracing::debug!("{}: {}", event, hook.component);
            (hook.handler)(hook.instance.clone()).await.map_err(|e| {
                tracing::error!("{} failed for {}: {:#}", event, hook.component, e);
                LifecycleError::hook_failed(&hook.component, event, e)
            })?;
        }

        tracing::info!("{} complete ({} handlers executed)", event, hooks.len());
        Ok(())
    }

    /// Get the number of handlers registered for `event`
    pub fn hook_count(&self, event: LifecycleEvent) -> usize {
        self.hooks.get(&event).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::hook;
    use std::sync::{Arc, Mutex};

    fn recorder(order: &Arc<Mutex<Vec<String>>>, label: &str) -> Hook {
        let order = Arc::clone(order);
        let label = label.to_string();
        hook(move |_| {
            let order = Arc::clone(&order);
            let label = label.clone();
            async move {
                order.lock().unwrap().push(label);
                Ok(())
            }
        })
    }

    fn instance() -> Instance {
        Arc::new(())
    }

    #[tokio::test]
    async fn test_dispatch_in_registration_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut manager = LifecycleManager::new();
        for name in ["a", "b", "c"] {
            manager.register(LifecycleEvent::PostInit, name, instance(), recorder(&order, name));
        }

        manager.dispatch(LifecycleEvent::PostInit).await.unwrap();

        assert_eq!(*order.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_preclose_reverse_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut manager = LifecycleManager::new();
        for name in ["a", "b", "c"] {
            manager.register(LifecycleEvent::PreClose, name, instance(), recorder(&order, name));
        }

        manager.dispatch(LifecycleEvent::PreClose).await.unwrap();

        assert_eq!(*order.lock().unwrap(), vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_failure_aborts_phase() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut manager = LifecycleManager::new();
        manager.register(LifecycleEvent::PreListen, "a", instance(), recorder(&order, "a"));
        manager.register(
            LifecycleEvent::PreListen,
            "b",
            instance(),
            hook(|_| async {
                Err(anyhow::anyhow!("address in use").context("port check failed"))
            }),
        );
        manager.register(LifecycleEvent::PreListen, "c", instance(), recorder(&order, "c"));

        let err = manager.dispatch(LifecycleEvent::PreListen).await.unwrap_err();

        match &err {
            LifecycleError::HookFailed {
                component,
                event,
                source,
            } => {
                assert_eq!(component, "b");
                assert_eq!(*event, LifecycleEvent::PreListen);
                assert_eq!(
                    source.chain().map(ToString::to_string).collect::<Vec<_>>(),
                    vec!["port check failed", "address in use"]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            std::error::Error::source(&err).map(ToString::to_string),
            Some("port check failed".to_string())
        );
        assert!(err.to_string().ends_with("port check failed: address in use"));
        assert_eq!(*order.lock().unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_handlers_run_sequentially() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut manager = LifecycleManager::new();

        let slow_order = Arc::clone(&order);
        manager.register(
            LifecycleEvent::PostInit,
            "slow",
            instance(),
            hook(move |_| {
                let order = Arc::clone(&slow_order);
                async move {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    order.lock().unwrap().push("slow".to_string());
                    Ok(())
                }
            }),
        );
        manager.register(LifecycleEvent::PostInit, "fast", instance(), recorder(&order, "fast"));

        manager.dispatch(LifecycleEvent::PostInit).await.unwrap();

        assert_eq!(*order.lock().unwrap(), vec!["slow", "fast"]);
    }

    #[tokio::test]
    async fn test_phase_timeout() {
        let mut manager = LifecycleManager::new().with_timeout(Some(Duration::from_millis(10)));
        manager.register(
            LifecycleEvent::PostListen,
            "stuck",
            instance(),
            hook(|_| std::future::pending()),
        );

        let err = manager.dispatch(LifecycleEvent::PostListen).await.unwrap_err();
        assert!(matches!(err, LifecycleError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_empty_phase() {
        let manager = LifecycleManager::new();
        manager.dispatch(LifecycleEvent::PreClose).await.unwrap();
        assert_eq!(manager.hook_count(LifecycleEvent::PreClose), 0);
    }
}
