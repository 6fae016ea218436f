//! Lifecycle events, application states and handler types

use crate::di::Instance;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A named point in the application's startup/shutdown sequence.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum LifecycleEvent {
    /// After every component has been constructed
    PostInit,
    /// Before the network listener is bound
    PreListen,
    /// After the listener is bound and accepting connections
    PostListen,
    /// When shutdown was requested, before the listener is released
    PreClose,
}

impl LifecycleEvent {
    pub const ALL: [LifecycleEvent; 4] = [
        LifecycleEvent::PostInit,
        LifecycleEvent::PreListen,
        LifecycleEvent::PostListen,
        LifecycleEvent::PreClose,
    ];

    /// Close-time events run dependents before their dependencies.
    pub fn runs_in_reverse(self) -> bool {
        matches!(self, LifecycleEvent::PreClose)
    }
}

/// Where an [`Application`](super::Application) is in its lifecycle.
///
/// ```text
/// Uninitialized → ModulesBuilt → Initialized → Listening → Closing → Closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum LifecycleState {
    Uninitialized,
    ModulesBuilt,
    Initialized,
    Listening,
    Closing,
    Closed,
}

pub type HookFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// A type-erased lifecycle handler, invoked with the owning instance.
pub type Hook = Arc<dyn Fn(Instance) -> HookFuture + Send + Sync>;

/// Wrap an async closure into a [`Hook`].
pub fn hook<F, Fut>(handler: F) -> Hook
where
    F: Fn(Instance) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |instance: Instance| -> HookFuture { Box::pin(handler(instance)) })
}
