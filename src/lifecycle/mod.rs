//! Application lifecycle
//!
//! # Phases
//!
//! ```text
//! 1. Registration (module / resource / routes)
//!    ↓
//! 2. init: build every component in dependency order
//!    ↓
//! 3. postinit                      ← handlers, dependency order
//!    ↓
//! 4. listen: prelisten → bind → postlisten
//!    ↓
//! [Running...]
//!    ↓
//! 5. Shutdown signal (SIGTERM/SIGINT) or close()
//!    ↓
//! 6. preclose                      ← handlers, reverse dependency order
//!    ↓
//! 7. Listener released
//! ```
//!
//! Handlers for one event run one at a time; the first failure aborts the
//! phase and is reported as [`LifecycleError::HookFailed`].

mod application;
mod error;
mod event;
mod manager;
mod shutdown;

pub use application::{Application, ApplicationBuilder};
pub use error::{LifecycleError, Result};
pub use event::{Hook, HookFuture, LifecycleEvent, LifecycleState, hook};
pub use manager::LifecycleManager;
pub use shutdown::shutdown_signal;
