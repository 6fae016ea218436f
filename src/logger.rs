use std::fmt::Display;

/// The `$log` service: `tracing` events tagged with the owning component.
#[derive(Debug, Clone)]
pub struct Logger {
    component: String,
}

impl Logger {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn trace(&self, message: impl Display) {
        tracing::trace!(component = %self.component, "{}", message);
    }

    pub fn debug(&self, message: impl Display) {
        tracing::debug!(component = %self.component, "{}", message);
    }

    pub fn info(&self, message: impl Display) {
        tracing::info!(component = %self.component, "{}", message);
    }

    pub fn warn(&self, message: impl Display) {
        tracing::warn!(component = %self.component, "{}", message);
    }

    pub fn error(&self, message: impl Display) {
        tracing::error!(component = %self.component, "{}", message);
    }
}
