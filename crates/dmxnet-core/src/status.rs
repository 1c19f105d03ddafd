//! Level-triggered health state for endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Health of an endpoint.
///
/// # Examples
/// ```
/// use dmxnet_core::status::ServiceStatus;
///
/// let status = ServiceStatus::warning("Not receiving data packets");
/// assert_eq!(status.message(), Some("Not receiving data packets"));
/// assert_eq!(status.to_string(), "Warning: Not receiving data packets");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "code", content = "message", rename_all = "lowercase")]
pub enum ServiceStatus {
    #[default]
    Idle,
    Ok,
    Warning(String),
    Error(String),
}

impl ServiceStatus {
    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning(message.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Idle | Self::Ok => None,
            Self::Warning(message) | Self::Error(message) => Some(message),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Ok => "OK",
            Self::Warning(_) => "Warning",
            Self::Error(_) => "Error",
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(message) if !message.is_empty() => write!(f, "{}: {}", self.label(), message),
            _ => f.write_str(self.label()),
        }
    }
}

/// Holds a [`ServiceStatus`] and notifies subscribers when it changes.
///
/// Assigning the current value again is a no-op: subscribers only wake on
/// real transitions.
#[derive(Debug)]
pub struct StatusCell {
    sender: watch::Sender<ServiceStatus>,
}

impl StatusCell {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(ServiceStatus::Idle);
        Self { sender }
    }

    pub fn get(&self) -> ServiceStatus {
        self.sender.borrow().clone()
    }

    /// Stores `status`, returning whether it differed from the previous value.
    pub fn set(&self, status: ServiceStatus) -> bool {
        self.sender.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            *current = status;
            true
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<ServiceStatus> {
        self.sender.subscribe()
    }
}

impl Default for StatusCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle() {
        assert_eq!(StatusCell::new().get(), ServiceStatus::Idle);
    }

    #[test]
    fn same_value_does_not_notify() {
        let cell = StatusCell::new();
        let mut rx = cell.subscribe();
        assert!(cell.set(ServiceStatus::Ok));
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        assert!(!cell.set(ServiceStatus::Ok));
        assert!(!rx.has_changed().unwrap());

        assert!(cell.set(ServiceStatus::warning("late")));
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), ServiceStatus::warning("late"));
    }

    #[test]
    fn message_change_is_a_transition() {
        let cell = StatusCell::new();
        cell.set(ServiceStatus::warning("a"));
        assert!(cell.set(ServiceStatus::warning("b")));
    }

    #[test]
    fn display_and_serde() {
        assert_eq!(ServiceStatus::Ok.to_string(), "OK");
        assert_eq!(ServiceStatus::error("boom").to_string(), "Error: boom");
        let json = serde_json::to_string(&ServiceStatus::warning("stale")).unwrap();
        assert_eq!(json, r#"{"code":"warning","message":"stale"}"#);
        assert_eq!(serde_json::to_string(&ServiceStatus::Idle).unwrap(), r#"{"code":"idle"}"#);
    }
}
