//! # Alert Service
//!
//! Non-blocking user notifications. Alerts are collected for the front end
//! to display and mirrored to the log.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSeverity {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub severity: AlertSeverity,
    pub message: String,
}

/// Shared alert sink; clones feed the same list
#[derive(Debug, Clone, Default)]
pub struct AlertService {
    alerts: Arc<Mutex<Vec<Alert>>>,
}

impl AlertService {
    pub fn new() -> Self {
        Self::default()
    }

    fn alerts_mut(&self) -> MutexGuard<'_, Vec<Alert>> {
        self.alerts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, severity: AlertSeverity, message: impl Into<String>) {
        let message = message.into();
        match severity {
            AlertSeverity::Error => tracing::error!("Alert: {}", message),
            AlertSeverity::Warning => tracing::warn!("Alert: {}", message),
            AlertSeverity::Success | AlertSeverity::Info => tracing::info!("Alert: {}", message),
        }
        self.alerts_mut().push(Alert { severity, message });
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(AlertSeverity::Success, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(AlertSeverity::Info, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.push(AlertSeverity::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(AlertSeverity::Error, message);
    }

    /// Snapshot of pending alerts, oldest first
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts_mut().clone()
    }

    /// Remove and return pending alerts
    pub fn take(&self) -> Vec<Alert> {
        std::mem::take(&mut *self.alerts_mut())
    }
}
