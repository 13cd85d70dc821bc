//! Per-operation collector of business-rule violations.
//!
//! A `Notifier` is created by the request layer for exactly one inbound
//! command, lent mutably to the service call, and read once afterwards to pick
//! the response shape. It is not `Clone` and never lives in shared state.

use models::errors::ModelError;

use crate::errors::ServiceError;

/// Recorded when an update's path id and payload id disagree.
pub const ID_MISMATCH: &str = "the informed id does not match the payload id";

#[derive(Debug, Default)]
pub struct Notifier {
    messages: Vec<String>,
}

impl Notifier {
    pub fn new() -> Self { Self::default() }

    /// Append a violation. Order and duplicates are preserved.
    pub fn record(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn has_notifications(&self) -> bool { !self.messages.is_empty() }

    pub fn notifications(&self) -> &[String] { &self.messages }

    pub fn into_notifications(self) -> Vec<String> { self.messages }

    /// Record a failed field validation and keep going.
    ///
    /// Only `ModelError::Validation` becomes a notification; anything else is
    /// an infrastructure failure and is returned as an error.
    pub fn check(&mut self, result: Result<(), ModelError>) -> Result<(), ServiceError> {
        match result {
            Ok(()) => Ok(()),
            Err(ModelError::Validation(msg)) => {
                self.record(msg);
                Ok(())
            }
            Err(other) => Err(other.into()),
        }
    }
}
