use std::time::Duration;

/// How long a transient alert stays on screen.
pub const ALERT_DURATION: Duration = Duration::from_secs(3);

/// Severity of a transient, user-visible alert.
///
/// This enum classifies alerts by their intent and visual styling, allowing
/// the UI to display them appropriately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    /// Neutral informational message that does not indicate success or failure.
    Info,
    /// Indicates a successful operation or positive outcome.
    Success,
    /// Indicates a non-critical issue that the user should be aware of, but
    /// does not prevent normal operation.
    Warning,
    /// Indicates an error or failure that may affect functionality.
    Error,
}

/// A transient alert payload intended for the user interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    /// The kind of the alert, determining its visual style.
    pub kind: AlertKind,
    /// The text content to display to the user.
    pub message: String,
}

impl AlertMessage {
    pub fn new(kind: AlertKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}
