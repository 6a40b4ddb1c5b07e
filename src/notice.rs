use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
    Warning,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Position {
    TopRight,
    BottomRight,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A transient, user-visible message.
pub struct Notice {
    pub severity: Severity,
    pub message: String,
    pub duration: Duration,
    pub position: Position,
}

impl Notice {
    fn new(severity: Severity, message: impl Into<String>, millis: u64) -> Self {
        Self {
            severity,
            message: message.into(),
            duration: Duration::from_millis(millis),
            position: Position::BottomRight,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message, 3000)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message, 3000)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message, 2000)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message, 3000)
    }

    /// Long-lived, top-right placement used for the submit confirmation.
    pub fn prominent(mut self) -> Self {
        self.duration = Duration::from_millis(5000);
        self.position = Position::TopRight;
        self
    }

    pub fn lasting(mut self, millis: u64) -> Self {
        self.duration = Duration::from_millis(millis);
        self
    }
}

/// Fire-and-forget destination for notices.
pub trait NotificationSink {
    fn notify(&mut self, notice: Notice);
}
