//! Single-slot error presentation channel
//!
//! Holds at most one displayable error. A new `show` overwrites whatever was
//! there; `hide` only flips visibility.

use tokio::sync::watch;

pub const DEFAULT_TITLE: &str = "Error";
pub const DEFAULT_BUTTON_TEXT: &str = "Try Again";

/// What the dialog currently holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotification {
    pub title: String,
    pub message: String,
    pub button_text: String,
    pub visible: bool,
}

impl Default for ErrorNotification {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            message: String::new(),
            button_text: DEFAULT_BUTTON_TEXT.to_string(),
            visible: false,
        }
    }
}

/// Input accepted by [`ErrorDialog::show`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorInput {
    /// Bare message with default title and button
    Plain(String),
    /// Explicit fields; `None` falls back to the defaults
    Structured {
        title: Option<String>,
        message: String,
        button_text: Option<String>,
    },
}

impl ErrorInput {
    pub fn structured(title: &str, message: impl Into<String>, button_text: &str) -> Self {
        Self::Structured {
            title: Some(title.to_string()),
            message: message.into(),
            button_text: Some(button_text.to_string()),
        }
    }
}

impl From<&str> for ErrorInput {
    fn from(message: &str) -> Self {
        Self::Plain(message.to_string())
    }
}

impl From<String> for ErrorInput {
    fn from(message: String) -> Self {
        Self::Plain(message)
    }
}

/// Process-wide error surface, shared by reference
pub struct ErrorDialog {
    state: watch::Sender<ErrorNotification>,
}

impl Default for ErrorDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorDialog {
    pub fn new() -> Self {
        Self {
            state: watch::Sender::new(ErrorNotification::default()),
        }
    }

    /// Display an error, replacing any current one
    pub fn show(&self, input: impl Into<ErrorInput>) {
        let notification = match input.into() {
            ErrorInput::Plain(message) => ErrorNotification {
                message,
                visible: true,
                ..ErrorNotification::default()
            },
            ErrorInput::Structured {
                title,
                message,
                button_text,
            } => ErrorNotification {
                title: title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
                message,
                button_text: button_text.unwrap_or_else(|| DEFAULT_BUTTON_TEXT.to_string()),
                visible: true,
            },
        };

        tracing::debug!(title = %notification.title, "Showing error: {}", notification.message);
        self.state.send_replace(notification);
    }

    /// Hide the dialog, keeping its content
    pub fn hide(&self) {
        self.state.send_if_modified(|n| std::mem::replace(&mut n.visible, false));
    }

    pub fn current(&self) -> ErrorNotification {
        self.state.borrow().clone()
    }

    pub fn is_visible(&self) -> bool {
        self.state.borrow().visible
    }

    pub fn subscribe(&self) -> watch::Receiver<ErrorNotification> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_message_defaults() {
        let dialog = ErrorDialog::new();
        dialog.show("Network error. Please try again.");

        let n = dialog.current();
        assert_eq!(n.title, "Error");
        assert_eq!(n.button_text, "Try Again");
        assert_eq!(n.message, "Network error. Please try again.");
        assert!(n.visible);
    }

    #[test]
    fn test_structured_fields_default_individually() {
        let dialog = ErrorDialog::new();
        dialog.show(ErrorInput::Structured {
            title: None,
            message: "boom".to_string(),
            button_text: Some("Close".to_string()),
        });

        let n = dialog.current();
        assert_eq!(n.title, "Error");
        assert_eq!(n.button_text, "Close");
    }

    #[test]
    fn test_hide_keeps_message() {
        let dialog = ErrorDialog::new();
        dialog.show("msg");
        dialog.hide();

        let n = dialog.current();
        assert!(!n.visible);
        assert_eq!(n.message, "msg");
    }

    #[test]
    fn test_show_overwrites_previous() {
        let dialog = ErrorDialog::new();
        dialog.show(ErrorInput::structured("Login Failed", "first", "Close"));
        dialog.show("second");

        let n = dialog.current();
        assert_eq!(n.title, "Error");
        assert_eq!(n.message, "second");
        assert_eq!(n.button_text, "Try Again");
    }

    #[test]
    fn test_subscribers_see_hide() {
        let dialog = ErrorDialog::new();
        let mut rx = dialog.subscribe();

        dialog.hide();
        assert!(!rx.has_changed().unwrap());

        dialog.show("x");
        assert!(rx.borrow_and_update().visible);
        dialog.hide();
        assert!(!rx.borrow_and_update().visible);
    }
}
