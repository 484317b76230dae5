use async_trait::async_trait;
use colored::Colorize;
use roaya_client::auth::{LOGIN_PATH, UNAUTHORIZED_PATH};
use roaya_client::{Navigator, Notification, NotificationSink, ToastVariant};

/// Prints notifications to stderr, one colored line per message line.
#[derive(Debug, Default)]
pub struct TerminalSink;

impl NotificationSink for TerminalSink {
    fn notify(&self, notification: Notification) {
        for line in &notification.lines {
            let line = match notification.variant {
                ToastVariant::Success => line.green(),
                ToastVariant::Error => line.red(),
                ToastVariant::Warning => line.yellow(),
                ToastVariant::Info => line.blue(),
            };
            eprintln!("{line}");
        }
    }
}

/// A terminal has no pages to move between; navigation becomes a hint
/// about what to run next.
#[derive(Debug)]
pub struct TerminalNavigator {
    command: String,
}

impl TerminalNavigator {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl Navigator for TerminalNavigator {
    fn current_location(&self) -> Option<String> {
        Some(self.command.clone())
    }

    async fn navigate_to(&self, path: &str) {
        match path {
            LOGIN_PATH => eprintln!(
                "{} then retry `roaya {}`",
                "Run `roaya login`".bold(),
                self.command.trim_start_matches('/').replace('/', " ")
            ),
            UNAUTHORIZED_PATH => {
                eprintln!("{}", "Your account lacks the permission for this command".bold())
            }
            other => eprintln!("{} {}", "See".bold(), other),
        }
    }
}
