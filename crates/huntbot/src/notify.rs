//! Operator notifications.
//!
//! Delivery is best-effort: a [`Notifier`] never blocks the frame it is
//! called from and never fails the caller.

use std::path::Path;
use std::process::{Child, Command};
use std::sync::{Mutex, PoisonError};

use tracing::{info, warn};

use crate::config::NotificationsConfig;

pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str, icon: Option<&Path>);
}

/// Writes notifications to the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, message: &str, _icon: Option<&Path>) {
        info!("{title} {message}");
    }
}

/// Runs a shell command for every notification.
///
/// The command receives the notification through environment variables:
/// - `HUNTBOT_NOTIFY_TITLE`
/// - `HUNTBOT_NOTIFY_MESSAGE`
/// - `HUNTBOT_NOTIFY_ICON` (empty when there is no icon)
///
/// Children are not waited on. Finished ones are reaped with `try_wait` on
/// the next notification; their exit status is only logged.
pub struct CommandNotifier {
    command: String,
    running: Mutex<Vec<Child>>,
}

impl CommandNotifier {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            running: Mutex::new(Vec::new()),
        }
    }

    fn spawn(&self, title: &str, message: &str, icon: Option<&Path>) -> Result<Child, String> {
        let icon = icon.map(|p| p.display().to_string()).unwrap_or_default();
        Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .env("HUNTBOT_NOTIFY_TITLE", title)
            .env("HUNTBOT_NOTIFY_MESSAGE", message)
            .env("HUNTBOT_NOTIFY_ICON", icon)
            .spawn()
            .map_err(|e| format!("failed to run notification command: {e}"))
    }

    /// Drop finished children. Returns how many are still running.
    fn reap(&self) -> usize {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        running.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                if !status.success() {
                    warn!("Notification command exited with {status}");
                }
                false
            }
            Ok(None) => true,
            Err(e) => {
                warn!("Notification command could not be awaited: {e}");
                false
            }
        });
        running.len()
    }
}

impl Notifier for CommandNotifier {
    fn notify(&self, title: &str, message: &str, icon: Option<&Path>) {
        self.reap();
        match self.spawn(title, message, icon) {
            Ok(child) => self
                .running
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(child),
            Err(e) => warn!("{e}"),
        }
    }
}

/// Notifier for a profile's `notifications.json`.
pub fn from_config(config: &NotificationsConfig) -> Box<dyn Notifier> {
    match &config.command {
        Some(command) if !command.trim().is_empty() => Box::new(CommandNotifier::new(command)),
        _ => Box::new(LogNotifier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_receives_env_vars() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let notifier = CommandNotifier::new(format!(
            "printf '%s|%s|%s' \"$HUNTBOT_NOTIFY_TITLE\" \"$HUNTBOT_NOTIFY_MESSAGE\" \"$HUNTBOT_NOTIFY_ICON\" > {}",
            out.display()
        ));
        let mut child = notifier
            .spawn("Shiny found!", "Found a shiny Beldum", Some(Path::new("/s/b.png")))
            .unwrap();
        assert!(child.wait().unwrap().success());
        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(written, "Shiny found!|Found a shiny Beldum|/s/b.png");
    }

    #[test]
    fn blank_command_falls_back_to_log() {
        let config = NotificationsConfig {
            command: Some("   ".into()),
        };
        // Must not spawn anything.
        from_config(&config).notify("t", "m", None);
    }

    #[test]
    fn failing_command_does_not_panic() {
        CommandNotifier::new("exit 3").notify("t", "m", None);
    }

    #[test]
    fn finished_commands_are_reaped_on_the_next_notification() {
        let notifier = CommandNotifier::new("exit 0");
        notifier.notify("t", "m", None);
        notifier.notify("t", "m", None);

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
        while notifier.reap() > 0 {
            assert!(std::time::Instant::now() < deadline, "children never exited");
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert!(notifier.running.lock().unwrap().is_empty());
    }
}
