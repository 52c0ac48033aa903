// src/notify.rs

//! User-visible, ephemeral messages.

/// Something that can show a short message to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Prints notices on stdout; diagnostics stay on stderr via `tracing`.
#[derive(Debug, Clone, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        println!("{message}");
    }
}
