//! Caller-facing notification sink
//!
//! A thin side-effect sink with no state of its own. Implementations must
//! never block the operation that emits the notice.
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub operation: &'static str,
    pub message: String,
    pub success: bool,
}

impl Notice {
    pub fn success(operation: &'static str, message: String) -> Self {
        Self {
            operation,
            message,
            success: true,
        }
    }

    pub fn failure(operation: &'static str, message: String) -> Self {
        Self {
            operation,
            message,
            success: false,
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Forwards notices onto an unbounded channel for the UI layer to drain.
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        // A dropped receiver just means nobody is rendering notices.
        let _ = self.tx.send(notice);
    }
}

/// Discards every notice.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _notice: Notice) {}
}
