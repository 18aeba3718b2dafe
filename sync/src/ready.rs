//! One-shot readiness gate for the remote connection.

use tokio::sync::watch;

use crate::error::{Result, SyncError};

/// Creates a linked trigger and signal, not yet fired.
///
/// # Examples
///
/// ```
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let (trigger, signal) = slash_commands_sync::ready_channel();
/// trigger.fire();
/// signal.wait().await.unwrap();
/// // Waiting again after the fact does not block.
/// signal.wait().await.unwrap();
/// # });
/// ```
pub fn ready_channel() -> (ReadyTrigger, ReadySignal) {
    let (tx, rx) = watch::channel(false);
    (ReadyTrigger { tx }, ReadySignal { rx })
}

/// Fires the readiness signal, typically from the connection's ready event.
#[derive(Debug)]
pub struct ReadyTrigger {
    tx: watch::Sender<bool>,
}

impl ReadyTrigger {
    /// Marks the connection ready. Firing more than once has no effect.
    pub fn fire(&self) {
        self.tx.send_replace(true);
    }
}

/// Waits for the connection to become ready.
#[derive(Debug, Clone)]
pub struct ReadySignal {
    rx: watch::Receiver<bool>,
}

impl ReadySignal {
    /// A signal that has already fired.
    pub fn ready() -> Self {
        let (trigger, signal) = ready_channel();
        trigger.fire();
        signal
    }

    /// Returns `true` if the signal has fired.
    pub fn is_ready(&self) -> bool {
        *self.rx.borrow()
    }

    /// Suspends until the signal fires; returns at once if it already has.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NeverReady`] if the trigger is dropped without
    /// firing.
    pub async fn wait(&self) -> Result<()> {
        let mut rx = self.rx.clone();
        loop {
            let ready = *rx.borrow_and_update();
            if ready {
                return Ok(());
            }
            if rx.changed().await.is_err() {
                return Err(SyncError::NeverReady);
            }
        }
    }
}
