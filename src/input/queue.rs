//! Per-tick input buffer.
//!
//! Platform threads push events through an [`InputSender`]; the tick owner
//! drains the [`InputQueue`] exactly once per tick, so a physical press is
//! observed by one tick only.

use super::events::InputEvent;
use crossbeam_channel::{Receiver, Sender, TrySendError, unbounded};

/// Cloneable producer half, handed to input threads.
#[derive(Clone)]
pub struct InputSender {
    tx: Sender<InputEvent>,
}

impl InputSender {
    /// Returns `false` once the queue has been dropped (session gone).
    pub fn send(&self, event: InputEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Disconnected(_)) => {
                log::debug!("INPUT: Queue closed, dropping {:?}", event);
                false
            }
            Err(TrySendError::Full(_)) => {
                log::warn!("INPUT: Queue full, dropping {:?}", event);
                false
            }
        }
    }
}

/// Consumer half owned by the session host.
pub struct InputQueue {
    tx: Sender<InputEvent>,
    rx: Receiver<InputEvent>,
    paused: bool,
}

impl InputQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            paused: false,
        }
    }

    pub fn sender(&self) -> InputSender {
        InputSender {
            tx: self.tx.clone(),
        }
    }

    /// Takes everything buffered since the previous drain.
    ///
    /// While paused, buffered events are discarded instead of returned.
    pub fn drain(&self) -> Vec<InputEvent> {
        let events: Vec<InputEvent> = self.rx.try_iter().collect();
        if self.paused {
            if !events.is_empty() {
                log::debug!("INPUT: Discarding {} event(s) while paused", events.len());
            }
            return Vec::new();
        }
        events
    }

    pub fn set_paused(&mut self, paused: bool) {
        if paused {
            // Nothing captured before the pause may leak into the resumed session.
            let _ = self.drain();
        }
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
