//! Change notification
//!
//! `ChangeBus` broadcasts session snapshots to subscribers, one channel each.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::state::SessionState;

#[derive(Default)]
pub struct ChangeBus {
    subscribers: Vec<Sender<SessionState>>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to changes. The receiver gets every snapshot published from now on.
    pub fn subscribe(&mut self) -> Receiver<SessionState> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Send a snapshot to all subscribers. Removes disconnected subscribers.
    pub fn publish(&mut self, state: &SessionState) {
        self.subscribers.retain(|tx| tx.send(state.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
