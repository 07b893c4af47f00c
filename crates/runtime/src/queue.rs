// SPDX-License-Identifier: MIT

//! The three FIFOs owned by one worker manager: low-priority and
//! high-priority ingress, and one result egress. Multi-producer/
//! multi-consumer, internally synchronized, bounded only by process
//! memory (unbounded conceptually, per the data model).
//!
//! Backed by `flume`, which gives us both the blocking `recv`/`recv_timeout`
//! used by thread workers and the non-blocking `try_recv` used by the
//! result forwarder, off the same channel.

use std::time::Duration;

use rtadp_core::Payload;

/// Approximate wait for the low-priority queue's bounded-wait receive
/// (§4.D core loop, step 2).
pub const LP_RECV_TIMEOUT: Duration = Duration::from_secs(1);

/// A manager's two ingress priority queues.
#[derive(Clone)]
pub struct PriorityQueues {
    hp_tx: flume::Sender<Payload>,
    hp_rx: flume::Receiver<Payload>,
    lp_tx: flume::Sender<Payload>,
    lp_rx: flume::Receiver<Payload>,
}

impl PriorityQueues {
    pub fn new() -> Self {
        let (hp_tx, hp_rx) = flume::unbounded();
        let (lp_tx, lp_rx) = flume::unbounded();
        Self { hp_tx, hp_rx, lp_tx, lp_rx }
    }

    pub fn push_hp(&self, payload: Payload) {
        // Sender is never dropped while the manager is alive; disconnect
        // is unreachable in practice and not worth surfacing as an error.
        let _ = self.hp_tx.send(payload);
    }

    pub fn push_lp(&self, payload: Payload) {
        let _ = self.lp_tx.send(payload);
    }

    pub fn hp_len(&self) -> usize {
        self.hp_rx.len()
    }

    pub fn lp_len(&self) -> usize {
        self.lp_rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hp_rx.is_empty() && self.lp_rx.is_empty()
    }

    /// §4.D core loop steps 2: non-blocking hp, then bounded-wait lp.
    /// Strict priority — a waiting lp item is never selected while hp has
    /// anything pending.
    pub fn try_recv_hp_then_lp(&self) -> Option<(Payload, rtadp_core::Priority)> {
        if let Ok(payload) = self.hp_rx.try_recv() {
            return Some((payload, rtadp_core::Priority::High));
        }
        match self.lp_rx.recv_timeout(LP_RECV_TIMEOUT) {
            Ok(payload) => Some((payload, rtadp_core::Priority::Low)),
            Err(_) => None,
        }
    }

    /// Drains both queues without blocking, used by `clean_queue` and the
    /// `reset`/`cleanedshutdown` commands.
    pub fn drain(&self) {
        while self.hp_rx.try_recv().is_ok() {}
        while self.lp_rx.try_recv().is_ok() {}
    }
}

impl Default for PriorityQueues {
    fn default() -> Self {
        Self::new()
    }
}

/// A manager's result egress FIFO.
#[derive(Clone)]
pub struct ResultQueue {
    tx: flume::Sender<Payload>,
    rx: flume::Receiver<Payload>,
}

impl ResultQueue {
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self { tx, rx }
    }

    pub fn push(&self, payload: Payload) {
        let _ = self.tx.send(payload);
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Non-blocking pop, used by the result forwarder each sweep.
    pub fn try_pop(&self) -> Option<Payload> {
        self.rx.try_recv().ok()
    }

    pub fn drain(&self) {
        while self.rx.try_recv().is_ok() {}
    }
}

impl Default for ResultQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
