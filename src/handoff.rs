//! Single-consumer mailbox between the frame producer and the scan worker.
//!
//! Frames follow a keep-only-latest policy: publishing while a frame is still
//! pending replaces it. Control messages queue in order and are never dropped;
//! queuing one discards the pending frame, which belongs to the state before it.

use log::warn;
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};

#[derive(Debug, PartialEq, Eq)]
pub enum Delivery<F, C> {
    Control(C),
    Frame(F),
}

struct Slot<F, C> {
    frame: Option<F>,
    controls: VecDeque<C>,
    closed: bool,
    dropped: u64,
}

pub struct FrameMailbox<F, C> {
    slot: Mutex<Slot<F, C>>,
    ready: Condvar,
}

impl<F, C> FrameMailbox<F, C> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                frame: None,
                controls: VecDeque::new(),
                closed: false,
                dropped: 0,
            }),
            ready: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot<F, C>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Offer a frame. Returns false if the mailbox is closed.
    pub fn publish(&self, frame: F) -> bool {
        let mut slot = self.lock();
        if slot.closed {
            return false;
        }
        if slot.frame.replace(frame).is_some() {
            slot.dropped += 1;
            warn!("replaced pending frame ({} dropped so far)", slot.dropped);
        }
        drop(slot);
        self.ready.notify_one();
        true
    }

    /// Queue a control message, discarding any frame published before it.
    /// Returns false if the mailbox is closed.
    pub fn control(&self, message: C) -> bool {
        let mut slot = self.lock();
        if slot.closed {
            return false;
        }
        if slot.frame.take().is_some() {
            slot.dropped += 1;
            warn!("discarded frame published before a control message ({} dropped so far)", slot.dropped);
        }
        slot.controls.push_back(message);
        drop(slot);
        self.ready.notify_one();
        true
    }

    /// Block until something is available. Queued controls are delivered
    /// before the pending frame. Returns `None` once closed and drained.
    pub fn next(&self) -> Option<Delivery<F, C>> {
        let mut slot = self.lock();
        loop {
            if let Some(message) = slot.controls.pop_front() {
                return Some(Delivery::Control(message));
            }
            if let Some(frame) = slot.frame.take() {
                return Some(Delivery::Frame(frame));
            }
            if slot.closed {
                return None;
            }
            slot = self
                .ready
                .wait(slot)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    pub fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Frames replaced before the consumer got to them.
    pub fn dropped(&self) -> u64 {
        self.lock().dropped
    }
}

impl<F, C> Default for FrameMailbox<F, C> {
    fn default() -> Self {
        Self::new()
    }
}
