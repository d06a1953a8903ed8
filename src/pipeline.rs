//! Threaded scan pipeline.
//!
//! Frames are published from any thread into a keep-only-latest mailbox. One
//! worker thread owns the [`Aggregator`], processes frames strictly one at a
//! time and hands each [`FrameReport`] to the presentation side over a channel.

use crate::aggregator::{Aggregator, FrameOutcome};
use crate::error::SourceError;
use crate::handoff::{Delivery, FrameMailbox};
use crate::schema::Frame;
use log::{debug, warn};
use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Start,
    Cancel,
}

/// One processed frame, delivered as a unit so `live` and `completed` stay paired.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// Position among the frames the worker actually processed, from 1.
    pub sequence: u64,
    pub width: u32,
    pub height: u32,
    pub outcome: FrameOutcome,
}

#[derive(Debug)]
pub enum ScanEvent {
    Frame(FrameReport),
    /// The recognizer failed; the frame was aggregated as empty and may still
    /// have completed the session.
    DetectionFailed {
        sequence: u64,
        error: SourceError,
        outcome: FrameOutcome,
    },
}

pub struct ScanWorker;

impl ScanWorker {
    /// Spawn the worker. The aggregator starts idle; call
    /// [`ScanHandle::start_session`] to begin scanning.
    pub fn spawn(aggregator: Aggregator) -> io::Result<(ScanHandle, Receiver<ScanEvent>)> {
        let mailbox = Arc::new(FrameMailbox::new());
        let (events, receiver) = mpsc::channel();

        let thread = {
            let mailbox = Arc::clone(&mailbox);
            thread::Builder::new()
                .name("framescan-worker".into())
                .spawn(move || run_worker(aggregator, &mailbox, &events))?
        };

        Ok((
            ScanHandle {
                mailbox,
                thread: Some(thread),
            },
            receiver,
        ))
    }
}

fn run_worker(
    mut aggregator: Aggregator,
    mailbox: &FrameMailbox<Result<Frame, SourceError>, Control>,
    events: &Sender<ScanEvent>,
) {
    let mut sequence = 0u64;
    while let Some(delivery) = mailbox.next() {
        let event = match delivery {
            Delivery::Control(Control::Start) => {
                aggregator.start_session();
                continue;
            }
            Delivery::Control(Control::Cancel) => {
                aggregator.cancel_session();
                continue;
            }
            Delivery::Frame(Ok(frame)) => {
                sequence += 1;
                let (width, height) = frame.upright_size();
                let outcome = aggregator.on_frame(frame.detections);
                ScanEvent::Frame(FrameReport {
                    sequence,
                    width,
                    height,
                    outcome,
                })
            }
            Delivery::Frame(Err(error)) => {
                sequence += 1;
                warn!("frame {sequence}: {error}");
                // Still counts toward the quiet period.
                let outcome = aggregator.on_frame(Vec::new());
                ScanEvent::DetectionFailed {
                    sequence,
                    error,
                    outcome,
                }
            }
        };

        if events.send(event).is_err() {
            debug!("scan event receiver gone, stopping worker");
            break;
        }
    }
    debug!("scan worker exiting after {sequence} frame(s)");
}

pub struct ScanHandle {
    mailbox: Arc<FrameMailbox<Result<Frame, SourceError>, Control>>,
    thread: Option<JoinHandle<()>>,
}

impl ScanHandle {
    /// Offer a frame. A frame still waiting for the worker is replaced.
    pub fn submit(&self, frame: Result<Frame, SourceError>) -> bool {
        self.mailbox.publish(frame)
    }

    pub fn start_session(&self) -> bool {
        self.mailbox.control(Control::Start)
    }

    pub fn cancel_session(&self) -> bool {
        self.mailbox.control(Control::Cancel)
    }

    /// Frames replaced before the worker could take them.
    pub fn dropped_frames(&self) -> u64 {
        self.mailbox.dropped()
    }

    /// Stop accepting input, let the worker drain and wait for it.
    pub fn shutdown(mut self) -> thread::Result<()> {
        self.mailbox.close();
        match self.thread.take() {
            Some(thread) => thread.join(),
            None => Ok(()),
        }
    }
}

impl Drop for ScanHandle {
    fn drop(&mut self) {
        self.mailbox.close();
    }
}
