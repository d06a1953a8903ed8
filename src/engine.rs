use crate::aggregator::{AbandonPolicy, Aggregator};
use crate::error::SourceError;
use crate::overlay::project_detection;
use crate::schema::{Frame, FrameOverlay, ScanReport, SessionStatus};
use crate::source::FrameSource;
use log::{debug, warn};

/// Drives a [`FrameSource`] through an [`Aggregator`] until the session
/// completes or the source runs dry.
pub struct ScanEngine {
    aggregator: Aggregator,
    abandon_policy: AbandonPolicy,
    display: Option<(f32, f32)>,
}

impl ScanEngine {
    pub fn new(aggregator: Aggregator) -> Self {
        Self {
            aggregator,
            abandon_policy: AbandonPolicy::default(),
            display: None,
        }
    }

    pub fn abandon_policy(mut self, policy: AbandonPolicy) -> Self {
        self.abandon_policy = policy;
        self
    }

    /// Record projected overlays for a display of the given size.
    pub fn project_onto(mut self, width: u32, height: u32) -> Self {
        self.display = Some((width as f32, height as f32));
        self
    }

    pub fn run<S: FrameSource + ?Sized>(&mut self, source: &mut S) -> Result<ScanReport, SourceError> {
        debug!("replaying frames from {} source", source.name());
        self.aggregator.start_session();

        let mut report = ScanReport::new(SessionStatus::Incomplete);

        while let Some(next) = source.next_frame() {
            let frame = match next {
                Ok(frame) => frame,
                Err(e) if e.is_recoverable() => {
                    warn!("frame {}: {}", report.frames_processed + 1, e);
                    report.failed_frames += 1;
                    Frame::default()
                }
                Err(e) => {
                    self.aggregator.cancel_session();
                    return Err(e);
                }
            };
            report.frames_processed += 1;

            if let Some((width, height)) = self.display {
                let boxes: Vec<_> = frame
                    .detections
                    .iter()
                    .filter_map(|d| project_detection(d, &frame, width, height))
                    .collect();
                if !boxes.is_empty() {
                    report.overlays.push(FrameOverlay {
                        frame: report.frames_processed,
                        boxes,
                    });
                }
            }

            let outcome = self.aggregator.on_frame(frame.detections);
            if let Some(results) = outcome.completed {
                report.status = SessionStatus::Completed;
                report.completed_at_frame = Some(report.frames_processed);
                report.results = results;
                return Ok(report);
            }
        }

        if let Some(partial) = self.aggregator.abandon_session(self.abandon_policy) {
            report.status = SessionStatus::Abandoned;
            report.results = partial;
        }
        Ok(report)
    }
}
