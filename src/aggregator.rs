//! Multi-frame barcode aggregation.
//!
//! The [`Aggregator`] consumes one frame's detections at a time, keeps the
//! first sighting of every distinct value-key, and declares the session
//! complete once enough consecutive frames pass without a new value-key.

use crate::schema::Detection;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Consecutive frames without a new value-key that complete a session.
pub const QUIET_THRESHOLD: u32 = 10;

/// How a session decides it is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Collect distinct codes until the quiet period elapses.
    #[default]
    Multi,
    /// Finish on the first frame that carries any detection.
    Single,
}

/// What happens to collected codes when a session ends without completing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbandonPolicy {
    #[default]
    Discard,
    Surface,
}

/// Result of feeding one frame to the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameOutcome {
    /// The frame's detections, untouched, for overlay drawing.
    pub live: Vec<Detection>,
    /// Final deduplicated results; only set on the frame that completes a session.
    pub completed: Option<Vec<Detection>>,
}

impl FrameOutcome {
    pub fn is_completed(&self) -> bool {
        self.completed.is_some()
    }
}

#[derive(Debug, Default)]
struct SessionState {
    unique: Vec<Detection>,
    index: HashMap<String, usize>,
    frames_since_new_detection: u32,
    active: bool,
}

impl SessionState {
    /// Returns true when the key had not been seen before.
    fn insert(&mut self, detection: &Detection) -> bool {
        let key = detection.value_key();
        if self.index.contains_key(key) {
            return false;
        }
        self.index.insert(key.to_string(), self.unique.len());
        self.unique.push(detection.clone());
        true
    }
}

#[derive(Debug)]
pub struct Aggregator {
    quiet_threshold: u32,
    mode: SessionMode,
    scanning: bool,
    state: SessionState,
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            quiet_threshold: QUIET_THRESHOLD,
            mode: SessionMode::Multi,
            scanning: false,
            state: SessionState::default(),
        }
    }

    /// Override the quiet period; values below 1 are clamped to 1.
    pub fn with_quiet_threshold(mut self, frames: u32) -> Self {
        self.quiet_threshold = frames.max(1);
        self
    }

    pub fn with_mode(mut self, mode: SessionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn quiet_threshold(&self) -> u32 {
        self.quiet_threshold
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Begin a fresh session, discarding anything collected so far.
    pub fn start_session(&mut self) {
        self.state = SessionState::default();
        self.scanning = true;
        debug!("scan session started ({:?}, quiet threshold {})", self.mode, self.quiet_threshold);
    }

    /// Abort the session without producing results.
    pub fn cancel_session(&mut self) {
        if self.scanning {
            debug!(
                "scan session cancelled with {} unique code(s)",
                self.state.unique.len()
            );
        }
        self.reset();
    }

    /// End a session that was neither completed nor cancelled.
    ///
    /// With [`AbandonPolicy::Surface`] the partial results are returned when
    /// there are any; state is cleared in every case.
    pub fn abandon_session(&mut self, policy: AbandonPolicy) -> Option<Vec<Detection>> {
        if !self.scanning {
            return None;
        }
        let partial = std::mem::take(&mut self.state.unique);
        debug!(
            "scan session abandoned with {} unique code(s), policy {:?}",
            partial.len(),
            policy
        );
        self.reset();
        match policy {
            AbandonPolicy::Surface if !partial.is_empty() => Some(partial),
            _ => None,
        }
    }

    /// Process one frame's detections.
    ///
    /// Frames must be supplied in order, one at a time. While no session is
    /// running the detections are passed through as `live` only.
    pub fn on_frame(&mut self, detections: Vec<Detection>) -> FrameOutcome {
        if !self.scanning {
            return FrameOutcome {
                live: detections,
                completed: None,
            };
        }

        let mut found_new = false;
        for detection in &detections {
            if self.state.insert(detection) {
                debug!("new code discovered: {:?}", detection.value_key());
                found_new = true;
            }
        }

        let state = &mut self.state;
        if !detections.is_empty() {
            state.active = true;
            if found_new {
                state.frames_since_new_detection = 0;
            } else {
                state.frames_since_new_detection += 1;
            }
        } else if state.active {
            state.frames_since_new_detection += 1;
        }
        trace!(
            "frame: {} detection(s), {} unique, {} quiet frame(s)",
            detections.len(),
            state.unique.len(),
            state.frames_since_new_detection
        );

        let completed = match self.mode {
            SessionMode::Single => detections.first().map(|first| vec![first.clone()]),
            SessionMode::Multi
                if state.active && state.frames_since_new_detection >= self.quiet_threshold =>
            {
                Some(std::mem::take(&mut state.unique))
            }
            SessionMode::Multi => None,
        };

        if let Some(results) = &completed {
            debug!("scan session completed with {} code(s)", results.len());
            self.reset();
        }

        FrameOutcome {
            live: detections,
            completed,
        }
    }

    /// Whether a session has been started and not yet ended.
    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    /// Whether the running session has seen at least one detection.
    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn frames_since_new_detection(&self) -> u32 {
        self.state.frames_since_new_detection
    }

    pub fn unique_count(&self) -> usize {
        self.state.unique.len()
    }

    /// Codes collected so far, in discovery order.
    pub fn results(&self) -> &[Detection] {
        &self.state.unique
    }

    fn reset(&mut self) {
        self.state = SessionState::default();
        self.scanning = false;
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BarcodeFormat, BoundingBox, ValueType};

    fn code(value: &str) -> Detection {
        Detection::with_value(value)
    }

    fn started() -> Aggregator {
        let mut agg = Aggregator::new();
        agg.start_session();
        agg
    }

    #[test]
    fn completes_on_tenth_quiet_frame() {
        let mut agg = started();
        assert!(agg.on_frame(vec![code("A")]).completed.is_none());
        for _ in 0..9 {
            assert!(agg.on_frame(vec![]).completed.is_none());
        }
        let outcome = agg.on_frame(vec![]);
        assert_eq!(outcome.completed, Some(vec![code("A")]));
        assert!(!agg.is_scanning());
    }

    #[test]
    fn never_completes_without_detections() {
        let mut agg = started();
        for _ in 0..100 {
            let outcome = agg.on_frame(vec![]);
            assert!(!outcome.is_completed());
        }
        assert!(!agg.is_active());
        assert_eq!(agg.frames_since_new_detection(), 0);
    }

    #[test]
    fn repeated_sightings_count_as_quiet() {
        let mut agg = started().with_quiet_threshold(3);
        agg.on_frame(vec![code("A")]);
        agg.on_frame(vec![code("A")]);
        agg.on_frame(vec![code("A")]);
        assert_eq!(agg.frames_since_new_detection(), 2);
        let outcome = agg.on_frame(vec![code("A")]);
        assert_eq!(outcome.completed, Some(vec![code("A")]));
    }

    #[test]
    fn new_code_resets_quiet_counter() {
        let mut agg = started().with_quiet_threshold(3);
        agg.on_frame(vec![code("A")]);
        agg.on_frame(vec![]);
        agg.on_frame(vec![]);
        assert_eq!(agg.frames_since_new_detection(), 2);
        agg.on_frame(vec![code("A"), code("B")]);
        assert_eq!(agg.frames_since_new_detection(), 0);
        assert_eq!(agg.unique_count(), 2);
    }

    #[test]
    fn first_sighting_wins() {
        let first = code("A")
            .value_type(ValueType::Url)
            .format(BarcodeFormat::QrCode)
            .bounding_box(BoundingBox::new(0, 0, 10, 10));
        let later = code("A")
            .value_type(ValueType::Text)
            .bounding_box(BoundingBox::new(50, 50, 60, 60));

        let mut agg = started();
        agg.on_frame(vec![first.clone()]);
        agg.on_frame(vec![]);
        agg.on_frame(vec![later.clone()]);
        agg.on_frame(vec![]);
        agg.on_frame(vec![later]);
        assert_eq!(agg.results(), &[first]);
    }

    #[test]
    fn duplicates_within_a_frame_keep_first() {
        let a1 = code("A").bounding_box(BoundingBox::new(0, 0, 1, 1));
        let a2 = code("A").bounding_box(BoundingBox::new(5, 5, 9, 9));
        let mut agg = started();
        let outcome = agg.on_frame(vec![a1.clone(), a2.clone()]);
        assert_eq!(outcome.live, vec![a1.clone(), a2]);
        assert_eq!(agg.results(), &[a1]);
    }

    #[test]
    fn unique_set_never_shrinks() {
        let frames: Vec<Vec<Detection>> = vec![
            vec![code("A")],
            vec![],
            vec![code("B"), code("A")],
            vec![code("C")],
            vec![],
            vec![code("B")],
        ];
        let mut agg = started();
        let mut last = 0;
        for frame in frames {
            agg.on_frame(frame);
            assert!(agg.unique_count() >= last);
            last = agg.unique_count();
        }
        assert_eq!(last, 3);
    }

    #[test]
    fn results_keep_discovery_order() {
        let mut agg = started().with_quiet_threshold(1);
        agg.on_frame(vec![code("C"), code("A")]);
        agg.on_frame(vec![code("B")]);
        let outcome = agg.on_frame(vec![]);
        assert_eq!(outcome.completed, Some(vec![code("C"), code("A"), code("B")]));
    }

    #[test]
    fn payloadless_codes_collapse() {
        let mut agg = started();
        agg.on_frame(vec![Detection::without_value().format(BarcodeFormat::Aztec)]);
        agg.on_frame(vec![Detection::without_value().format(BarcodeFormat::Itf)]);
        assert_eq!(agg.unique_count(), 1);
        assert_eq!(agg.results()[0].format, BarcodeFormat::Aztec);
    }

    #[test]
    fn live_is_the_current_frame() {
        let mut agg = started();
        agg.on_frame(vec![code("A")]);
        let outcome = agg.on_frame(vec![code("B"), code("B")]);
        assert_eq!(outcome.live, vec![code("B"), code("B")]);
    }

    #[test]
    fn cancel_forgets_history() {
        let mut agg = started().with_quiet_threshold(2);
        agg.on_frame(vec![code("OLD")]);
        agg.on_frame(vec![]);
        agg.cancel_session();
        assert_eq!(agg.unique_count(), 0);
        assert!(!agg.is_scanning());

        agg.start_session();
        agg.on_frame(vec![code("NEW")]);
        agg.on_frame(vec![]);
        let outcome = agg.on_frame(vec![]);
        assert_eq!(outcome.completed, Some(vec![code("NEW")]));
    }

    #[test]
    fn completion_fires_once() {
        let mut agg = started().with_quiet_threshold(1);
        agg.on_frame(vec![code("A")]);
        assert!(agg.on_frame(vec![]).is_completed());
        for _ in 0..5 {
            assert!(!agg.on_frame(vec![code("A")]).is_completed());
        }
    }

    #[test]
    fn idle_frames_pass_through() {
        let mut agg = Aggregator::new();
        let outcome = agg.on_frame(vec![code("A")]);
        assert_eq!(outcome.live, vec![code("A")]);
        assert_eq!(agg.unique_count(), 0);
    }

    #[test]
    fn start_session_is_idempotent() {
        let mut agg = started();
        agg.on_frame(vec![code("A")]);
        agg.start_session();
        agg.start_session();
        assert!(agg.is_scanning());
        assert!(!agg.is_active());
        assert_eq!(agg.unique_count(), 0);
        assert_eq!(agg.frames_since_new_detection(), 0);
    }

    #[test]
    fn single_mode_takes_first_detection() {
        let mut agg = Aggregator::new().with_mode(SessionMode::Single);
        agg.start_session();
        assert!(!agg.on_frame(vec![]).is_completed());
        let outcome = agg.on_frame(vec![code("X"), code("Y")]);
        assert_eq!(outcome.completed, Some(vec![code("X")]));
        assert!(!agg.is_scanning());
    }

    #[test]
    fn abandon_surfaces_partial_results() {
        let mut agg = started();
        agg.on_frame(vec![code("A"), code("B")]);
        assert_eq!(
            agg.abandon_session(AbandonPolicy::Surface),
            Some(vec![code("A"), code("B")])
        );
        assert!(!agg.is_scanning());
        assert_eq!(agg.unique_count(), 0);
    }

    #[test]
    fn abandon_discard_or_empty_returns_nothing() {
        let mut agg = started();
        agg.on_frame(vec![code("A")]);
        assert_eq!(agg.abandon_session(AbandonPolicy::Discard), None);

        let mut agg = started();
        assert_eq!(agg.abandon_session(AbandonPolicy::Surface), None);
    }

    #[test]
    fn zero_threshold_is_clamped() {
        let agg = Aggregator::new().with_quiet_threshold(0);
        assert_eq!(agg.quiet_threshold(), 1);
    }
}
