pub mod detection;
pub mod frame;
pub mod report;

pub use detection::{BarcodeFormat, BoundingBox, Detection, Point, UNKNOWN_VALUE_KEY, ValueType};
pub use frame::{Frame, Rotation};
pub use report::{FrameOverlay, ScanReport, SessionStatus};

pub const SCHEMA_VERSION: &str = "0.1.0";
